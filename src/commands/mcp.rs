//! MCP server command handler.
//!
//! This module implements the `sales mcp` command which runs an MCP server
//! for AI agent integration.

use crate::commands::{Out, Session};
use crate::mcp::Io;
use crate::{mcp, Result};

/// Runs the MCP server.
///
/// This launches a long-running process that communicates via JSON-RPC over stdin/stdout.
/// MCP clients launch this as a subprocess.
pub async fn mcp(session: Session) -> Result<Out<()>> {
    mcp::run_server(session, Io::Stdio).await?;
    Ok("Done running MCP server".into())
}
