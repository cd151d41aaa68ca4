pub mod args;
pub mod commands;
mod config;
pub mod dashboard;
mod error;
mod exports;
mod mcp;
pub mod model;
pub mod pipeline;
pub mod render;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use error::{DataFormatError, PipelineError};
pub use exports::Exports;
