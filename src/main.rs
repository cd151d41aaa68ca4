use clap::Parser;
use sales_board::args::{Args, Command, Common};
use sales_board::commands::{self, Session};
use sales_board::{Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let common = args.common();
    let home = common.sales_home().path();
    let format = common.format();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.data_file()).await?.print(),

        Command::Options(a) => commands::options(&session(common).await?, a.clone())
            .await?
            .print_as(format)?,

        Command::States(a) => commands::states(&session(common).await?, a.clone())
            .await?
            .print_as(format)?,

        Command::Annual(a) => commands::annual(&session(common).await?, a.clone())
            .await?
            .print_as(format)?,

        Command::Trend(a) => commands::trend(&session(common).await?, a.clone())
            .await?
            .print_as(format)?,

        Command::Table(a) => commands::table(&session(common).await?, a.clone())
            .await?
            .print_as(format)?,

        Command::Ranking(a) => commands::ranking(&session(common).await?, a.clone())
            .await?
            .print_as(format)?,

        Command::Series(a) => commands::series(&session(common).await?, a.clone())
            .await?
            .print_as(format)?,

        Command::Mcp(_mcp_args) => commands::mcp(session(common).await?).await?.print(),
    };
    Ok(())
}

/// Loads the config from the home directory and opens a session on the data file.
async fn session(common: &Common) -> Result<Session> {
    let config = Config::load(common.sales_home().path()).await?;
    Ok(Session::new(config, common.data_file()))
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for the library and binary only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
