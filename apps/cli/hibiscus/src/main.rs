use hibiscus::cli::{Cli, Command};
use hibiscus::commands;
use hibiscus::error::HibiscusError;
use hibiscus::logger::initialize as LoggerInitialize;

use hibiscus_core::config::AppConfig;
use hibiscus_core::connection::ConnectionState;

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logger first, so config errors are recorded
    let log_dir = cli.resolved_log_dir();
    if let Err(e) = LoggerInitialize(&log_dir) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    info!("Log directory: {}", log_dir.display());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), HibiscusError> {
    let config_dir = cli.resolved_config_dir();
    info!("Config directory: {}", config_dir.display());
    let config = AppConfig::load(&config_dir)?;

    match cli.command {
        Command::Probe { addresses } => commands::probe(&config, &config_dir, addresses).await,
        Command::Connect { address } => match commands::connect(&config, address).await? {
            ConnectionState::Failed => Err(HibiscusError::hibiscus("session failed")),
            _ => Ok(()),
        },
    }
}
