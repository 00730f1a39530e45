//! Command-line arguments.

use hibiscus_core::config::AppConfig;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

const APP_DIR_NAME: &str = "hibiscus";

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding config.json and servers.toml
    #[arg(long, env = "HIBISCUS_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory for hibiscus.log
    #[arg(long, env = "HIBISCUS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Probe the stored servers and any given addresses, then save the list
    Probe {
        /// Extra server addresses (ws:// or wss://)
        addresses: Vec<String>,
    },
    /// Log in to a server and mirror its pages
    Connect {
        /// Server address; defaults to server.default_address
        address: Option<String>,
    },
}

impl Cli {
    /// Explicit directory, else the platform config directory, else the working directory.
    pub fn resolved_config_dir(&self) -> PathBuf {
        self.config_dir
            .clone()
            .or_else(AppConfig::default_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join(APP_DIR_NAME).join("logs")))
            .unwrap_or_else(|| self.resolved_config_dir().join("logs"))
    }
}
