//! Command line interface
//!
//! - `serve`: run the HTTP API (default)
//! - `migrate`: apply pending database migrations and exit

pub mod migrate;
pub mod serve;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Spending Tracker API - personal and group expense tracking
#[derive(Parser)]
#[command(name = "spending-tracker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP API server (default)
    Serve,

    /// Apply pending database migrations and exit
    Migrate,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}

/// Load `.env`, layered configuration, and install logging
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    Ok(config)
}
