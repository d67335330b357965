use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use tapquest_core::AppConfig;

use crate::db::Database;
use crate::gateway::GatewayServer;

/// tapquest — Telegram mini-app quest backend.
#[derive(Parser)]
#[command(name = "tapquest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server.
    Serve(ServeCommand),

    /// Apply pending database migrations and exit.
    Migrate(MigrateCommand),
}

#[derive(Parser)]
pub struct ServeCommand {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "tapquest.toml")]
    pub config: PathBuf,
}

#[derive(Parser)]
pub struct MigrateCommand {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "tapquest.toml")]
    pub config: PathBuf,
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(cmd) => cmd.execute().await,
            Commands::Migrate(cmd) => cmd.execute().await,
        }
    }
}

impl ServeCommand {
    pub async fn execute(self) -> Result<()> {
        let config = AppConfig::from_file(&self.config)?;
        let db = Database::from_config(&config.database).await?;
        db.migrate().await?;
        db.health_check().await?;

        GatewayServer::new(config, db).run().await?;
        Ok(())
    }
}

impl MigrateCommand {
    pub async fn execute(self) -> Result<()> {
        let config = AppConfig::from_file(&self.config)?;
        let db = Database::from_config(&config.database).await?;
        db.migrate().await?;
        tracing::info!("Migrations applied");
        Ok(())
    }
}
