use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commands;

use commands::{init_database, serve};

#[derive(Parser)]
#[command(name = "fitlog")]
#[command(about = "Fitness tracking backend with CLI tools and web server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve,
    /// Initialize the database using migrations
    ///
    /// Examples:
    ///   SQLite: sqlite://fitlog.db?mode=rwc
    InitDb {
        /// Database URL; falls back to the configured one when omitted
        #[arg(short, long, env = "FITLOG_DATABASE_URL")]
        database_url: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve => {
                serve().await?;
            }
            Commands::InitDb { database_url } => {
                init_database(database_url.as_deref()).await?;
            }
        }
        Ok(())
    }
}
