use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use reviews_ratings::config::{DEFAULT_CONFIG_FILE, ServiceConfig};
use reviews_ratings::logging::init_tracing;

mod cmd;

#[derive(Parser)]
#[command(name = "reviews-ratings")]
#[command(version, about = "Product reviews and ratings query service")]
pub struct Cli {
    /// Enable debug logging for this crate
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Database path. Overrides reviews.toml and REVIEWS_DB_PATH.
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the review query API over HTTP
    Serve {
        /// Port to serve on
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Enable dev mode (CORS permissive for a local front-end)
        #[arg(long)]
        dev: bool,
    },
    /// Create the database and run migrations
    Init,
    /// Bulk load reviews from a JSON array
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Show or update the app settings
    Settings {
        /// Only approved reviews count toward totals and averages
        #[arg(long)]
        require_approval: Option<bool>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ServiceConfig::load_or_default(&cli.config)
        .context("Failed to load configuration")?
        .with_env()?;
    if let Some(db_path) = &cli.db_path {
        config.server.db_path = db_path.clone();
    }

    init_tracing(&config.logging, cli.verbose)?;

    match &cli.command {
        Commands::Serve { port, host, dev } => {
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if *dev {
                config.server.cors_permissive = true;
            }
            cmd::cmd_serve(&config.server).await?;
        }
        Commands::Init => cmd::cmd_init(&config.server.db_path)?,
        Commands::Import { file } => cmd::cmd_import(file, &config.server.db_path)?,
        Commands::Settings { require_approval } => {
            cmd::cmd_settings(&config.server.db_path, *require_approval).await?
        }
    }

    Ok(())
}
