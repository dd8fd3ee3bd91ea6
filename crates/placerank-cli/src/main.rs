mod diagnose;
mod location;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::location::LocationCommands;

#[derive(Debug, Parser)]
#[command(name = "placerank")]
#[command(about = "Search nearby places across providers and rank them with an LLM")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search both providers and rank the merged results
    Search {
        /// What to look for, e.g. "quiet coffee shop with wifi"
        query: String,
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// IANA timezone name; defaults to DEFAULT_TIMEZONE
        #[arg(long)]
        timezone: Option<String>,
        /// Print the merged search results without ranking them
        #[arg(long)]
        no_rank: bool,
        /// Print the full JSON output instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Rank a saved search-results JSON file
    Rank {
        /// Path to a search envelope as printed by `search --no-rank --json`
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Inspect or change the cached location
    Location {
        #[command(subcommand)]
        command: LocationCommands,
    },
    /// Check configuration and a running server
    Diagnose {
        /// Base URL of the places API server
        #[arg(long, default_value = "http://localhost:5000")]
        server: String,
        /// Also run a small unranked search through the server
        #[arg(long)]
        search: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Search {
            query,
            lat,
            lon,
            timezone,
            no_rank,
            json,
        } => {
            let config = placerank_core::load_app_config_from_env()?;
            let args = search::SearchArgs {
                query,
                latitude: lat,
                longitude: lon,
                timezone,
                rank: !no_rank,
                json,
            };
            search::run_search(&config, args).await?;
        }
        Commands::Rank { file, json } => {
            let config = placerank_core::load_app_config_from_env()?;
            search::run_rank(&config, &file, json).await?;
        }
        Commands::Location { command } => {
            let path = placerank_core::location_cache_path_from_env();
            location::run_location(&path, command)?;
        }
        Commands::Diagnose { server, search } => {
            let healthy = diagnose::run_diagnose(&server, search).await?;
            if !healthy {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
