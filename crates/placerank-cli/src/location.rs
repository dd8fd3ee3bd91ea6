//! `location` subcommands: read, write, or clear the cached location file.

use std::path::Path;

use clap::Subcommand;

use placerank_core::{CachedLocation, LocationCache, LocationInput};

#[derive(Debug, Subcommand)]
pub enum LocationCommands {
    /// Print the cached location
    Show,
    /// Replace the cached location
    Save {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long)]
        timezone: Option<String>,
        /// Reported accuracy in metres
        #[arg(long)]
        accuracy: Option<f64>,
    },
    /// Delete the cached location
    Clear,
}

/// # Errors
///
/// Returns an error if saving or clearing the cache file fails, or if the
/// coordinates are out of range.
pub(crate) fn run_location(path: &Path, command: LocationCommands) -> anyhow::Result<()> {
    let cache = LocationCache::new(path);
    match command {
        LocationCommands::Show => match cache.load() {
            Some(cached) => println!("{}", serde_json::to_string_pretty(&cached)?),
            None => println!("no cached location at {}", path.display()),
        },
        LocationCommands::Save {
            lat,
            lon,
            timezone,
            accuracy,
        } => {
            let input = LocationInput {
                latitude: Some(lat),
                longitude: Some(lon),
                timezone,
                captured_at: None,
                accuracy_m: accuracy,
            };
            let cached = CachedLocation::from_input(&input)
                .ok_or_else(|| anyhow::anyhow!("latitude and longitude are required"))?;
            cache.save(&cached)?;
            println!("saved {lat},{lon} to {}", path.display());
        }
        LocationCommands::Clear => {
            cache.clear()?;
            println!("cleared {}", path.display());
        }
    }
    Ok(())
}
