//! Rideshare CLI - Geocode lookups through the rate-limited queue.
//!
//! # Usage
//!
//! ```bash
//! # Forward geocode one or more addresses
//! rs-cli geocode search "Walton Hall, Milton Keynes" "Virunum"
//!
//! # Reverse geocode a coordinate pair
//! rs-cli geocode reverse 52.0245 -0.7093
//! ```
//!
//! # Commands
//!
//! - `geocode search` - Forward lookups, one queue for all addresses
//! - `geocode reverse` - Reverse lookup
//!
//! Reads the same `GEOCODE_*` environment variables as the server.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rs-cli")]
#[command(author, version, about = "Rideshare CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up addresses and coordinates
    Geocode {
        #[command(subcommand)]
        action: GeocodeAction,
    },
}

#[derive(Subcommand)]
enum GeocodeAction {
    /// Forward geocode addresses
    Search {
        /// Addresses to look up, in order
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// Reverse geocode a coordinate pair
    Reverse {
        /// Latitude in degrees
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Geocode { action } => match action {
            GeocodeAction::Search { addresses } => commands::geocode::search(&addresses).await?,
            GeocodeAction::Reverse { lat, lon } => commands::geocode::reverse(lat, lon).await?,
        },
    }
    Ok(())
}
