//! CasaScout CLI
//!
//! Searches Fotocasa and Idealista listings from the command line.

#![allow(clippy::print_stdout)]

mod search;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use domain::BoundingBox;
use infrastructure::{AppConfig, TokenStore, init_tracing};
use integration_fotocasa::FotocasaApiClient;
use integration_idealista::IdealistaApiClient;

use crate::search::SearchTarget;

/// CasaScout CLI
#[derive(Parser)]
#[command(name = "casascout-cli")]
#[command(author, version, about = "Fotocasa and Idealista listing search", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: casascout.toml if present)
    #[arg(short, long, env = "CASASCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Also write the result as JSON to this file (relative to the data directory)
    #[arg(long, global = true)]
    save: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search Fotocasa
    Fotocasa {
        #[command(subcommand)]
        query: FotocasaQuery,
    },

    /// Search Idealista
    Idealista {
        #[command(subcommand)]
        query: IdealistaQuery,
    },
}

#[derive(Subcommand)]
enum FotocasaQuery {
    /// Listings inside a bounding box
    Bbox(BoundingBoxArgs),

    /// Listings for a place name, resolved through Fotocasa's suggestions
    ///
    /// Example: casascout-cli fotocasa loc "Lavapiés, Madrid"
    Loc {
        /// Free-text place name
        location_name: String,
    },
}

#[derive(Subcommand)]
enum IdealistaQuery {
    /// Listings inside a bounding box
    Bbox {
        #[command(flatten)]
        area: BoundingBoxArgs,

        /// Token cache file (default: oauth_token.json in the data directory)
        #[arg(long)]
        token_file: Option<PathBuf>,
    },

    /// Listings for a place name
    Loc {
        /// Free-text place name
        location_name: String,

        /// Result page
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Token cache file (default: oauth_token.json in the data directory)
        #[arg(long)]
        token_file: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
struct BoundingBoxArgs {
    /// Southern edge
    #[arg(allow_negative_numbers = true)]
    min_lat: f64,

    /// Western edge
    #[arg(allow_negative_numbers = true)]
    min_lon: f64,

    /// Northern edge
    #[arg(allow_negative_numbers = true)]
    max_lat: f64,

    /// Eastern edge
    #[arg(allow_negative_numbers = true)]
    max_lon: f64,

    /// Result page
    #[arg(short, long, default_value_t = 1)]
    page: u32,
}

impl BoundingBoxArgs {
    fn target(&self) -> anyhow::Result<SearchTarget> {
        let bbox = BoundingBox::new(self.min_lat, self.min_lon, self.max_lat, self.max_lon)
            .context("Invalid bounding box")?;
        Ok(SearchTarget::BoundingBox {
            bbox,
            page: self.page,
        })
    }
}

impl FotocasaQuery {
    fn target(&self) -> anyhow::Result<SearchTarget> {
        match self {
            Self::Bbox(area) => area.target(),
            Self::Loc { location_name } => Ok(SearchTarget::Location {
                name: location_name.clone(),
                page: 1,
            }),
        }
    }
}

impl IdealistaQuery {
    fn target(&self) -> anyhow::Result<SearchTarget> {
        match self {
            Self::Bbox { area, .. } => area.target(),
            Self::Loc {
                location_name,
                page,
                ..
            } => Ok(SearchTarget::Location {
                name: location_name.clone(),
                page: *page,
            }),
        }
    }

    const fn token_file(&self) -> Option<&PathBuf> {
        match self {
            Self::Bbox { token_file, .. } | Self::Loc { token_file, .. } => token_file.as_ref(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    let config =
        AppConfig::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    let store = TokenStore::new(&config.storage.data_dir);

    let outcome = match &cli.command {
        Commands::Fotocasa { query } => {
            let target = query.target()?;
            let client = FotocasaApiClient::new(&config.fotocasa)?;
            search::fotocasa(&client, &target).await?
        },
        Commands::Idealista { query } => {
            let target = query.target()?;
            let token_store = match query.token_file() {
                Some(file) => store.clone().with_token_file(file),
                None => store.clone(),
            };
            let client = IdealistaApiClient::new(&config.idealista)?;
            search::ensure_session(&client, &token_store).await?;
            search::idealista(&client, &target).await?
        },
    };

    let Some(outcome) = outcome else {
        println!("❌ No result: the request failed or returned an unusable response");
        std::process::exit(1);
    };

    println!("{}", serde_json::to_string_pretty(&outcome.body)?);
    match outcome.total {
        Some(total) => println!("🏠 {} listing(s) of {total}", outcome.count),
        None => println!("🏠 {} listing(s)", outcome.count),
    }

    if let Some(file) = &cli.save {
        match store.store_result(file, &outcome.body).await? {
            Some(path) => println!("💾 Saved to {}", path.display()),
            None => println!("💾 Nothing to save"),
        }
    }

    Ok(())
}
