//! dexcache - browse the PokeAPI catalog from a local cache.
//!
//! The binary wires the default gateway, caches and service together and
//! drives a `BrowseSession` from the command line.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dexcache_core::{
    BrowseSession, CatalogService, Config, FilterMode, ImageCache, PokeApiClient, RecordStore,
    SessionEvent,
};

#[derive(Parser)]
#[command(name = "dexcache", version, about = "Browse the PokeAPI catalog from a local cache")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the catalog, optionally filtered by gender classification
    List {
        /// all, male, female or genderless
        #[arg(short, long, default_value = "all")]
        filter: FilterMode,

        /// Reload from the API instead of the local cache
        #[arg(short, long)]
        refresh: bool,
    },

    /// Show detail for one entry
    Show {
        /// Numeric id or name
        entry: String,

        /// Write the entry's image to this path
        #[arg(long, value_name = "PATH")]
        save_image: Option<PathBuf>,
    },

    /// Print cache location and catalog age
    Status,

    /// Remove all cached images
    ClearImages,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // RUST_LOG controls the level (e.g., RUST_LOG=dexcache_core=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Command::List { filter, refresh } => list(&config, filter, refresh).await,
        Command::Show { entry, save_image } => show(&config, &entry, save_image).await,
        Command::Status => status(&config),
        Command::ClearImages => clear_images(&config),
    }
}

// ============================================================================
// Wiring
// ============================================================================

fn build_session(config: &Config) -> Result<BrowseSession> {
    let client = PokeApiClient::from_config(config).context("Failed to create API client")?;
    let records = RecordStore::new(config.records_dir()?);
    let images = ImageCache::new(config.images_dir()?);
    let service = Arc::new(CatalogService::new(Arc::new(client), records));

    info!(base_url = %config.api_base_url(), "Session created");
    Ok(BrowseSession::new(service, images))
}

/// Turn the first `FetchFailed` event seen since the last call into an error.
fn check_failures(events: &mut broadcast::Receiver<SessionEvent>) -> Result<()> {
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::FetchFailed { operation, message } = event {
            bail!("Failed to load {}: {}", operation, message);
        }
    }
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

async fn list(config: &Config, filter: FilterMode, refresh: bool) -> Result<()> {
    let mut session = build_session(config)?;
    let mut events = session.subscribe();

    if refresh {
        session.refresh().await;
    } else {
        session.load_initial().await;
    }
    check_failures(&mut events)?;

    session.apply_filter(filter);
    for entry in session.filtered() {
        println!("{:>5}  {}", entry.id, entry.name);
    }
    eprintln!("{}: {} of {}", filter.title(), session.filtered().len(), session.catalog().len());
    Ok(())
}

async fn show(config: &Config, key: &str, save_image: Option<PathBuf>) -> Result<()> {
    let mut session = build_session(config)?;
    let mut events = session.subscribe();

    session.load_initial().await;
    check_failures(&mut events)?;

    let Some(entry) = session.find(key).cloned() else {
        bail!("No entry matching '{}'", key);
    };

    session.select(entry);
    while session.has_pending_detail() {
        session.wait_background_task().await;
    }
    check_failures(&mut events)?;

    session.load_image().await;
    check_failures(&mut events)?;

    let Some(selected) = session.selection() else {
        bail!("Selection was cleared");
    };
    println!("#{} {}", selected.id, selected.name);
    println!("  Height: {}", selected.height_display());
    println!("  Weight: {}", selected.weight_display());

    match session.image() {
        Some(data) => {
            println!("  Image:  {} bytes", data.len());
            if let Some(path) = save_image {
                std::fs::write(&path, data)
                    .with_context(|| format!("Failed to write image: {}", path.display()))?;
                println!("  Saved:  {}", path.display());
            }
        }
        None => println!("  Image:  none"),
    }
    Ok(())
}

fn status(config: &Config) -> Result<()> {
    let records = RecordStore::new(config.records_dir()?);
    let images = ImageCache::new(config.images_dir()?);

    println!("API:     {}", config.api_base_url());
    println!("Records: {}", records.dir().display());
    println!("Images:  {}", images.dir().display());
    match (records.load_catalog(), records.catalog_age()) {
        (Some(catalog), Some(age)) => println!("Catalog: {} entries, cached {}", catalog.len(), age),
        _ => println!("Catalog: not cached"),
    }
    Ok(())
}

fn clear_images(config: &Config) -> Result<()> {
    let images = ImageCache::new(config.images_dir()?);
    let removed = images.clear();
    println!("Removed {} cached images from {}", removed, images.dir().display());
    Ok(())
}
