use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use incentive_import::apis::ibge::IbgeClient;
use incentive_import::config::Config;
use incentive_import::error::ImportError;
use incentive_import::gateway::firestore::FirestoreStore;
use incentive_import::geo::GeoLoader;
use incentive_import::logging;
use incentive_import::pipeline::{ImportSummary, Importer};
use incentive_import::seed::seed_state_aggregates;
use incentive_import::sheet::Workbook;
use incentive_import::storage::{DocumentStore, InMemoryStore};

#[derive(Parser)]
#[command(name = "incentive_import")]
#[command(about = "Imports incentive-law projects into Firestore")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import project rows from the spreadsheet
    Import {
        /// Spreadsheet to read instead of the configured one
        #[arg(long)]
        spreadsheet: Option<PathBuf>,
        /// Sheets to import (repeatable); defaults to the configured list
        #[arg(long = "sheet")]
        sheets: Vec<String>,
        /// Keep documents in memory and dump them to the output directory
        #[arg(long)]
        dry_run: bool,
    },
    /// Write the per-state aggregate fixture documents
    SeedStates {
        #[arg(long)]
        dry_run: bool,
    },
    /// Load the geographic reference, fetching it if no cache exists
    Geo {
        /// Ignore the cache and fetch again
        #[arg(long)]
        refresh: bool,
    },
}

fn open_store(config: &Config, dry_run: bool) -> anyhow::Result<(Arc<dyn DocumentStore>, Option<InMemoryStore>)> {
    if dry_run {
        let memory = InMemoryStore::new();
        return Ok((Arc::new(memory.clone()), Some(memory)));
    }
    let settings = config.firestore_settings()?;
    let store = FirestoreStore::new(settings, config.http_timeout())
        .map_err(ImportError::from)
        .context("Failed to set up Firestore client")?;
    Ok((Arc::new(store), None))
}

fn geo_loader(config: &Config) -> anyhow::Result<GeoLoader> {
    let client = IbgeClient::new(&config.ibge_base_url, config.http_timeout())?;
    Ok(GeoLoader::new(&config.geo_cache_path, Box::new(client)))
}

fn print_summary(summary: &ImportSummary) {
    println!("\n📊 Import results:");
    println!("   Sheets: {}", summary.sheets.join(", "));
    println!("   Rows processed: {}", summary.processed);
    println!("   Written: {}", summary.written);
    println!("   Skipped: {}", summary.skipped);
    println!("   Failed: {}", summary.failures.len());
    if !summary.failures.is_empty() {
        println!("\n⚠️  Failed rows:");
        for failure in &summary.failures {
            println!("   - [{} #{}] {}: {}", failure.sheet, failure.row, failure.name, failure.reason);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Import {
            spreadsheet,
            sheets,
            dry_run,
        } => {
            println!("🔄 Running import...");
            let (store, memory) = open_store(&config, dry_run)?;
            let geo = geo_loader(&config)?
                .load()
                .await
                .context("Failed to load geographic reference")?;

            let path = spreadsheet.unwrap_or_else(|| config.spreadsheet_path.clone());
            let sheets = if sheets.is_empty() { config.sheets.clone() } else { sheets };
            let mut workbook = Workbook::open(&path)?;

            let importer = Importer::new(
                Arc::new(geo),
                store,
                &config.projects_collection,
                config.row_options(),
            );
            let summary = importer.run(&mut workbook, &sheets).await?;
            print_summary(&summary);

            if let Some(memory) = memory {
                let file = memory.dump_to_json(&config.projects_collection, &config.output_dir)?;
                println!("💾 Dry run documents saved to {}", file);
            }
        }
        Commands::SeedStates { dry_run } => {
            println!("🌱 Seeding state aggregates...");
            let (store, memory) = open_store(&config, dry_run)?;
            let written = seed_state_aggregates(store.as_ref(), &config.state_aggregates_collection).await?;
            println!("✅ {} state documents written", written);

            if let Some(memory) = memory {
                let file = memory.dump_to_json(&config.state_aggregates_collection, &config.output_dir)?;
                println!("💾 Dry run documents saved to {}", file);
            }
        }
        Commands::Geo { refresh } => {
            let loader = geo_loader(&config)?;
            let geo = if refresh {
                loader.refresh().await?
            } else {
                loader.load().await?
            };
            let municipalities: usize = geo.municipalities_by_state.values().map(Vec::len).sum();
            info!("Geographic reference ready at {}", loader.cache_path().display());
            println!(
                "✅ {} states, {} municipalities ({})",
                geo.states.len(),
                municipalities,
                loader.cache_path().display()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let _guard = logging::init_logging();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run failed: {:#}", e);
            println!("❌ {:#}", e);
            let code = e.downcast_ref::<ImportError>().map_or(1, ImportError::exit_code);
            ExitCode::from(code)
        }
    }
}
