use anyhow::Context;
use clap::{Parser, Subcommand};
use pokedex::apis::PokeApiClient;
use pokedex::app::{CatalogService, ImportProgress};
use pokedex::config::Config;
use pokedex::logging;
use pokedex::metrics::CatalogMetrics;
use pokedex::storage::SqliteStore;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "pokedex")]
#[command(about = "Development harness for the creature catalog core")]
#[command(version)]
struct Cli {
    /// Path to a config.toml; defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one creature, cache first
    Lookup { name: String },
    /// Import a page of creatures from upstream into the local cache
    Import {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Print the flattened evolution chain of a species
    Evolution { species: String },
    /// Print a page of cached creatures
    Page {
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Cached creatures of one type
    ByType { type_name: String },
    /// Creature names listed under one type upstream
    Roster { type_name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let _guard = logging::init_logging(&config.logging);
    CatalogMetrics::register_metrics();

    let api = PokeApiClient::from_config(&config.api).context("building HTTP client")?;
    let store = SqliteStore::open(&config.storage.database_path).with_context(|| {
        format!(
            "opening store at {}",
            config.storage.database_path.display()
        )
    })?;
    let mut service = CatalogService::new(api, store);
    if let Some(limits) = config.import.limits() {
        service = service.with_rate_limit(limits);
    }

    match cli.command {
        Commands::Lookup { name } => {
            let creature = service.lookup(&name).await?;
            println!("{}", serde_json::to_string_pretty(&creature)?);
        }
        Commands::Import { limit, offset } => {
            let report = service
                .import_range_with_progress(limit, offset, |p: &ImportProgress| {
                    info!(
                        current = p.current,
                        total = p.total,
                        name = %p.name,
                        ok = p.succeeded,
                        "Import progress"
                    );
                })
                .await?;
            println!(
                "Imported {} of {} creatures ({} failed)",
                report.imported,
                report.requested,
                report.failures.len()
            );
            for failure in &report.failures {
                warn!(name = %failure.name, error = %failure.error, "Import failure");
                println!("  - {}: {}", failure.name, failure.error);
            }
        }
        Commands::Evolution { species } => {
            let stages = service.evolution_chain_for(&species).await?;
            for stage in &stages {
                println!("{}{}", "  ".repeat(stage.depth), stage.species_name);
            }
        }
        Commands::Page { offset, limit } => {
            for creature in service.page(offset, limit)? {
                println!("#{:<5} {}", creature.id, creature.name);
            }
        }
        Commands::ByType { type_name } => {
            for creature in service.creatures_by_type(&type_name)? {
                println!("#{:<5} {}", creature.id, creature.name);
            }
        }
        Commands::Roster { type_name } => {
            let roster = service.type_roster(&type_name).await?;
            for member in &roster.members {
                println!("{} (slot {})", member.name, member.slot);
            }
        }
    }

    Ok(())
}
