//! `granary` — a thin CLI over the `granary-api` façade.
//!
//! No logic of its own beyond argument parsing, JSON<->Value conversion,
//! and calling the public API. Values are given and printed as JSON.

mod value_json;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use granary_api::Warehouse;
use granary_storage::StoreConfig;

#[derive(Parser)]
#[command(name = "granary", about = "Single-file object warehouse CLI")]
struct Cli {
    /// Path to the warehouse file.
    #[arg(long, global = true)]
    db: PathBuf,

    /// Container to operate on.
    #[arg(long, global = true)]
    container: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Insert a JSON value with an annotation string.
    Insert { notes: String, value_json: String },
    /// Select: an integer offset or a comma-tag string.
    Select {
        dual: String,
        #[arg(long)]
        pop: bool,
    },
    /// Delete by kid (integer) or comma-tag string.
    Delete {
        dual: String,
        #[arg(long)]
        wild: bool,
    },
    /// Prune rows older than `days` relative to the newest row. Omit
    /// `--days` to leave the container untouched.
    Prune {
        #[arg(long)]
        days: Option<i64>,
    },
    /// Compact the file with VACUUM.
    Vacuum,
    /// Farm summary operation against a shard directory.
    Plant {
        #[arg(long)]
        shards: PathBuf,
        notes: String,
        value_json: String,
    },
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> granary_core::Result<()> {
    let container = cli.container.as_deref();
    match cli.command {
        Command::Insert { notes, value_json } => {
            let warehouse = Warehouse::open(StoreConfig::new(&cli.db))?;
            let value = value_json::parse(&value_json)?;
            warehouse.insert(&value, notes, container)
        }
        Command::Select { dual, pop } => {
            let warehouse = Warehouse::open(StoreConfig::new(&cli.db))?;
            let dual = value_json::parse_dual(&dual);
            match warehouse.select_latest(dual, container, pop)? {
                Some(value) => {
                    println!("{}", value_json::stringify(&value));
                    Ok(())
                }
                None => {
                    println!("null");
                    Ok(())
                }
            }
        }
        Command::Delete { dual, wild } => {
            let warehouse = Warehouse::open(StoreConfig::new(&cli.db))?;
            let dual = value_json::parse_dual(&dual);
            warehouse.delete(dual, container, wild)
        }
        Command::Prune { days } => {
            let warehouse = Warehouse::open(StoreConfig::new(&cli.db))?;
            warehouse.prune(days, container)
        }
        Command::Vacuum => {
            let warehouse = Warehouse::open(StoreConfig::new(&cli.db))?;
            warehouse.vacuum()
        }
        Command::Plant { shards, notes, value_json } => {
            let farmed = granary_api::FarmedWarehouse::open(
                StoreConfig::new(&cli.db),
                granary_farm::FarmConfig::new(shards),
            )?;
            let value = value_json::parse(&value_json)?;
            farmed.plant(&value, &notes, container.unwrap_or(granary_storage::DEFAULT_CONTAINER))
        }
    }
}
