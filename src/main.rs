//! Craft Calculator
//!
//! A production chain throughput calculator for crafting games.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing::info;

use craft_calculator::report::PlanReport;
use craft_calculator::{ThroughputCalculator, catalog_file, db, logging, sample};

#[derive(Parser)]
#[command(name = "craft-calculator")]
#[command(about = "Production chain throughput calculator for crafting games")]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, env = "CRAFT_CALC_DB", default_value = "craft_data.db")]
    database: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import items from a JSON item database
    Import {
        /// Path to the JSON file
        file: PathBuf,

        /// Clear existing items before import
        #[arg(long)]
        clear: bool,
    },

    /// Export all items to a JSON item database
    Export {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Calculate crafters and throughput for a target item
    Calc {
        /// Target item to produce (e.g., "reinforced_iron_plate")
        item: String,

        /// Target production rate in units per minute
        #[arg(short, long, default_value = "1.0")]
        rate: f64,

        /// Also write the report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List all items in the database
    ListItems,

    /// Show the recipes for a specific item
    Item {
        /// Item name
        name: String,
    },

    /// Choose which recipe an item uses for calculations
    SetIdeal {
        /// Item name
        name: String,

        /// Zero-based recipe index as listed by `item`
        index: usize,
    },

    /// Initialize empty database with schema
    Init,

    /// Load sample data for testing (without an item database)
    LoadSample,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let mut conn = Connection::open(&cli.database)
        .with_context(|| format!("Failed to open {}", cli.database.display()))?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Import { file, clear } => {
            let (read, catalog) = catalog_file::import_file(&mut conn, &file, clear)?;
            if clear {
                println!("Replaced existing items");
            }
            println!("Imported {} items ({} in catalog)", read, catalog.len());
        }

        Commands::Export { file } => {
            let catalog = db::load_catalog(&conn)?;
            let items: Vec<_> = catalog.items().cloned().collect();
            catalog_file::write_items(&file, &items)?;
            println!("Exported {} items to {}", items.len(), file.display());
        }

        Commands::Calc { item, rate, output } => {
            let catalog = db::load_catalog(&conn)?;
            let report = ThroughputCalculator::new(&catalog).expand(&item, rate)?;
            let text = PlanReport::new(&report, &catalog)?.to_string();

            println!("{}", text);

            if let Some(path) = output {
                fs::write(&path, &text)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), "saved report");
            }
        }

        Commands::ListItems => {
            let items = db::list_items(&conn)?;
            if items.is_empty() {
                println!("No items in database. Run 'import' or 'load-sample' first.");
            } else {
                println!("Items:");
                for name in items {
                    println!("  {}", name);
                }
            }
        }

        Commands::Item { name } => {
            if let Some(item) = db::get_item(&conn, &name)? {
                println!("Item: {}", item.name);
                for (index, recipe) in item.recipes.iter().enumerate() {
                    let marker = if index == item.ideal_index() { " (ideal)" } else { "" };
                    println!("  Recipe {}{}:", index, marker);
                    println!("    Time: {}s", recipe.craft_time_seconds);
                    match recipe.products_per_minute() {
                        Ok(rate) => println!("    Makes: {:.2}/min per crafter", rate),
                        Err(e) => println!("    Makes: invalid ({})", e),
                    }
                    match recipe.power_per_minute() {
                        Some(power) => println!("    Power: {:.1}/min per crafter", power),
                        None => println!("    Power: none"),
                    }
                    if !recipe.input_items.is_empty() {
                        println!("    Inputs:");
                        for (input, quantity) in &recipe.input_items {
                            println!("      {} x {}", input, quantity);
                        }
                    }
                    println!("    Outputs:");
                    for (output, quantity) in &recipe.output_items {
                        println!("      {} x {}", output, quantity);
                    }
                }
            } else {
                println!("Item '{}' not found", name);
            }
        }

        Commands::SetIdeal { name, index } => {
            db::set_ideal_recipe(&conn, &name, index)?;
            println!("'{}' now uses recipe {}", name, index);
        }

        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            let count = sample::load_sample_data(&mut conn)?;
            println!("Loaded {} sample items", count);
        }
    }

    Ok(())
}
