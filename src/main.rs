//! Loadout Calculator
//!
//! Crafting resource calculator for raid loadouts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use loadout_calculator::afford::{self, Inventory};
use loadout_calculator::calculator::{self, CalcOptions};
use loadout_calculator::catalog::Catalog;
use loadout_calculator::config::CalcConfig;
use loadout_calculator::consolidate;
use loadout_calculator::loadout::Loadout;
use loadout_calculator::sample;
use loadout_calculator::tree::ExpansionSet;

#[derive(Parser)]
#[command(name = "loadout-calculator")]
#[command(about = "Crafting resource calculator for raid loadouts")]
struct Cli {
    /// Path to the catalog JSON [env: LOADOUT_CATALOG]
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Maximum recipe expansion depth [env: LOADOUT_MAX_RECIPE_DEPTH]
    #[arg(long)]
    max_depth: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the materials a loadout needs
    Calc {
        /// Loadout JSON file
        loadout: PathBuf,

        /// Expand a craftable material into its ingredients (repeatable)
        #[arg(short, long = "expand", value_name = "NAME")]
        expand: Vec<String>,

        /// Inventory JSON file mapping material names to owned amounts
        #[arg(short, long)]
        inventory: Option<PathBuf>,

        /// Plan materials for this many loadouts instead of checking the stash
        #[arg(short, long)]
        rounds: Option<String>,

        /// Also show a tree for each loadout entry
        #[arg(long)]
        group_by_item: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all weapons in the catalog
    ListWeapons,

    /// List all materials in the catalog
    ListMaterials,

    /// Show tiers, upgrade costs and compatible mods for a weapon
    Weapon {
        /// Weapon ID
        id: String,
    },

    /// Check the catalog for duplicate ids, zero quantities and recipe cycles
    Validate,

    /// Build a catalog from scraped wiki data
    Consolidate {
        /// Directory containing the scraped JSON files
        source_dir: PathBuf,

        /// Where to write the catalog
        #[arg(short, long, default_value = "game_data.json")]
        output: PathBuf,
    },

    /// Write the built-in sample catalog
    Sample {
        #[arg(short, long, default_value = "game_data.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CalcConfig::from_env().with_overrides(cli.catalog, cli.max_depth);

    match cli.command {
        Commands::Calc {
            loadout,
            expand,
            inventory,
            rounds,
            group_by_item,
            json,
        } => {
            let catalog = load_catalog(&config.catalog_path)?;
            let loadout = Loadout::load(&loadout)
                .with_context(|| format!("Failed to load loadout {}", loadout.display()))?;
            let inventory = match inventory {
                Some(path) => Inventory::load(&path)
                    .with_context(|| format!("Failed to load inventory {}", path.display()))?,
                None => Inventory::new(),
            };

            let options = CalcOptions {
                expanded: expand.into_iter().collect::<ExpansionSet>(),
                inventory,
                target_rounds: rounds.as_deref().map(afford::parse_target_rounds),
                group_by_item,
                max_depth: config.max_recipe_depth,
            };
            let report = calculator::calculate(&catalog, &loadout, &options)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }

        Commands::ListWeapons => {
            let catalog = load_catalog(&config.catalog_path)?;
            if catalog.weapons().is_empty() {
                println!("No weapons in catalog. Run 'consolidate' or 'sample' first.");
            } else {
                println!("{:<20} {:<24} {:<14} {:<10} {:>5}", "ID", "Weapon", "Category", "Rarity", "Tiers");
                println!("{}", "-".repeat(77));
                for w in catalog.weapons() {
                    println!(
                        "{:<20} {:<24} {:<14} {:<10} {:>5}",
                        w.id,
                        w.name,
                        w.category,
                        w.rarity.map(|r| r.as_str()).unwrap_or("-"),
                        Catalog::max_tier(w)
                    );
                }
            }
        }

        Commands::ListMaterials => {
            let catalog = load_catalog(&config.catalog_path)?;
            if catalog.materials().is_empty() {
                println!("No materials in catalog. Run 'consolidate' or 'sample' first.");
            } else {
                println!("{:<32} {:<10} {:<8} {:>6}", "Material", "Rarity", "Craft", "Yield");
                println!("{}", "-".repeat(59));
                for m in catalog.materials() {
                    let craftable = catalog.is_craftable(&m.name);
                    println!(
                        "{:<32} {:<10} {:<8} {:>6}",
                        m.name,
                        m.rarity.map(|r| r.as_str()).unwrap_or("-"),
                        if craftable { "yes" } else { "no" },
                        if craftable {
                            m.crafting.output_per_craft().to_string()
                        } else {
                            "-".to_string()
                        }
                    );
                }
            }
        }

        Commands::Weapon { id } => {
            let catalog = load_catalog(&config.catalog_path)?;
            let Some(w) = catalog.weapon(&id) else {
                println!("Weapon '{}' not found", id);
                return Ok(());
            };

            println!("Weapon: {}", w.name);
            println!("  ID: {}", w.id);
            println!("  Category: {}", w.category);
            if let Some(rarity) = w.rarity {
                println!("  Rarity: {}", rarity);
            }
            if let Some(ammo) = &w.ammo_type {
                println!("  Ammo: {}", ammo);
            }
            println!("  Max tier: {}", Catalog::max_tier(w));

            println!("  Tier 1:");
            for m in &w.crafting.materials {
                println!("    {} x{}", m.material, m.quantity);
            }
            for (i, upgrade) in w.crafting.upgrades.iter().enumerate() {
                println!("  Tier {}:", i + 2);
                for m in &upgrade.materials {
                    println!("    {} x{}", m.material, m.quantity);
                }
            }

            if !w.modification_slots.is_empty() {
                println!("  Mod slots:");
                for slot in &w.modification_slots {
                    let mods = catalog.modifications_for_slot(&w.name, slot);
                    let names: Vec<_> = mods.iter().map(|m| m.name.as_str()).collect();
                    if names.is_empty() {
                        println!("    {}: (none)", slot);
                    } else {
                        println!("    {}: {}", slot, names.join(", "));
                    }
                }
            }
        }

        Commands::Validate => {
            let catalog = load_catalog(&config.catalog_path)?;
            let issues = catalog.validate();
            if issues.is_empty() {
                println!("Catalog OK.");
            } else {
                for issue in &issues {
                    println!("  {}", issue);
                }
                println!("{} problem(s) found", issues.len());
            }
            if issues.iter().any(|i| i.is_fatal()) {
                bail!("catalog contains recipe cycles");
            }
        }

        Commands::Consolidate { source_dir, output } => {
            let (doc, stats) = consolidate::consolidate(&source_dir)?;
            consolidate::write_catalog(&doc, &output)?;
            println!("Saved consolidated data to {}\n", output.display());
            println!("{}", stats);
        }

        Commands::Sample { output } => {
            consolidate::write_catalog(&sample::sample_catalog(), &output)?;
            println!("Sample catalog written to {}", output.display());
        }
    }

    Ok(())
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    Catalog::load(path).with_context(|| {
        format!(
            "No catalog at {}. Run 'consolidate' or 'sample' first, or pass --catalog.",
            path.display()
        )
    })
}
