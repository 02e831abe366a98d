use clap::{Parser, Subcommand};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hazardfield::cli::commands;
use hazardfield::config::generation::GenerationParams;
use hazardfield::config::simulation::SimulationConfig;
use hazardfield::persistence;
use hazardfield::world::generation::{generate_world, print_world_summary};

#[derive(Parser)]
#[command(name = "hazardfield")]
#[command(about = "A tile-grid environmental hazard simulation: fire, gas, acid, electricity and friends")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new map from procedural parameters
    Generate {
        /// Path to map generation config file
        #[arg(short, long, default_value = "mapgen.toml")]
        map: String,

        /// Output snapshot directory
        #[arg(short, long, default_value = "snapshots")]
        output: String,
    },

    /// Run the tick loop
    Run {
        /// Path to a specific snapshot to load
        #[arg(short, long)]
        world: Option<String>,

        /// Stop after this many ticks
        #[arg(short, long)]
        ticks: Option<u64>,
    },

    /// Inspect a tile or the whole map
    Inspect {
        /// Tile column
        #[arg(short, long, requires = "y")]
        x: Option<i32>,

        /// Tile row
        #[arg(short, long, requires = "x")]
        y: Option<i32>,

        /// Show map-level summary statistics
        #[arg(long)]
        world: bool,

        /// Print the tile as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage map snapshots
    Snapshots {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// Print the field type catalog
    Catalog,
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// List available snapshots
    List {
        /// Snapshot directory
        #[arg(short, long, default_value = "snapshots")]
        dir: String,
    },

    /// Restore and display a map from a snapshot file
    Restore {
        /// Path to the snapshot file
        file: String,
    },
}

/// Install the log formatter. `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn load_config(path: &str) -> SimulationConfig {
    match SimulationConfig::from_file(Path::new(path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Commands that need the config fail loudly on a bad file; the rest
    // fall back to defaults so logging still works without one.
    let needs_config = matches!(cli.command, Commands::Run { .. } | Commands::Inspect { .. });
    let config = if needs_config {
        load_config(&cli.config)
    } else {
        SimulationConfig::from_file(Path::new(&cli.config)).unwrap_or_default()
    };
    init_tracing(&config.log_level, cli.log_json);

    match cli.command {
        Commands::Generate { map, output } => {
            let params = match GenerationParams::from_file(Path::new(&map)) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Error loading generation config: {}", e);
                    std::process::exit(1);
                }
            };
            info!(path = %map, "Generating map");
            let world = generate_world(&params);
            print_world_summary(&world);

            let snapshot_dir = Path::new(&output);
            match persistence::save_snapshot(&world, snapshot_dir) {
                Ok(path) => println!("\nMap saved to {}", path.display()),
                Err(e) => {
                    eprintln!("Cannot save snapshot: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Run { world, ticks } => {
            if let Err(e) = commands::run_simulation(&config, world.as_deref(), ticks).await {
                eprintln!("Simulation error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Inspect { x, y, world, json } => {
            let tile = x.zip(y);
            if let Err(e) = commands::inspect(&config, tile, world, json) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Snapshots { action } => match action {
            SnapshotAction::List { dir } => {
                let snapshot_dir = Path::new(&dir);
                match persistence::list_snapshots(snapshot_dir) {
                    Ok(snapshots) => {
                        if snapshots.is_empty() {
                            println!("No snapshots found in {}", snapshot_dir.display());
                        } else {
                            println!(
                                "{:<36} {:>8} {:>9} {:>8} {:>8} {:>10}",
                                "File", "Tick", "Map", "Active", "Alive", "Size"
                            );
                            println!("{}", "-".repeat(84));
                            for s in &snapshots {
                                let name = s
                                    .path
                                    .file_name()
                                    .and_then(|n| n.to_str())
                                    .unwrap_or("?");
                                let size_kb = s.file_size / 1024;
                                println!(
                                    "{:<36} {:>8} {:>9} {:>8} {:>8} {:>7} KB",
                                    name,
                                    s.tick_count,
                                    format!("{}x{}", s.width, s.height),
                                    s.active_tiles,
                                    s.creatures,
                                    size_kb
                                );
                            }
                            println!(
                                "\n{} snapshot(s) in {}",
                                snapshots.len(),
                                snapshot_dir.display()
                            );
                        }
                    }
                    Err(e) => {
                        eprintln!("Error listing snapshots: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            SnapshotAction::Restore { file } => {
                let path = Path::new(&file);
                match persistence::load_snapshot(path) {
                    Ok(world) => {
                        println!("Restored map from {}", path.display());
                        print_world_summary(&world);
                    }
                    Err(e) => {
                        eprintln!("Error restoring snapshot: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        },

        Commands::Catalog => commands::catalog(),
    }
}
