use std::path::Path;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::simulation::SimulationConfig;
use crate::field::FieldKind;
use crate::persistence;
use crate::simulation::effects::FieldEvent;
use crate::simulation::{self, statistics};
use crate::world::{Point, World};

/// Run the simulation: load a map, run the tick loop until interrupted or
/// the tick limit is reached, saving snapshots along the way.
pub async fn run_simulation(
    config: &SimulationConfig,
    world_path: Option<&str>,
    ticks: Option<u64>,
) -> Result<(), String> {
    // 1. Load world
    let snapshot_dir = Path::new(&config.snapshot_directory);
    let mut world = match world_path {
        Some(path) => {
            info!(path, "Loading map");
            persistence::load_snapshot(Path::new(path))
                .map_err(|e| format!("Failed to load snapshot: {}", e))?
        }
        None => {
            info!(dir = %config.snapshot_directory, "Loading latest snapshot");
            persistence::load_latest_valid_snapshot(snapshot_dir)
                .map_err(|e| format!("Failed to load snapshot: {}", e))?
        }
    };

    let seed = config.effective_seed(world.seed());
    let max_ticks = ticks.unwrap_or(config.max_ticks);
    info!(
        width = world.width,
        height = world.height,
        tick = world.tick_count,
        creatures = world.living_creatures(),
        seed,
        "Map loaded"
    );

    // 2. Set up shutdown signal
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    // 3. Run tick loop
    let tick_interval_ms = (1000.0 / config.tick_rate_hz) as u64;
    let mut ticks_since_snapshot: u32 = 0;
    let mut ticks_run: u64 = 0;

    info!(
        tick_rate_hz = config.tick_rate_hz,
        snapshot_interval = config.snapshot_interval,
        max_ticks,
        "Simulation running"
    );

    loop {
        let tick_start = std::time::Instant::now();

        let result = simulation::execute_tick(&mut world, seed);
        ticks_run += 1;

        for event in &result.events {
            log_event(event);
        }
        debug!(
            tick = result.statistics.tick,
            active_tiles = result.statistics.active_tiles,
            entries = result.statistics.total_entries,
            fire_tiles = result.statistics.fire_tiles,
            events = result.statistics.events,
            duration_ms = result.statistics.tick_duration_ms,
            "tick complete"
        );

        // Periodic auto-save
        ticks_since_snapshot += 1;
        if ticks_since_snapshot >= config.snapshot_interval {
            match persistence::save_snapshot(&world, snapshot_dir) {
                Ok(path) => {
                    ticks_since_snapshot = 0;
                    info!(path = %path.display(), "Snapshot saved");

                    if let Err(e) =
                        persistence::prune_snapshots(snapshot_dir, config.max_snapshots as usize)
                    {
                        warn!(error = %e, "Snapshot pruning failed");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Snapshot save failed");
                }
            }
        }

        // Tick milestone logging
        if world.tick_count % 100 == 0 {
            info!(
                tick = world.tick_count,
                active_tiles = result.statistics.active_tiles,
                fire_tiles = result.statistics.fire_tiles,
                creatures = result.statistics.creatures_alive,
                "Milestone"
            );
        }

        if max_ticks > 0 && ticks_run >= max_ticks {
            info!(ticks_run, "Tick limit reached");
            break;
        }

        // Rate limiting: sleep remaining time to hit target tick rate
        let elapsed = tick_start.elapsed();
        let target = std::time::Duration::from_millis(tick_interval_ms);
        if elapsed < target {
            let sleep_duration = target - elapsed;
            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {}
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        } else {
            // Check for shutdown without sleeping
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
                else => {}
            }
        }
    }

    // Graceful shutdown: save final snapshot
    match persistence::save_snapshot(&world, snapshot_dir) {
        Ok(path) => info!(path = %path.display(), "Final snapshot saved"),
        Err(e) => warn!(error = %e, "Final snapshot save failed"),
    }

    info!(tick = world.tick_count, "Simulation stopped");
    Ok(())
}

fn log_event(event: &FieldEvent) {
    match event {
        FieldEvent::Explosion { at, power } => info!(x = at.x, y = at.y, power, "explosion"),
        FieldEvent::Message(text) => debug!(text = %text, "message"),
        FieldEvent::Speech { speaker, line } => debug!(speaker = %speaker, line = %line, "speech"),
        FieldEvent::MonsterSpawned { species, at } => {
            info!(species = %species, x = at.x, y = at.y, "monster spawned")
        }
        FieldEvent::ItemHit { item, at, victim } => {
            debug!(item = %item, victim = %victim, x = at.x, y = at.y, "item hit")
        }
        FieldEvent::CreatureDied { name, at } => info!(name = %name, x = at.x, y = at.y, "creature died"),
    }
}

/// Inspect a tile or map summary from the latest snapshot.
pub fn inspect(
    config: &SimulationConfig,
    tile: Option<(i32, i32)>,
    show_world: bool,
    as_json: bool,
) -> Result<(), String> {
    let snapshot_dir = Path::new(&config.snapshot_directory);
    let world = persistence::load_latest_valid_snapshot(snapshot_dir)
        .map_err(|e| format!("Failed to load snapshot: {}", e))?;

    if let Some((x, y)) = tile {
        let report = tile_report(&world, Point::new(x, y))?;
        if as_json {
            let text = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
            println!("{}", text);
        } else {
            print_tile_report(&report);
        }
        Ok(())
    } else if show_world {
        inspect_world(&world);
        Ok(())
    } else {
        Err("Specify --x <X> --y <Y> or --world".to_string())
    }
}

/// Everything known about one square, as a JSON document.
pub fn tile_report(world: &World, p: Point) -> Result<Value, String> {
    let tile = world.tile(p).ok_or_else(|| {
        format!(
            "Tile ({}, {}) is off the map ({}x{})",
            p.x, p.y, world.width, world.height
        )
    })?;

    let fields: Vec<Value> = tile
        .fields
        .iter()
        .map(|e| {
            json!({
                "kind": e.kind().id(),
                "name": e.name(),
                "density": e.density(),
                "age": e.age(),
                "dangerous": e.is_dangerous(),
                "transparency": e.transparency(),
                "luminance": e.luminance(),
            })
        })
        .collect();
    let items: Vec<&str> = tile.items.iter().map(|i| i.type_id.as_str()).collect();
    let creature = world.creature_at(p).map(|i| world.creatures[i].name.clone());

    Ok(json!({
        "x": p.x,
        "y": p.y,
        "terrain": tile.terrain.name(),
        "furniture": tile.furniture.name(),
        "outside": tile.outside,
        "scent": tile.scent,
        "radiation": tile.radiation,
        "draw_symbol": tile.fields.symbol().id(),
        "transparency": tile.fields.transparency(),
        "luminance": tile.fields.luminance(),
        "fields": fields,
        "items": items,
        "creature": creature,
    }))
}

fn print_tile_report(report: &Value) {
    println!("=== Tile ({}, {}) ===", report["x"], report["y"]);
    println!("Terrain: {}", report["terrain"].as_str().unwrap_or("?"));
    if let Some(furniture) = report["furniture"].as_str().filter(|f| !f.is_empty()) {
        println!("Furniture: {}", furniture);
    }
    println!("Outside: {}", report["outside"]);
    println!("Scent: {}  Radiation: {}", report["scent"], report["radiation"]);
    if let Some(name) = report["creature"].as_str() {
        println!("Occupant: {}", name);
    }
    println!();
    println!("--- Fields ---");
    match report["fields"].as_array() {
        Some(fields) if !fields.is_empty() => {
            println!(
                "  {:<22} {:>7} {:>7} {:>9} {:>6} {:>6}",
                "Name", "Density", "Age", "Dangerous", "Trans", "Lum"
            );
            for f in fields {
                println!(
                    "  {:<22} {:>7} {:>7} {:>9} {:>6.2} {:>6.1}",
                    f["name"].as_str().unwrap_or("?"),
                    f["density"],
                    f["age"],
                    f["dangerous"],
                    f["transparency"].as_f64().unwrap_or(0.0),
                    f["luminance"].as_f64().unwrap_or(0.0),
                );
            }
        }
        _ => println!("  (none)"),
    }
    println!();
    println!("--- Items ---");
    match report["items"].as_array() {
        Some(items) if !items.is_empty() => {
            for item in items {
                println!("  {}", item.as_str().unwrap_or("?"));
            }
        }
        _ => println!("  (none)"),
    }
}

fn inspect_world(world: &World) {
    let stats = statistics::compute_statistics(world, 0, 0.0);

    println!("=== Map: {} ===", world.name);
    println!("ID: {}", world.id);
    println!("Tick: {}", world.tick_count);
    println!("Size: {}x{}", world.width, world.height);
    println!("Creatures alive: {}", stats.creatures_alive);
    println!();

    let n = world.tile_count().max(1) as f64;
    println!("--- Fields ---");
    println!(
        "  Active tiles: {} ({:.1}%)",
        stats.active_tiles,
        stats.active_tiles as f64 / n * 100.0
    );
    println!("  Entries: {}  Total density: {}", stats.total_entries, stats.total_density);
    println!("  Burning: {}  Obscured: {}  Lit: {}", stats.fire_tiles, stats.opaque_tiles, stats.luminous_tiles);
    println!();

    println!("--- Kind Distribution ---");
    for (kind, count) in stats.top_kinds(stats.kind_counts.len()) {
        println!("  {:<22} {:>6}", kind.id(), count);
    }
}

/// Print the static field type catalog.
pub fn catalog() {
    println!(
        "{:>3} {:<22} {:>3} {:>4} {:>6} {:<7} Names",
        "#", "Id", "Sym", "Pri", "Half", "Decay"
    );
    println!("{}", "-".repeat(90));
    for kind in FieldKind::ALL {
        let def = kind.def();
        let names: Vec<&str> = def.variants.iter().map(|v| v.name).collect();
        println!(
            "{:>3} {:<22} {:>3} {:>4} {:>6} {:<7} {}",
            kind.index(),
            def.id,
            def.symbol,
            def.priority,
            def.half_life,
            format!("{:?}", def.decay),
            names.join(" / ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Item;

    #[test]
    fn tile_report_lists_fields_and_items() {
        let mut world = World::blank(6, 6);
        let p = Point::new(1, 2);
        world.add_field(p, FieldKind::Smoke, 3, 12);
        world.spawn_item(p, Item::new("rock", &[crate::world::item::Material::Stone], 1));

        let report = tile_report(&world, p).unwrap();
        assert_eq!(report["terrain"], "dirt");
        assert_eq!(report["fields"][0]["kind"], "fd_smoke");
        assert_eq!(report["fields"][0]["density"], 3);
        assert_eq!(report["fields"][0]["age"], 12);
        assert_eq!(report["fields"][0]["transparency"], 0.0);
        assert_eq!(report["items"][0], "rock");
        assert_eq!(report["draw_symbol"], "fd_smoke");
    }

    #[test]
    fn tile_report_off_map() {
        let world = World::blank(4, 4);
        let err = tile_report(&world, Point::new(9, 0)).unwrap_err();
        assert!(err.contains("off the map"), "Error: {}", err);
    }

    #[test]
    fn inspect_without_target_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let world = World::blank(8, 8);
        persistence::save_snapshot(&world, dir.path()).unwrap();
        let config = SimulationConfig {
            snapshot_directory: dir.path().display().to_string(),
            ..SimulationConfig::default()
        };
        let err = inspect(&config, None, false, false).unwrap_err();
        assert!(err.contains("--world"), "Error: {}", err);
        inspect(&config, Some((1, 1)), false, true).unwrap();
    }

    #[tokio::test]
    async fn bounded_run_saves_a_final_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut world = World::blank(8, 8);
        world.add_field(Point::new(4, 4), FieldKind::Smoke, 3, 1);
        persistence::save_snapshot(&world, dir.path()).unwrap();
        let config = SimulationConfig {
            snapshot_directory: dir.path().display().to_string(),
            tick_rate_hz: 1000.0,
            ..SimulationConfig::default()
        };
        run_simulation(&config, None, Some(3)).await.unwrap();
        let latest = persistence::load_latest_valid_snapshot(dir.path()).unwrap();
        assert_eq!(latest.tick_count, 3);
    }
}
