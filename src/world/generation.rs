use std::collections::HashMap;

use noise::{NoiseFn, Perlin};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use uuid::Uuid;

use crate::config::generation::GenerationParams;
use crate::field::FieldKind;
use crate::world::creature::{Character, Creature, Monster, MonsterFlag};
use crate::world::item::{AmmoEffect, Item, Material};
use crate::world::tile::*;
use crate::world::{Point, World};

/// Attempts at finding a free walkable square before giving up on a spawn.
const PLACEMENT_TRIES: u32 = 200;

/// Generate a new map from the given parameters.
///
/// If `params.seed` is 0, a random seed is chosen. The actual seed used
/// is stored in the returned World's `generation_params` for reproducibility.
pub fn generate_world(params: &GenerationParams) -> World {
    let seed = if params.seed == 0 {
        rand::thread_rng().r#gen()
    } else {
        params.seed
    };
    let resolved_params = GenerationParams {
        seed,
        ..params.clone()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut world = World::blank(params.width, params.height);
    world.id = Uuid::from_bytes(rng.r#gen());
    world.name = format!("Map-{}", seed);
    world.created_at = format!(
        "{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    );
    world.generation_params = resolved_params;

    lay_ground(&mut world, seed as u32, params.water_ratio, params.vegetation_ratio);
    raise_buildings(&mut world, &mut rng, params.building_count);
    scatter_items(&mut world, &mut rng, params.item_density);
    populate(&mut world, &mut rng, params.npc_count, params.monster_count);
    seed_hazards(&mut world, &mut rng, params.ignition_points, params.hazard_density);

    world.transparency_dirty = true;
    debug!(
        seed,
        width = world.width,
        height = world.height,
        creatures = world.creatures.len(),
        "map generated"
    );
    world
}

/// Print a summary of the generated map.
pub fn print_world_summary(world: &World) {
    println!("=== Map Summary ===");
    println!("Name: {}", world.name);
    println!("Size: {}x{} ({} tiles)", world.width, world.height, world.tile_count());
    println!("Seed: {}", world.generation_params.seed);
    println!("Tick: {}", world.tick_count);

    let mut terrain_counts: HashMap<&str, u32> = HashMap::new();
    for tile in &world.tiles {
        *terrain_counts.entry(tile.terrain.name()).or_insert(0) += 1;
    }
    let mut terrain_sorted: Vec<_> = terrain_counts.into_iter().collect();
    terrain_sorted.sort_by_key(|&(name, _)| name);
    println!("\nTerrain:");
    for (name, count) in &terrain_sorted {
        let pct = *count as f32 / world.tile_count() as f32 * 100.0;
        println!("  {:<18} {:>5} ({:.1}%)", name, count, pct);
    }

    let mut field_counts: HashMap<&str, u32> = HashMap::new();
    for tile in &world.tiles {
        for entry in tile.fields.iter() {
            *field_counts.entry(entry.kind().id()).or_insert(0) += 1;
        }
    }
    if !field_counts.is_empty() {
        let mut field_sorted: Vec<_> = field_counts.into_iter().collect();
        field_sorted.sort_by_key(|&(name, _)| name);
        println!("\nFields:");
        for (name, count) in &field_sorted {
            println!("  {:<18} {:>5}", name, count);
        }
    }

    let items: usize = world.tiles.iter().map(|t| t.items.len()).sum();
    let (characters, monsters): (Vec<&Creature>, Vec<&Creature>) = world
        .creatures
        .iter()
        .filter(|c| !c.dead)
        .partition(|c| c.as_character().is_some());
    println!("\nItems: {}", items);
    println!("Characters: {}", characters.len());
    println!("Monsters: {}", monsters.len());
}

// --- Internal generation functions ---

/// Indices of `values` ordered from lowest to highest.
fn ranked(values: &[f32]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    indices
}

fn sample(perlin: &Perlin, p: Point, scale: f64) -> f32 {
    perlin.get([p.x as f64 * scale, p.y as f64 * scale]) as f32
}

fn lay_ground(world: &mut World, seed: u32, water_ratio: f32, vegetation_ratio: f32) {
    let elevation_noise = Perlin::new(seed);
    let growth_noise = Perlin::new(seed.wrapping_add(1));
    let points: Vec<Point> = (0..world.tile_count()).map(|i| world.point_of(i)).collect();
    let elevation: Vec<f32> = points.iter().map(|&p| sample(&elevation_noise, p, 0.08)).collect();

    // Lowest squares flood; the bottom third of the water is deep.
    let by_elevation = ranked(&elevation);
    let water_count = (world.tile_count() as f32 * water_ratio).round() as usize;
    let deep_count = water_count / 3;
    for (rank, &idx) in by_elevation.iter().take(water_count).enumerate() {
        world.tiles[idx].terrain = if rank < deep_count {
            Terrain::WaterDeep
        } else {
            Terrain::WaterShallow
        };
    }

    let land: Vec<usize> = by_elevation[water_count..].to_vec();
    if land.is_empty() {
        return;
    }
    let growth: Vec<f32> = land.iter().map(|&i| sample(&growth_noise, points[i], 0.12)).collect();
    let vegetated = (land.len() as f32 * vegetation_ratio).round() as usize;
    let trees = vegetated * 15 / 100;
    let brush = vegetated * 25 / 100;
    // Densest growth first.
    for (rank, &g) in ranked(&growth).iter().rev().take(vegetated).enumerate() {
        let idx = land[g];
        world.tiles[idx].terrain = if rank < trees {
            Terrain::Tree
        } else if rank < trees + brush {
            Terrain::Underbrush
        } else {
            Terrain::Grass
        };
    }
}

fn raise_buildings(world: &mut World, rng: &mut impl Rng, count: u32) {
    for _ in 0..count {
        let w = rng.gen_range(5..=10).min(world.width as i32 - 2);
        let h = rng.gen_range(4..=8).min(world.height as i32 - 2);
        if w < 3 || h < 3 {
            return;
        }
        let x0 = rng.gen_range(1..=world.width as i32 - w - 1);
        let y0 = rng.gen_range(1..=world.height as i32 - h - 1);
        let (wall, floor) = if rng.gen_bool(0.5) {
            (Terrain::WallWood, Terrain::FloorWood)
        } else {
            (Terrain::WallConcrete, Terrain::FloorConcrete)
        };

        for y in y0..y0 + h {
            for x in x0..x0 + w {
                let edge = x == x0 || y == y0 || x == x0 + w - 1 || y == y0 + h - 1;
                if let Some(tile) = world.tile_mut(Point::new(x, y)) {
                    tile.terrain = if edge { wall } else { floor };
                    tile.furniture = Furniture::None;
                    tile.outside = false;
                }
            }
        }

        // Door on the south wall, a window on the north wall.
        let door = Point::new(rng.gen_range(x0 + 1..x0 + w - 1), y0 + h - 1);
        let window = Point::new(rng.gen_range(x0 + 1..x0 + w - 1), y0);
        if let Some(tile) = world.tile_mut(door) {
            tile.terrain = if rng.gen_bool(0.5) {
                Terrain::DoorClosed
            } else {
                Terrain::DoorOpen
            };
        }
        if let Some(tile) = world.tile_mut(window) {
            tile.terrain = Terrain::Window;
        }

        let furnishings = [
            Furniture::Table,
            Furniture::Bookcase,
            Furniture::Bed,
            Furniture::Fireplace,
            Furniture::RangeHood,
        ];
        for _ in 0..rng.gen_range(1..=3) {
            let p = Point::new(rng.gen_range(x0 + 1..x0 + w - 1), y0 + 1 + rng.gen_range(0..h - 2));
            if let (Some(tile), Some(&piece)) = (world.tile_mut(p), furnishings.choose(rng)) {
                tile.furniture = piece;
            }
        }
    }
}

fn item_template(rng: &mut impl Rng) -> Item {
    match rng.gen_range(0..11) {
        0 => Item::new("newspaper", &[Material::Paper], 1),
        1 => Item::new("2x4", &[Material::Wood], 2),
        2 => Item::new("t-shirt", &[Material::Cotton], 2),
        3 => Item::liquid("gasoline", Material::Hydrocarbons, 20),
        4 => Item::liquid("vodka", Material::Alcohol, 7),
        5 => Item::new("rock", &[Material::Stone], 1),
        6 => Item::new("pipe", &[Material::Steel], 2),
        7 => Item::ammo("9mm", 18, &[], 20),
        8 => Item::ammo("incendiary shells", 30, &[AmmoEffect::Incendiary], 8),
        9 => Item {
            explode_in_fire: 20,
            ..Item::new("grenade", &[Material::Steel, Material::Powder], 1)
        },
        _ => Item::new("backpack", &[Material::Cotton], 4)
            .with_contents(vec![Item::new("paperback", &[Material::Paper], 1)]),
    }
}

fn scatter_items(world: &mut World, rng: &mut impl Rng, density: f32) {
    for i in 0..world.tile_count() {
        if !world.tiles[i].is_walkable() || rng.r#gen::<f32>() >= density {
            continue;
        }
        let item = item_template(rng);
        let p = world.point_of(i);
        world.spawn_item(p, item);
    }
}

/// A walkable square nobody is standing on.
fn free_square(world: &World, rng: &mut impl Rng) -> Option<Point> {
    (0..PLACEMENT_TRIES)
        .map(|_| {
            Point::new(
                rng.gen_range(0..world.width as i32),
                rng.gen_range(0..world.height as i32),
            )
        })
        .find(|&p| world.move_cost(p) > 0 && world.creature_at(p).is_none())
}

fn monster_template(rng: &mut impl Rng) -> (&'static str, Monster) {
    let (name, species, hp, materials, flags, armor_bash): (_, _, _, &[Material], &[MonsterFlag], _) =
        match rng.gen_range(0..7) {
            0 => ("zombie", "ZOMBIE", 40, &[Material::Flesh], &[MonsterFlag::Sees], 2),
            1 => ("giant spider", "SPIDER", 30, &[Material::Flesh], &[MonsterFlag::Sees, MonsterFlag::WebWalk], 4),
            2 => ("manhack", "MANHACK", 12, &[Material::Steel], &[MonsterFlag::Flies, MonsterFlag::NoBreathe, MonsterFlag::Sees], 6),
            3 => ("giant worm", "WORM", 50, &[Material::Flesh], &[MonsterFlag::Digs], 0),
            4 => ("triffid", "TRIFFID", 60, &[Material::Veggy], &[], 2),
            5 => ("blob", "BLOB", 35, &[Material::Water], &[MonsterFlag::NoBreathe, MonsterFlag::SludgeProof], 0),
            _ => ("fire elemental", "FIRE_ELEMENTAL", 40, &[Material::Powder], &[MonsterFlag::Firey, MonsterFlag::Flies], 0),
        };
    (
        name,
        Monster {
            species: species.to_string(),
            hp,
            flags: flags.to_vec(),
            materials: materials.to_vec(),
            armor_bash,
        },
    )
}

fn populate(world: &mut World, rng: &mut impl Rng, npc_count: u32, monster_count: u32) {
    if let Some(p) = free_square(world, rng) {
        world.add_creature(Creature::character(0, "you", p, Character::new(true)));
    }
    for n in 0..npc_count {
        let Some(p) = free_square(world, rng) else {
            break;
        };
        let name = format!("survivor {}", n + 1);
        world.add_creature(Creature::character(0, &name, p, Character::new(false)));
    }
    for _ in 0..monster_count {
        let Some(p) = free_square(world, rng) else {
            break;
        };
        let (name, monster) = monster_template(rng);
        world.add_creature(Creature::monster(0, name, p, monster));
    }
}

fn seed_hazards(world: &mut World, rng: &mut impl Rng, ignition_points: u32, density: f32) {
    for _ in 0..ignition_points {
        if let Some(p) = free_square(world, rng) {
            world.add_field(p, FieldKind::Fire, rng.gen_range(1..=3), 1);
        }
    }

    let scattered = (world.tile_count() as f32 * density * 0.02).round() as u32;
    let loose = [
        FieldKind::Web,
        FieldKind::Blood,
        FieldKind::Acid,
        FieldKind::Sludge,
        FieldKind::Smoke,
        FieldKind::ToxicGas,
        FieldKind::TearGas,
        FieldKind::Bees,
        FieldKind::Electricity,
        FieldKind::Slime,
    ];
    for _ in 0..scattered {
        if let (Some(p), Some(&kind)) = (free_square(world, rng), loose.choose(rng)) {
            world.add_field(p, kind, rng.gen_range(1..=3), 1);
        }
    }

    let vents = (density * 5.0).round() as u32;
    let vent_kinds = [
        FieldKind::GasVent,
        FieldKind::FireVent,
        FieldKind::ShockVent,
        FieldKind::AcidVent,
    ];
    for _ in 0..vents {
        if let (Some(p), Some(&kind)) = (free_square(world, rng), vent_kinds.choose(rng)) {
            world.add_field(p, kind, 3, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_params() -> GenerationParams {
        GenerationParams {
            seed: 42,
            width: 48,
            height: 32,
            ..GenerationParams::default()
        }
    }

    #[test]
    fn generate_default_map_dimensions() {
        let world = generate_world(&default_params());
        assert_eq!(world.tile_count(), 48 * 32);
        assert_eq!(world.width, 48);
        assert_eq!(world.height, 32);
        assert_eq!(world.tick_count, 0);
    }

    #[test]
    fn water_ratio_is_exact_without_buildings() {
        let params = GenerationParams {
            building_count: 0,
            water_ratio: 0.25,
            ..default_params()
        };
        let world = generate_world(&params);
        let water = world
            .tiles
            .iter()
            .filter(|t| matches!(t.terrain, Terrain::WaterShallow | Terrain::WaterDeep))
            .count();
        assert_eq!(water, (48.0 * 32.0 * 0.25_f32).round() as usize);
    }

    #[test]
    fn one_player_and_everyone_on_their_feet() {
        let world = generate_world(&default_params());
        let players = world.creatures.iter().filter(|c| c.is_player()).count();
        assert_eq!(players, 1);
        assert!(world.creatures.len() <= 1 + 2 + 6);
        for creature in &world.creatures {
            assert!(world.move_cost(creature.pos) > 0, "{} placed in a wall", creature.name);
        }
        let ids: std::collections::HashSet<u32> = world.creatures.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), world.creatures.len());
    }

    #[test]
    fn buildings_are_roofed() {
        let params = GenerationParams {
            building_count: 3,
            ..default_params()
        };
        let world = generate_world(&params);
        let indoors = world.tiles.iter().filter(|t| !t.outside).count();
        // Even fully overlapping, the smallest building roofs 5x4 squares.
        assert!(indoors >= 20, "only {} indoor tiles", indoors);
    }

    #[test]
    fn fires_are_lit() {
        let params = GenerationParams {
            ignition_points: 3,
            ..default_params()
        };
        let world = generate_world(&params);
        let fires = world.tiles.iter().filter(|t| t.fields.has_fire()).count();
        assert!(fires >= 1);
    }

    #[test]
    fn generation_is_deterministic() {
        let params = default_params();
        let world1 = generate_world(&params);
        let world2 = generate_world(&params);
        assert_eq!(world1.id, world2.id);
        assert_eq!(world1.tiles, world2.tiles);
        assert_eq!(world1.creatures, world2.creatures);
    }

    #[test]
    fn zero_seed_is_resolved() {
        let params = GenerationParams {
            seed: 0,
            ..default_params()
        };
        let world = generate_world(&params);
        assert_ne!(world.generation_params.seed, 0);
        assert_eq!(world.seed(), world.generation_params.seed);
    }

    #[test]
    fn print_summary_does_not_panic() {
        let world = generate_world(&default_params());
        print_world_summary(&world);
    }
}
