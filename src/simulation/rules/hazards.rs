//! Rules for the hazards that are neither gases, fire, vents nor charge.

use tracing::debug;

use crate::field::FieldKind;
use crate::simulation::constants::*;
use crate::simulation::effects::FieldEvent;
use crate::simulation::engine::TickContext;
use crate::simulation::rules::fire::create_hot_air;
use crate::simulation::rules::gas::spread_gas;
use crate::world::creature::{BodyPart, DamageKind, Monster};
use crate::world::grid::{rl_dist, squares_in_direction, OFFSETS_9};
use crate::world::item::Material;
use crate::world::{Creature, CreatureKind, Item, Point, TerrainFlag};

// === Acid ===

/// Corrodes items lying in the pool. Every dissolved item feeds the pool
/// with its volume and drops whatever it held.
pub fn acid(ctx: &mut TickContext) {
    let p = ctx.pos();
    if ctx.world.has_flag(p, TerrainFlag::Swimmable) {
        ctx.decay(ACID_WATER_DECAY);
    }
    let Some(tile) = ctx.world.tile_mut(p) else {
        return;
    };
    if tile.items.is_empty() {
        return;
    }

    let mut released: Vec<Item> = Vec::new();
    let mut dissolved_volume = 0;
    let mut kept = Vec::with_capacity(tile.items.len());
    for mut item in std::mem::take(&mut tile.items) {
        let resist = item.acid_resist();
        if resist == 0 || (resist < ACID_PROOF_RESIST && ctx.rng.one_in(resist)) {
            item.damage += 1;
        }
        if item.damage >= ACID_DESTROY_DAMAGE {
            dissolved_volume += item.volume;
            released.append(&mut item.contents);
        } else {
            kept.push(item);
        }
    }
    tile.items = kept;

    let tick = ctx.world.tick_count;
    for mut item in released {
        item.bday = tick;
        ctx.world.spawn_item(p, item);
    }
    ctx.decay(-dissolved_volume);
}

// === Fatigue ===

/// A rift in reality: slowly widens, and at full strength lets things
/// through.
pub fn fatigue(ctx: &mut TickContext) {
    let density = ctx.density();
    let tick = ctx.world.tick_count;
    if density < 3 && tick % FATIGUE_GROWTH_PERIOD == 0 && ctx.rng.one_in(FATIGUE_GROWTH_ONE_IN) {
        ctx.intensify(1);
    } else if density == 3 && ctx.rng.one_in(FATIGUE_SPAWN_ONE_IN) {
        spawn_nether_creature(ctx);
    }
}

fn spawn_nether_creature(ctx: &mut TickContext) {
    let Some(&species) = ctx.rng.pick(&NETHER_SPECIES) else {
        return;
    };
    let dx = ctx.rng.range(-FATIGUE_SPAWN_RADIUS, FATIGUE_SPAWN_RADIUS);
    let dy = ctx.rng.range(-FATIGUE_SPAWN_RADIUS, FATIGUE_SPAWN_RADIUS);
    let at = ctx.pos().offset(dx, dy);
    if ctx.world.move_cost(at) <= 0 || ctx.world.creature_at(at).is_some() {
        return;
    }
    let monster = Monster {
        species: species.to_uppercase().replace([' ', '-'], "_"),
        hp: 60,
        flags: Vec::new(),
        materials: vec![Material::Flesh],
        armor_bash: 2,
    };
    ctx.world.add_creature(Creature::monster(0, species, at, monster));
    debug!(species, x = at.x, y = at.y, "rift spawned a creature");
    ctx.emit(FieldEvent::MonsterSpawned {
        species: species.to_string(),
        at,
    });
}

// === Item pusher ===

/// Shoves rocks around between neighbouring pusher squares, hitting
/// whatever stands where they land.
pub fn push_items(ctx: &mut TickContext) {
    let p = ctx.pos();
    let tick = ctx.world.tick_count;
    let Some(tile) = ctx.world.tile_mut(p) else {
        return;
    };
    let (pushed, stay): (Vec<Item>, Vec<Item>) = std::mem::take(&mut tile.items)
        .into_iter()
        .partition(|item| item.type_id == PUSHED_ITEM_TYPE && item.bday + 1 < tick);
    tile.items = stay;
    if pushed.is_empty() {
        return;
    }

    let targets: Vec<Point> = OFFSETS_9
        .iter()
        .map(|&(dx, dy)| p.offset(dx, dy))
        .filter(|&q| ctx.world.has_field(q, FieldKind::PushItems))
        .collect();
    for item in pushed {
        let Some(&dest) = ctx.rng.pick(&targets) else {
            continue;
        };
        let name = item.type_id.clone();
        ctx.world.spawn_item(dest, item);
        hit_occupant(ctx, dest, &name);
    }
}

fn hit_occupant(ctx: &mut TickContext, at: Point, item: &str) {
    let Some(index) = ctx.world.creature_at(at) else {
        return;
    };
    let part = ctx.rng.pick(&BodyPart::ALL).copied().unwrap_or(BodyPart::Torso);
    let victim = &mut ctx.world.creatures[index];
    let (part, damage) = match &victim.kind {
        CreatureKind::Character(_) => (part, PUSH_HIT_DAMAGE),
        CreatureKind::Monster(m) => (BodyPart::Torso, PUSH_HIT_DAMAGE - m.armor_bash),
    };
    victim.deal_damage(part, DamageKind::Bash, damage);
    victim.check_dead_state();
    let victim = victim.name.clone();
    ctx.emit(FieldEvent::ItemHit {
        item: item.to_string(),
        at,
        victim,
    });
}

// === Bees ===

/// Kinds that wipe out a swarm sharing their tile.
const BEE_KILLERS: [FieldKind; 17] = [
    FieldKind::Web,
    FieldKind::Fire,
    FieldKind::Smoke,
    FieldKind::ToxicGas,
    FieldKind::TearGas,
    FieldKind::RelaxGas,
    FieldKind::NukeGas,
    FieldKind::GasVent,
    FieldKind::FireVent,
    FieldKind::FlameBurst,
    FieldKind::Electricity,
    FieldKind::Fatigue,
    FieldKind::ShockVent,
    FieldKind::Plasma,
    FieldKind::Laser,
    FieldKind::Dazzling,
    FieldKind::Incendiary,
];

pub fn bees(ctx: &mut TickContext) {
    let p = ctx.pos();
    let doomed = ctx
        .world
        .field_at(p)
        .is_some_and(|fields| BEE_KILLERS.iter().any(|&k| fields.contains(k)));
    if doomed {
        ctx.nullify();
        return;
    }

    if let Some(target) = visible_target(ctx, p) {
        for q in squares_in_direction(p, target) {
            if !ctx.world.in_bounds(q) || ctx.world.has_field(q, FieldKind::Bees) {
                continue;
            }
            let (density, age) = (ctx.density(), ctx.age());
            ctx.add_field(q, FieldKind::Bees, density, age);
            ctx.nullify();
            break;
        }
    } else {
        spread_gas(ctx, FieldKind::Bees, BEES_SPREAD);
    }
}

/// The player's position, when the swarm can see and reach them.
fn visible_target(ctx: &TickContext, p: Point) -> Option<Point> {
    let player = &ctx.world.creatures[ctx.world.player_index()?];
    if player.dead || player.as_character().is_some_and(|c| c.underwater) {
        return None;
    }
    let target = player.pos;
    (rl_dist(p, target) < BEES_SIGHT_RANGE && ctx.world.clear_path(p, target, BEES_SIGHT_RANGE)).then_some(target)
}

// === Incendiary ===

/// Burning vapour: lights flammable ground nearby and fuel underfoot, then
/// drifts.
pub fn incendiary(ctx: &mut TickContext) {
    let p = ctx.pos();
    let dx = ctx.rng.range(-1, 1);
    let dy = ctx.rng.range(-1, 1);
    let q = p.offset(dx, dy);
    if ctx.world.tile(q).is_some_and(|t| t.is_flammable()) {
        ctx.add_field(q, FieldKind::Fire, 1, 0);
    }

    let fuel = ctx
        .world
        .tile(p)
        .map_or(0, |t| t.items.iter().filter(|item| item.is_flammable()).count());
    for _ in 0..fuel {
        ctx.add_field(p, FieldKind::Fire, 1, 0);
    }

    spread_gas(ctx, FieldKind::Incendiary, INCENDIARY_SPREAD);
    let density = ctx.density();
    create_hot_air(ctx, p, density);
}

// === Rubble ===

/// Collapses the tile into rubble; the entry itself fades the next tick.
pub fn rubble(ctx: &mut TickContext) {
    let p = ctx.pos();
    if let Some(tile) = ctx.world.tile_mut(p) {
        tile.make_rubble();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::rules::testing::run_rule;
    use crate::world::creature::Character;
    use crate::world::{Terrain, World};

    #[test]
    fn acid_dissolves_soft_items_and_drops_contents() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        let ring = Item::new("ring", &[Material::Glass], 0);
        world.spawn_item(p, Item::new("pouch", &[Material::Cotton], 2).with_contents(vec![ring]));
        world.add_field(p, FieldKind::Acid, 3, 1);
        for tick in 0..4 {
            world.tick_count = tick;
            run_rule(&mut world, tick, p, FieldKind::Acid, acid);
            assert_eq!(world.tile(p).unwrap().items[0].type_id, "pouch");
        }
        world.tick_count = 4;
        run_rule(&mut world, 4, p, FieldKind::Acid, acid);
        let items = &world.tile(p).unwrap().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].type_id, "ring");
        assert_eq!(items[0].bday, 4);
        assert_eq!(world.get_field(p, FieldKind::Acid).unwrap().age(), -1);
    }

    #[test]
    fn acid_proof_items_survive() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        world.spawn_item(p, Item::new("bottle", &[Material::Glass], 1));
        world.add_field(p, FieldKind::Acid, 3, 1);
        for seed in 0..50 {
            run_rule(&mut world, seed, p, FieldKind::Acid, acid);
        }
        assert_eq!(world.tile(p).unwrap().items[0].damage, 0);
    }

    #[test]
    fn acid_dilutes_in_water() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        world.tile_mut(p).unwrap().terrain = Terrain::WaterDeep;
        world.add_field(p, FieldKind::Acid, 2, 1);
        run_rule(&mut world, 1, p, FieldKind::Acid, acid);
        assert_eq!(world.get_field(p, FieldKind::Acid).unwrap().age(), 21);
    }

    #[test]
    fn rift_grows_only_on_cadence() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        world.add_field(p, FieldKind::Fatigue, 1, 1);
        world.tick_count = FATIGUE_GROWTH_PERIOD + 1;
        for seed in 0..100 {
            run_rule(&mut world, seed, p, FieldKind::Fatigue, fatigue);
        }
        assert_eq!(world.field_density(p, FieldKind::Fatigue), 1);

        world.tick_count = FATIGUE_GROWTH_PERIOD * 2;
        for seed in 0..100 {
            run_rule(&mut world, seed, p, FieldKind::Fatigue, fatigue);
        }
        assert!(world.field_density(p, FieldKind::Fatigue) > 1);
    }

    #[test]
    fn open_rift_eventually_spawns() {
        let mut world = World::blank(9, 9);
        let p = Point::new(4, 4);
        world.add_field(p, FieldKind::Fatigue, 3, 1);
        let mut spawned = false;
        for seed in 0..20000 {
            let events = run_rule(&mut world, seed, p, FieldKind::Fatigue, fatigue);
            if let Some(FieldEvent::MonsterSpawned { species, at }) = events.first() {
                assert!(NETHER_SPECIES.contains(&species.as_str()));
                assert!(rl_dist(*at, p) <= FATIGUE_SPAWN_RADIUS);
                spawned = true;
                break;
            }
        }
        assert!(spawned);
        assert_eq!(world.creatures.len(), 1);
    }

    #[test]
    fn pusher_moves_old_rocks_and_hits_occupant() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        let dest = Point::new(3, 2);
        world.add_field(p, FieldKind::PushItems, 1, 1);
        world.add_field(dest, FieldKind::PushItems, 1, 1);
        world.spawn_item(p, Item::new("rock", &[Material::Stone], 1));
        world.spawn_item(p, Item::new("stick", &[Material::Wood], 1));
        world.add_creature(Creature::character(0, "Bob", dest, Character::new(false)));
        world.tick_count = 10;

        let mut moved = false;
        for seed in 0..30 {
            let events = run_rule(&mut world, seed, p, FieldKind::PushItems, push_items);
            let rock_here = world.tile(p).unwrap().items.iter().any(|i| i.type_id == "rock");
            if !rock_here {
                assert!(matches!(&events[0], FieldEvent::ItemHit { victim, .. } if victim == "Bob"));
                let hp: i32 = world.creatures[0].as_character().unwrap().hp.iter().sum();
                assert_eq!(hp, 60 * 6 - PUSH_HIT_DAMAGE);
                moved = true;
                break;
            }
            assert_eq!(world.tile(p).unwrap().items.last().unwrap().bday, 10);
            world.tile_mut(p).unwrap().items.iter_mut().for_each(|i| i.bday = 0);
        }
        assert!(moved);
        assert_eq!(world.tile(p).unwrap().items[0].type_id, "stick");
    }

    #[test]
    fn fresh_rocks_stay_put() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        world.add_field(p, FieldKind::PushItems, 1, 1);
        world.add_field(Point::new(1, 2), FieldKind::PushItems, 1, 1);
        world.tick_count = 10;
        world.spawn_item(p, Item::new("rock", &[Material::Stone], 1));
        world.tile_mut(p).unwrap().items[0].bday = 9;
        run_rule(&mut world, 1, p, FieldKind::PushItems, push_items);
        assert_eq!(world.tile(p).unwrap().items.len(), 1);
    }

    #[test]
    fn bees_die_in_smoke() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        world.add_field(p, FieldKind::Bees, 2, 5);
        world.add_field(p, FieldKind::Smoke, 1, 5);
        run_rule(&mut world, 1, p, FieldKind::Bees, bees);
        assert!(!world.get_field(p, FieldKind::Bees).unwrap().is_alive());
    }

    #[test]
    fn bees_chase_the_player() {
        let mut world = World::blank(12, 5);
        let p = Point::new(2, 2);
        world.add_field(p, FieldKind::Bees, 2, 5);
        world.add_creature(Creature::character(0, "you", Point::new(8, 2), Character::new(true)));
        run_rule(&mut world, 1, p, FieldKind::Bees, bees);
        assert!(!world.get_field(p, FieldKind::Bees).unwrap().is_alive());
        let moved = world.get_field(Point::new(3, 2), FieldKind::Bees).unwrap();
        assert_eq!((moved.density(), moved.age()), (2, 5));
    }

    #[test]
    fn bees_ignore_a_submerged_player() {
        let mut world = World::blank(12, 5);
        let p = Point::new(2, 2);
        world.add_field(p, FieldKind::Bees, 2, 5);
        let mut diver = Character::new(true);
        diver.underwater = true;
        world.add_creature(Creature::character(0, "you", Point::new(4, 2), diver));
        run_rule(&mut world, 1, p, FieldKind::Bees, bees);
        assert!(world.get_field(p, FieldKind::Bees).unwrap().is_alive());
    }

    #[test]
    fn incendiary_lights_fuel_underfoot() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        world.spawn_item(p, Item::new("rag", &[Material::Cotton], 1));
        world.add_field(p, FieldKind::Incendiary, 1, 5);
        run_rule(&mut world, 1, p, FieldKind::Incendiary, incendiary);
        assert!(world.has_field(p, FieldKind::Fire));
        let puffs = OFFSETS_9
            .iter()
            .any(|&(dx, dy)| world.has_field(p.offset(dx, dy), FieldKind::HotAir1));
        assert!(puffs);
    }

    #[test]
    fn rubble_collapses_terrain() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        world.tile_mut(p).unwrap().terrain = Terrain::WallWood;
        world.add_field(p, FieldKind::Rubble, 1, 1);
        run_rule(&mut world, 1, p, FieldKind::Rubble, rubble);
        assert_eq!(world.tile(p).unwrap().terrain, Terrain::Rubble);
    }
}
