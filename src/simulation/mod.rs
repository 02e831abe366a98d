pub mod constants;
pub mod effects;
pub mod engine;
pub mod exposure;
pub mod rules;
pub mod statistics;

use std::time::Instant;

use tracing::{debug, warn};

use crate::rng::SimRng;
use crate::simulation::effects::FieldEvent;
use crate::simulation::engine::{process_fields, FieldPassSummary, TickContext};
use crate::simulation::statistics::TickStatistics;
use crate::world::World;

/// Result of executing a single tick.
#[derive(Debug)]
pub struct TickResult {
    pub statistics: TickStatistics,
    pub fields: FieldPassSummary,
    /// Everything observable that happened this tick, in order.
    pub events: Vec<FieldEvent>,
}

/// Execute a single simulation tick on the world.
///
/// Runs every field transition rule once, then lets each living creature
/// react to the fields on its tile. Creatures that died are reported and
/// dropped before the tick count advances. The random stream is derived from `seed` and the tick
/// number, so replaying a saved world with the same seed is deterministic.
pub fn execute_tick(world: &mut World, seed: u64) -> TickResult {
    let tick_start = Instant::now();
    let mut rng = SimRng::for_tick(seed, world.tick_count);
    let alive_before: Vec<bool> = world.creatures.iter().map(|c| !c.dead).collect();

    let (fields, mut events) = {
        let mut ctx = TickContext::new(world, &mut rng);
        let summary = process_fields(&mut ctx);
        (summary, ctx.events)
    };

    for index in 0..world.creatures.len() {
        if !world.creatures[index].dead {
            exposure::creature_in_field(world, &mut rng, index, &mut events);
        }
    }

    for (creature, was_alive) in world.creatures.iter().zip(alive_before) {
        if was_alive && creature.dead {
            debug!(name = %creature.name, x = creature.pos.x, y = creature.pos.y, "creature died");
            events.push(FieldEvent::CreatureDied {
                name: creature.name.clone(),
                at: creature.pos,
            });
        }
    }
    world.creatures.retain(|c| !c.dead);

    world.tick_count += 1;

    let tick_duration = tick_start.elapsed().as_secs_f32() * 1000.0;
    let statistics = statistics::compute_statistics(world, events.len() as u32, tick_duration);

    // Runaway detection: more than half the map burning.
    let total_tiles = world.tile_count();
    if total_tiles > 0 && statistics.fire_tiles as usize > total_tiles / 2 {
        warn!(
            fire_tiles = statistics.fire_tiles,
            total_tiles,
            tick = world.tick_count,
            "Runaway fire detected"
        );
    }

    TickResult {
        statistics,
        fields,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;
    use crate::world::creature::{Character, Creature};
    use crate::world::{Item, Point};
    use crate::world::item::Material;

    fn total_density(world: &World, kind: FieldKind) -> i32 {
        world
            .tiles
            .iter()
            .filter_map(|t| t.fields.find(kind))
            .map(|e| e.density())
            .sum()
    }

    #[test]
    fn tick_advances_and_reports() {
        let mut world = World::blank(10, 10);
        world.add_field(Point::new(5, 5), FieldKind::Smoke, 2, 1);
        let result = execute_tick(&mut world, 9);
        assert_eq!(world.tick_count, 1);
        assert_eq!(result.statistics.tick, 1);
        assert_eq!(result.fields.tiles_visited, 1);
    }

    #[test]
    fn acid_dissolves_a_paper_bag_within_five_ticks() {
        let mut world = World::blank(6, 6);
        let p = Point::new(2, 2);
        world.add_field(p, FieldKind::Acid, 3, 1);
        world.spawn_item(p, Item::new("paper bag", &[Material::Paper], 1));
        for _ in 0..5 {
            execute_tick(&mut world, 4);
        }
        assert!(world.tile(p).unwrap().items.is_empty());
    }

    #[test]
    fn gas_is_never_created_by_spreading() {
        let mut world = World::blank(12, 12);
        world.add_field(Point::new(6, 6), FieldKind::ToxicGas, 3, 50);
        world.add_field(Point::new(3, 3), FieldKind::ToxicGas, 2, 50);
        for tick in 0..5 {
            let before = total_density(&world, FieldKind::ToxicGas);
            execute_tick(&mut world, 11);
            let after = total_density(&world, FieldKind::ToxicGas);
            assert!(after <= before, "tick {}: {} -> {}", tick, before, after);
        }
    }

    #[test]
    fn lone_fire_on_dirt_never_grows() {
        let mut world = World::blank(9, 9);
        let p = Point::new(4, 4);
        world.add_field(p, FieldKind::Fire, 1, 1);
        for _ in 0..10 {
            execute_tick(&mut world, 3);
            assert!(world.field_density(p, FieldKind::Fire) <= 1);
            assert!(!world.has_field(Point::new(3, 4), FieldKind::Fire));
        }
    }

    #[test]
    fn lone_fire_without_fuel_burns_out() {
        let half_life = crate::field::lookup(FieldKind::Fire).half_life;
        for seed in 0..5 {
            let mut world = World::blank(9, 9);
            let p = Point::new(4, 4);
            world.add_field(p, FieldKind::Fire, 1, 1);
            let mut ticks = 0;
            while world.has_field(p, FieldKind::Fire) {
                assert!(ticks < 4 * half_life, "seed {}: still burning after {} ticks", seed, ticks);
                execute_tick(&mut world, seed);
                assert!(world.field_density(p, FieldKind::Fire) <= 1);
                ticks += 1;
            }
            assert!(world.active_points().iter().all(|&q| !world.has_field(q, FieldKind::Fire)));
        }
    }

    #[test]
    fn deaths_are_reported_once() {
        let mut world = World::blank(6, 6);
        let p = Point::new(2, 2);
        let mut ch = Character::new(false);
        ch.hp = [1; 6];
        world.add_creature(Creature::character(0, "Sam", p, ch));
        world.add_field(p, FieldKind::Fire, 3, 1);
        let result = execute_tick(&mut world, 1);
        let deaths = |events: &[FieldEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, FieldEvent::CreatureDied { .. }))
                .count()
        };
        assert_eq!(deaths(&result.events), 1);
        assert_eq!(result.statistics.creatures_alive, 0);
        assert!(world.creatures.is_empty());
        let again = execute_tick(&mut world, 1);
        assert_eq!(deaths(&again.events), 0);
    }
}
