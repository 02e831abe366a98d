use smallvec::SmallVec;

use crate::field::FieldKind;
use crate::simulation::constants::*;
use crate::simulation::engine::TickContext;
use crate::world::grid::OFFSETS_9;
use crate::world::Point;

/// Loose charge: arcs off grounded squares onto open ground, and seeks
/// ground when it is standing in the open.
pub fn electricity(ctx: &mut TickContext) {
    if ctx.rng.one_in(ELECTRICITY_IDLE_ONE_IN) {
        return;
    }
    let p = ctx.pos();
    if ctx.world.move_cost(p) == 0 && ctx.density() > 1 {
        arc_from_ground(ctx, p);
    } else {
        seek_ground(ctx, p);
    }
}

fn random_adjacent(ctx: &mut TickContext, p: Point) -> Point {
    let dx = ctx.rng.range(-1, 1);
    let dy = ctx.rng.range(-1, 1);
    p.offset(dx, dy)
}

fn arc_from_ground(ctx: &mut TickContext, p: Point) {
    let mut tries = 0;
    while tries < ELECTRICITY_ARC_RETRIES && ctx.age() < ELECTRICITY_ARC_MAX_AGE && ctx.density() > 1 {
        let q = random_adjacent(ctx, p);
        if ctx.world.move_cost(q) != 0 {
            let age = ctx.age() + 1;
            ctx.add_field(q, FieldKind::Electricity, 1, age);
            ctx.intensify(-1);
            tries = 0;
        } else {
            tries += 1;
        }
    }
}

fn seek_ground(ctx: &mut TickContext, p: Point) {
    let mut grounded: SmallVec<[Point; 9]> = OFFSETS_9
        .iter()
        .map(|&(dx, dy)| p.offset(dx, dy))
        .filter(|&q| ctx.world.in_bounds(q) && ctx.world.move_cost(q) == 0)
        .collect();

    if grounded.is_empty() {
        let q = random_adjacent(ctx, p);
        if ctx.world.move_cost(q) > 0 {
            let age = ctx.age() + 1;
            let boosted = ctx
                .world
                .get_field_mut(q, FieldKind::Electricity)
                .filter(|e| e.density() < 3)
                .map(|e| e.intensify(1))
                .is_some();
            if boosted {
                ctx.intensify(-1);
            } else {
                ctx.add_field(q, FieldKind::Electricity, 1, age);
            }
        }
        ctx.intensify(-1);
    }

    while !grounded.is_empty() && ctx.density() > 1 {
        let Some(index) = ctx.rng.pick_index(grounded.len()) else {
            break;
        };
        let q = grounded.remove(index);
        let age = ctx.age() + 1;
        ctx.add_field(q, FieldKind::Electricity, 1, age);
        ctx.intensify(-1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::rules::testing::run_rule;
    use crate::world::{Terrain, World};

    fn total_charge(world: &World) -> i32 {
        world
            .tiles
            .iter()
            .filter_map(|t| t.fields.find(FieldKind::Electricity))
            .map(|e| e.density())
            .sum()
    }

    #[test]
    fn open_ground_charge_never_grows() {
        for seed in 0..40 {
            let mut world = World::blank(7, 7);
            let p = Point::new(3, 3);
            world.add_field(p, FieldKind::Electricity, 3, 5);
            run_rule(&mut world, seed, p, FieldKind::Electricity, electricity);
            assert!(total_charge(&world) <= 3);
        }
    }

    #[test]
    fn charge_flows_into_nearby_walls() {
        let mut world = World::blank(7, 7);
        let p = Point::new(3, 3);
        world.tile_mut(Point::new(4, 3)).unwrap().terrain = Terrain::WallConcrete;
        world.add_field(p, FieldKind::Electricity, 3, 5);
        let mut grounded = false;
        for seed in 0..10 {
            run_rule(&mut world, seed, p, FieldKind::Electricity, electricity);
            if world.has_field(Point::new(4, 3), FieldKind::Electricity) {
                grounded = true;
                break;
            }
        }
        assert!(grounded);
        assert_eq!(world.field_density(p, FieldKind::Electricity), 2);
        assert_eq!(world.get_field(Point::new(4, 3), FieldKind::Electricity).unwrap().age(), 6);
    }

    #[test]
    fn grounded_charge_arcs_outward() {
        let mut world = World::blank(7, 7);
        let p = Point::new(3, 3);
        world.tile_mut(p).unwrap().terrain = Terrain::WallConcrete;
        world.add_field(p, FieldKind::Electricity, 3, 5);
        for seed in 0..10 {
            run_rule(&mut world, seed, p, FieldKind::Electricity, electricity);
            if world.field_density(p, FieldKind::Electricity) == 1 {
                break;
            }
        }
        assert_eq!(world.field_density(p, FieldKind::Electricity), 1);
        let arcs = world
            .tiles
            .iter()
            .filter(|t| t.fields.contains(FieldKind::Electricity))
            .count();
        assert!(arcs >= 2);
    }
}
