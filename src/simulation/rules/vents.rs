//! Vents: permanent emitters that pulse between a charging and a discharge
//! state.

use crate::field::FieldKind;
use crate::simulation::constants::*;
use crate::simulation::engine::TickContext;
use crate::simulation::rules::fire::create_hot_air;
use crate::world::grid::{rl_dist, OFFSETS_9};

/// Keeps the 3x3 around it saturated with toxic gas.
pub fn gas_vent(ctx: &mut TickContext) {
    let p = ctx.pos();
    for (dx, dy) in OFFSETS_9 {
        let q = p.offset(dx, dy);
        let topped_up = ctx
            .world
            .get_field_mut(q, FieldKind::ToxicGas)
            .filter(|gas| gas.density() < 3)
            .map(|gas| gas.intensify(1))
            .is_some();
        if !topped_up {
            ctx.add_field(q, FieldKind::ToxicGas, 3, 0);
        }
    }
}

/// Cools down while dense; once spent, turns into a flame burst.
pub fn fire_vent(ctx: &mut TickContext) {
    if ctx.density() > 1 {
        if ctx.rng.one_in(FIRE_VENT_COOLDOWN_ONE_IN) {
            ctx.intensify(-1);
        }
    } else {
        let p = ctx.pos();
        ctx.remove_self();
        ctx.add_field(p, FieldKind::FlameBurst, 3, 0);
        return;
    }
    let (p, density) = (ctx.pos(), ctx.density());
    create_hot_air(ctx, p, density);
}

/// Burns down one step per tick, then goes back to being a fire vent.
pub fn flame_burst(ctx: &mut TickContext) {
    if ctx.density() > 1 {
        ctx.intensify(-1);
    } else {
        let p = ctx.pos();
        ctx.remove_self();
        ctx.add_field(p, FieldKind::FireVent, 3, 0);
        return;
    }
    let (p, density) = (ctx.pos(), ctx.density());
    create_hot_air(ctx, p, density);
}

/// Charges up, then discharges a handful of wandering lightning bolts.
pub fn shock_vent(ctx: &mut TickContext) {
    if ctx.density() > 1 {
        if ctx.rng.one_in(SHOCK_VENT_COOLDOWN_ONE_IN) {
            ctx.intensify(-1);
        }
        return;
    }
    ctx.maximize();
    let p = ctx.pos();
    let bolts = ctx.rng.range(SHOCK_VENT_BOLTS.0, SHOCK_VENT_BOLTS.1);
    for _ in 0..bolts {
        let (mut xdir, mut ydir) = (0, 0);
        while xdir == 0 && ydir == 0 {
            xdir = ctx.rng.range(-1, 1);
            ydir = ctx.rng.range(-1, 1);
        }
        let length = ctx.rng.range(SHOCK_VENT_BOLT_LENGTH.0, SHOCK_VENT_BOLT_LENGTH.1);
        let mut bolt = p;
        for _ in 0..length {
            bolt = bolt.offset(xdir, ydir);
            let charge = ctx.rng.range(2, 3);
            ctx.add_field(bolt, FieldKind::Electricity, charge, 0);
            if ctx.rng.one_in(SHOCK_VENT_TURN_ONE_IN) {
                xdir = if xdir == 0 { ctx.rng.range(0, 1) * 2 - 1 } else { 0 };
            }
            if ctx.rng.one_in(SHOCK_VENT_TURN_ONE_IN) {
                ydir = if ydir == 0 { ctx.rng.range(0, 1) * 2 - 1 } else { 0 };
            }
        }
    }
}

/// Recharges while dense; once spent, floods the surrounding area with acid.
pub fn acid_vent(ctx: &mut TickContext) {
    if ctx.density() > 1 {
        let age = ctx.age();
        if age >= ACID_VENT_RECHARGE_AGE {
            ctx.intensify(-1);
            ctx.decay(-age);
        }
        return;
    }
    ctx.maximize();
    let p = ctx.pos();
    for dy in -ACID_VENT_RADIUS..=ACID_VENT_RADIUS {
        for dx in -ACID_VENT_RADIUS..=ACID_VENT_RADIUS {
            let q = p.offset(dx, dy);
            if !ctx.world.in_bounds(q) || ctx.world.has_field(q, FieldKind::Acid) {
                continue;
            }
            let bonus = i32::from(ctx.rng.one_in(3));
            let density = (3 - rl_dist(p, q) / 2 + bonus).min(3);
            if density > 0 {
                ctx.add_field(q, FieldKind::Acid, density, 0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::rules::testing::run_rule;
    use crate::world::{Point, World};

    #[test]
    fn gas_vent_fills_surroundings() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        world.add_field(p, FieldKind::GasVent, 3, 5);
        world.add_field(Point::new(1, 1), FieldKind::ToxicGas, 1, 5);
        run_rule(&mut world, 1, p, FieldKind::GasVent, gas_vent);
        assert_eq!(world.field_density(Point::new(1, 1), FieldKind::ToxicGas), 2);
        assert_eq!(world.field_density(Point::new(3, 3), FieldKind::ToxicGas), 3);
        assert_eq!(world.field_density(p, FieldKind::ToxicGas), 3);
    }

    #[test]
    fn spent_fire_vent_becomes_flame_burst() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        world.add_field(p, FieldKind::FireVent, 1, 5);
        run_rule(&mut world, 1, p, FieldKind::FireVent, fire_vent);
        assert!(!world.has_field(p, FieldKind::FireVent));
        let burst = world.get_field(p, FieldKind::FlameBurst).unwrap();
        assert_eq!((burst.density(), burst.age()), (3, 0));
    }

    #[test]
    fn flame_burst_cycles_back() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        world.add_field(p, FieldKind::FlameBurst, 2, 5);
        run_rule(&mut world, 1, p, FieldKind::FlameBurst, flame_burst);
        assert_eq!(world.field_density(p, FieldKind::FlameBurst), 1);
        run_rule(&mut world, 1, p, FieldKind::FlameBurst, flame_burst);
        assert!(!world.has_field(p, FieldKind::FlameBurst));
        assert_eq!(world.field_density(p, FieldKind::FireVent), 3);
    }

    #[test]
    fn shock_vent_discharges_bolts() {
        let mut world = World::blank(31, 31);
        let p = Point::new(15, 15);
        world.add_field(p, FieldKind::ShockVent, 1, 5);
        run_rule(&mut world, 4, p, FieldKind::ShockVent, shock_vent);
        assert_eq!(world.field_density(p, FieldKind::ShockVent), 3);
        let charged = world
            .tiles
            .iter()
            .filter(|t| t.fields.contains(FieldKind::Electricity))
            .count();
        assert!(charged >= 1);
    }

    #[test]
    fn acid_vent_recharges_then_floods() {
        let mut world = World::blank(15, 15);
        let p = Point::new(7, 7);
        world.add_field(p, FieldKind::AcidVent, 2, 12);
        run_rule(&mut world, 1, p, FieldKind::AcidVent, acid_vent);
        let vent = world.get_field(p, FieldKind::AcidVent).unwrap();
        assert_eq!((vent.density(), vent.age()), (1, 0));

        run_rule(&mut world, 1, p, FieldKind::AcidVent, acid_vent);
        assert_eq!(world.field_density(p, FieldKind::AcidVent), 3);
        assert_eq!(world.field_density(p, FieldKind::Acid), 3);
        assert!(world.has_field(Point::new(9, 7), FieldKind::Acid));
        assert!(!world.has_field(Point::new(0, 0), FieldKind::Acid));
    }
}
