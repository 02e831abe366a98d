use serde::Serialize;

use crate::field::FieldKind;
use crate::simulation::engine::TickContext;
use crate::world::creature::{BodyPart, DamageKind, EffectKind};
use crate::world::grid::rl_dist;
use crate::world::item::AmmoEffect;
use crate::world::Point;

/// Something a field rule did that the outside world may want to hear about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldEvent {
    Explosion { at: Point, power: i32 },
    Message(String),
    Speech { speaker: String, line: String },
    MonsterSpawned { species: String, at: Point },
    ItemHit { item: String, at: Point, victim: String },
    CreatureDied { name: String, at: Point },
}

/// Blast radius for an explosion of the given power.
pub fn blast_radius(power: i32) -> i32 {
    (power / 10).clamp(1, 5)
}

/// Damage creatures around `at`, falling off linearly with distance.
/// Fiery blasts also scatter small fires over walkable ground.
pub fn explosion(ctx: &mut TickContext, at: Point, power: i32, fiery: bool) {
    if power <= 0 {
        return;
    }
    let radius = blast_radius(power);
    ctx.emit(FieldEvent::Explosion { at, power });
    for creature in ctx.world.creatures.iter_mut().filter(|c| !c.dead) {
        let dist = rl_dist(creature.pos, at);
        if dist > radius {
            continue;
        }
        let damage = power * (radius + 1 - dist) / (radius + 1);
        creature.deal_damage(BodyPart::Torso, DamageKind::Bash, damage);
        creature.check_dead_state();
    }
    if fiery {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let p = at.offset(dx, dy);
                if ctx.world.move_cost(p) > 0 && ctx.rng.one_in(2) {
                    ctx.add_field(p, FieldKind::Fire, 1, 0);
                }
            }
        }
    }
}

/// Fill walkable squares within `radius` of `at` with a field.
fn cloud(ctx: &mut TickContext, at: Point, kind: FieldKind, density: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let p = at.offset(dx, dy);
            if ctx.world.move_cost(p) > 0 {
                ctx.add_field(p, kind, density, 0);
            }
        }
    }
}

/// Trigger the special payload of a cooked-off round.
pub fn ammo_effects(ctx: &mut TickContext, at: Point, effects: &[AmmoEffect]) {
    for effect in effects {
        match effect {
            AmmoEffect::Frag => explosion(ctx, at, 12, false),
            AmmoEffect::Napalm => explosion(ctx, at, 4, true),
            AmmoEffect::NapalmBig => explosion(ctx, at, 18, true),
            AmmoEffect::Explosive => explosion(ctx, at, 24, false),
            AmmoEffect::ExplosiveBig => explosion(ctx, at, 40, false),
            AmmoEffect::ExplosiveHuge => explosion(ctx, at, 80, false),
            AmmoEffect::Teargas => cloud(ctx, at, FieldKind::TearGas, 3, 2),
            AmmoEffect::Smoke => cloud(ctx, at, FieldKind::Smoke, 3, 2),
            AmmoEffect::SmokeBig => cloud(ctx, at, FieldKind::Smoke, 3, 4),
            AmmoEffect::Flashbang => {
                ctx.message("A flashbang goes off!");
                for creature in ctx.world.creatures.iter_mut().filter(|c| !c.dead) {
                    if rl_dist(creature.pos, at) <= 8 {
                        creature.add_effect(EffectKind::Stunned, 10);
                    }
                }
            }
            AmmoEffect::Incendiary | AmmoEffect::Cookoff => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimRng;
    use crate::world::creature::{Character, Creature};
    use crate::world::World;

    #[test]
    fn blast_damage_falls_off() {
        let mut world = World::blank(16, 16);
        world.add_creature(Creature::character(0, "near", Point::new(5, 5), Character::new(false)));
        world.add_creature(Creature::character(0, "far", Point::new(12, 12), Character::new(false)));
        let mut rng = SimRng::seed_from_u64(9);
        let mut ctx = TickContext::new(&mut world, &mut rng);
        explosion(&mut ctx, Point::new(5, 6), 20, false);
        assert_eq!(ctx.events.len(), 1);

        let near = world.creatures[0].as_character().unwrap();
        assert!(near.hp[0] < 60);
        let far = world.creatures[1].as_character().unwrap();
        assert_eq!(far.hp[0], 60);
    }

    #[test]
    fn smoke_round_fills_area() {
        let mut world = World::blank(16, 16);
        let mut rng = SimRng::seed_from_u64(9);
        let mut ctx = TickContext::new(&mut world, &mut rng);
        ammo_effects(&mut ctx, Point::new(8, 8), &[AmmoEffect::Smoke]);
        assert_eq!(world.field_density(Point::new(10, 6), FieldKind::Smoke), 3);
        assert!(!world.has_field(Point::new(11, 8), FieldKind::Smoke));
    }

    #[test]
    fn radius_is_bounded() {
        assert_eq!(blast_radius(3), 1);
        assert_eq!(blast_radius(24), 2);
        assert_eq!(blast_radius(500), 5);
    }
}
