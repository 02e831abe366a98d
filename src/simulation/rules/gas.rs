use smallvec::SmallVec;

use crate::field::FieldKind;
use crate::simulation::constants::*;
use crate::simulation::effects::FieldEvent;
use crate::simulation::engine::TickContext;
use crate::world::creature::MonsterFlag;
use crate::world::grid::{neighbours, OFFSETS_9};
use crate::world::{Point, TerrainFlag};

/// Shared diffusion step for every gas-like kind.
///
/// Clears scent around the tile, ages faster outdoors, then with the kind's
/// spread chance moves one density unit to a random eligible neighbour: one
/// that is walkable or gas-permeable and holds no stronger gas of the same
/// kind. The moved density takes a proportional share of the age with it.
pub fn spread_gas(ctx: &mut TickContext, kind: FieldKind, spread: GasSpread) {
    let p = ctx.pos();
    for (dx, dy) in OFFSETS_9 {
        if let Some(tile) = ctx.world.tile_mut(p.offset(dx, dy)) {
            tile.scent = 0;
        }
    }
    if ctx.world.is_outside(p) {
        ctx.decay(spread.outdoor_age);
    }
    if ctx.rng.percent() > spread.percent {
        return;
    }

    let density = ctx.density();
    let age = ctx.age();
    let world = &*ctx.world;
    let candidates: SmallVec<[Point; 8]> = neighbours(p)
        .filter(|&q| world.move_cost(q) > 0 || world.has_flag(q, TerrainFlag::Permeable))
        .filter(|&q| world.get_field(q, kind).is_none_or(|e| e.density() < density))
        .collect();
    if density <= 1 || age <= 0 || candidates.is_empty() {
        return;
    }
    let Some(&target) = ctx.rng.pick(&candidates) else {
        return;
    };

    let age_fraction = age / density;
    match ctx.world.get_field_mut(target, kind) {
        Some(existing) => {
            existing.intensify(1);
            existing.decay(age_fraction);
        }
        None => {
            ctx.add_field(target, kind, 1, age_fraction);
        }
    }
    ctx.intensify(-1);
    ctx.decay(-age_fraction);
}

/// Spores: converts a breathing monster on the tile and may take root.
pub fn fungal_haze(ctx: &mut TickContext) {
    spread_gas(ctx, FieldKind::FungalHaze, FUNGAL_HAZE_SPREAD);
    let p = ctx.pos();
    if ctx.world.move_cost(p) <= 0 {
        return;
    }
    if let Some(index) = ctx.world.creature_at(p) {
        let creature = &mut ctx.world.creatures[index];
        let breathes_spores = creature
            .as_monster()
            .is_some_and(|m| !m.is_fungus() && !m.has_flag(MonsterFlag::NoBreathe));
        if breathes_spores {
            let name = creature.name.clone();
            if !creature.make_fungus() {
                creature.die();
            }
            ctx.message(format!("The {} inhales thousands of live spores!", name));
        }
    }
    let density = ctx.density();
    if density > 0 && ctx.rng.one_in(5 - density) {
        if let Some(tile) = ctx.world.tile_mut(p) {
            tile.spread_fungus();
        }
    }
}

/// Weed, meth and crack smoke: diffuse, and occasionally draw a comment
/// from a friendly bystander.
pub fn narcotic_smoke(ctx: &mut TickContext, kind: FieldKind) {
    let spread = match kind {
        FieldKind::WeedSmoke => WEED_SMOKE_SPREAD,
        FieldKind::MethSmoke => METH_SMOKE_SPREAD,
        _ => CRACK_SMOKE_SPREAD,
    };
    spread_gas(ctx, kind, spread);

    if !ctx.rng.one_in(NARCOTIC_REMARK_ONE_IN) {
        return;
    }
    let Some(index) = ctx.world.creature_at(ctx.pos()) else {
        return;
    };
    let speaker = &ctx.world.creatures[index];
    let friendly_npc = speaker.as_character().is_some_and(|c| !c.is_player && c.friendly);
    if !friendly_npc {
        return;
    }
    let speaker = speaker.name.clone();
    let line = match kind {
        FieldKind::WeedSmoke if ctx.rng.one_in(10) => "Whew... smells like skunk!",
        FieldKind::WeedSmoke => "Man, that smells like some good stuff!",
        FieldKind::MethSmoke => "I don't know... should you really be smoking that stuff?",
        _ if ctx.rng.one_in(2) => "Ew, smells like burning rubber!",
        _ => "Ugh, that smells rancid!",
    };
    ctx.emit(FieldEvent::Speech {
        speaker,
        line: line.to_string(),
    });
}

/// Fallout irradiates its own tile before drifting.
pub fn nuke_gas(ctx: &mut TickContext) {
    let p = ctx.pos();
    let extra = ctx.rng.range(0, ctx.density());
    if let Some(tile) = ctx.world.tile_mut(p) {
        tile.radiation += extra;
    }
    spread_gas(ctx, FieldKind::NukeGas, NUKE_GAS_SPREAD);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::rules::testing::run_rule;
    use crate::world::creature::{Character, Creature, Monster};
    use crate::world::item::Material;
    use crate::world::{Terrain, World};

    const ALWAYS: GasSpread = GasSpread { percent: 100, outdoor_age: 0 };

    #[test]
    fn spread_moves_one_unit_and_shares_age() {
        let mut world = World::blank(8, 8);
        let p = Point::new(4, 4);
        world.add_field(p, FieldKind::Smoke, 3, 30);
        run_rule(&mut world, 5, p, FieldKind::Smoke, |ctx| spread_gas(ctx, FieldKind::Smoke, ALWAYS));

        let src = world.get_field(p, FieldKind::Smoke).unwrap();
        assert_eq!(src.density(), 2);
        assert_eq!(src.age(), 20);
        let spread: Vec<_> = neighbours(p)
            .filter_map(|q| world.get_field(q, FieldKind::Smoke))
            .collect();
        assert_eq!(spread.len(), 1);
        assert_eq!(spread[0].density(), 1);
        assert_eq!(spread[0].age(), 10);
    }

    #[test]
    fn dense_gas_settles_as_thin_wisps_over_several_tiles() {
        let mut world = World::blank(9, 9);
        let origin = Point::new(4, 4);
        world.add_field(origin, FieldKind::ToxicGas, 3, 1_000_000);
        for round in 0..200u64 {
            for q in world.active_points() {
                if world.field_density(q, FieldKind::ToxicGas) > 1 {
                    let seed = round * 100 + (q.y * 9 + q.x) as u64;
                    run_rule(&mut world, seed, q, FieldKind::ToxicGas, |ctx| {
                        spread_gas(ctx, FieldKind::ToxicGas, ALWAYS)
                    });
                }
            }
        }

        let densities: Vec<i32> = world
            .active_points()
            .iter()
            .map(|&q| world.field_density(q, FieldKind::ToxicGas))
            .collect();
        assert_eq!(densities, vec![1, 1, 1]);
        assert!(neighbours(origin).any(|q| world.has_field(q, FieldKind::ToxicGas)));
    }

    #[test]
    fn thin_or_newborn_gas_stays_put() {
        let mut world = World::blank(8, 8);
        let p = Point::new(4, 4);
        world.add_field(p, FieldKind::ToxicGas, 1, 30);
        run_rule(&mut world, 5, p, FieldKind::ToxicGas, |ctx| spread_gas(ctx, FieldKind::ToxicGas, ALWAYS));
        assert_eq!(world.active_points(), vec![p]);
    }

    #[test]
    fn gas_passes_fences_but_not_walls() {
        let mut world = World::blank(3, 3);
        for i in 0..9 {
            world.tiles[i].terrain = Terrain::WallConcrete;
        }
        let p = Point::new(1, 1);
        world.tile_mut(p).unwrap().terrain = Terrain::Dirt;
        world.tile_mut(Point::new(2, 1)).unwrap().terrain = Terrain::ChainFence;
        world.add_field(p, FieldKind::TearGas, 3, 12);
        run_rule(&mut world, 8, p, FieldKind::TearGas, |ctx| spread_gas(ctx, FieldKind::TearGas, ALWAYS));
        assert_eq!(world.field_density(Point::new(2, 1), FieldKind::TearGas), 1);
    }

    #[test]
    fn stronger_neighbours_are_not_targets() {
        let mut world = World::blank(3, 3);
        let p = Point::new(1, 1);
        for q in neighbours(p) {
            world.add_field(q, FieldKind::Smoke, 2, 1);
        }
        world.add_field(p, FieldKind::Smoke, 2, 40);
        run_rule(&mut world, 3, p, FieldKind::Smoke, |ctx| spread_gas(ctx, FieldKind::Smoke, ALWAYS));
        assert_eq!(world.field_density(p, FieldKind::Smoke), 2);
    }

    #[test]
    fn scent_is_cleared_and_outdoor_gas_ages() {
        let mut world = World::blank(5, 5);
        for tile in world.tiles.iter_mut() {
            tile.scent = 9;
        }
        let p = Point::new(2, 2);
        world.add_field(p, FieldKind::Smoke, 1, 1);
        let spread = GasSpread { percent: 0, outdoor_age: 50 };
        run_rule(&mut world, 1, p, FieldKind::Smoke, |ctx| spread_gas(ctx, FieldKind::Smoke, spread));
        assert_eq!(world.tile(Point::new(1, 3)).unwrap().scent, 0);
        assert_eq!(world.tile(Point::new(0, 0)).unwrap().scent, 9);
        assert_eq!(world.get_field(p, FieldKind::Smoke).unwrap().age(), 51);
    }

    #[test]
    fn haze_converts_breathing_flesh() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        world.add_field(p, FieldKind::FungalHaze, 1, 1);
        let monster = Monster {
            species: "ZOMBIE".to_string(),
            hp: 30,
            flags: vec![],
            materials: vec![Material::Flesh],
            armor_bash: 0,
        };
        world.add_creature(Creature::monster(0, "zombie", p, monster.clone()));
        let events = run_rule(&mut world, 4, p, FieldKind::FungalHaze, fungal_haze);
        assert!(world.creatures[0].as_monster().unwrap().is_fungus());
        assert_eq!(events.len(), 1);

        let mut bot = monster;
        bot.materials = vec![Material::Steel];
        let q = Point::new(0, 0);
        world.add_field(q, FieldKind::FungalHaze, 1, 1);
        world.add_creature(Creature::monster(0, "robot", q, bot));
        run_rule(&mut world, 4, q, FieldKind::FungalHaze, fungal_haze);
        assert!(world.creatures[1].dead);
    }

    #[test]
    fn haze_spares_breathless_monsters() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        world.add_field(p, FieldKind::FungalHaze, 1, 1);
        let monster = Monster {
            species: "ROBOT".to_string(),
            hp: 30,
            flags: vec![MonsterFlag::NoBreathe],
            materials: vec![Material::Steel],
            armor_bash: 0,
        };
        world.add_creature(Creature::monster(0, "turret", p, monster));
        run_rule(&mut world, 4, p, FieldKind::FungalHaze, fungal_haze);
        assert!(!world.creatures[0].dead);
    }

    #[test]
    fn friendly_bystander_comments_eventually() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        world.add_creature(Creature::character(0, "Alice", p, Character::new(false)));
        let mut spoke = false;
        for seed in 0..200 {
            world.tiles.iter_mut().for_each(|t| t.fields.clear());
            world.add_field(p, FieldKind::WeedSmoke, 1, 1);
            let events = run_rule(&mut world, seed, p, FieldKind::WeedSmoke, |ctx| narcotic_smoke(ctx, FieldKind::WeedSmoke));
            if events.iter().any(|e| matches!(e, FieldEvent::Speech { speaker, .. } if speaker == "Alice")) {
                spoke = true;
                break;
            }
        }
        assert!(spoke);
    }

    #[test]
    fn fallout_irradiates() {
        let mut world = World::blank(5, 5);
        let p = Point::new(2, 2);
        world.add_field(p, FieldKind::NukeGas, 3, 5);
        for seed in 0..20 {
            run_rule(&mut world, seed, p, FieldKind::NukeGas, nuke_gas);
        }
        assert!(world.tile(p).unwrap().radiation > 0);
    }
}
