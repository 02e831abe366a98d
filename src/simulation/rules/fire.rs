//! Fire: burns what lies on its tile, eats flammable terrain, grows with
//! banked fuel and creeps onto neighbouring fuel or gives off smoke.

use crate::field::FieldKind;
use crate::rng::SimRng;
use crate::simulation::constants::*;
use crate::simulation::effects::{ammo_effects, explosion};
use crate::simulation::engine::TickContext;
use crate::world::grid::{rotated_block, OFFSETS_9};
use crate::world::item::{AmmoData, Material};
use crate::world::{Item, Point, TerrainFlag};

pub fn fire(ctx: &mut TickContext) {
    let p = ctx.pos();
    detonate_explosives(ctx, p);
    let mut smoke = burn_fuel(ctx, p);

    let damage = ctx.density() * FIRE_VEHICLE_DAMAGE;
    if let Some(part) = ctx.world.tile_mut(p).and_then(|t| t.vehicle.as_mut()) {
        part.damage(damage);
    }

    let contained = ctx.world.tile(p).is_some_and(|t| t.contains_fire());
    if !contained {
        smoke += consume_terrain(ctx, p);
    }

    let in_pit = ctx.world.tile(p).is_some_and(|t| t.is_pit());
    if ctx.age() < 0 && !contained {
        if ctx.density() == 3 {
            feed_neighbours(ctx, p, in_pit);
        } else {
            grow(ctx, p);
        }
    }

    spread(ctx, p, in_pit, contained, &mut smoke);
    let density = ctx.density();
    create_hot_air(ctx, p, density);
}

/// Release hot-air decoys around a heat source.
pub fn create_hot_air(ctx: &mut TickContext, p: Point, density: i32) {
    let kind = FieldKind::hot_air(density);
    for _ in 0..HOT_AIR_PUFFS {
        let dx = ctx.rng.range(-1, 1);
        let dy = ctx.rng.range(-1, 1);
        ctx.add_field(p.offset(dx, dy), kind, 1, 0);
    }
}

fn detonate_explosives(ctx: &mut TickContext, p: Point) {
    let Some(tile) = ctx.world.tile_mut(p) else {
        return;
    };
    if !tile.items.iter().any(|item| item.explode_in_fire > 0) {
        return;
    }
    let (bombs, rest): (Vec<Item>, Vec<Item>) =
        std::mem::take(&mut tile.items).into_iter().partition(|item| item.explode_in_fire > 0);
    tile.items = rest;
    for bomb in bombs {
        explosion(ctx, p, bomb.explode_in_fire, false);
    }
}

// === Fuel ===

/// What burning one item this tick does to the fire.
#[derive(Debug, Default, PartialEq, Eq)]
struct Fuel {
    burn: i32,
    time_added: i32,
    smoke: i32,
    destroyed: bool,
}

/// How a heated round goes off.
enum Cookoff {
    Shrapnel(i32),
    Payload(AmmoData),
}

fn cookoff(item: &Item) -> Option<Cookoff> {
    let ammo = item.ammo.as_ref()?;
    if item.made_of(Material::Hydrocarbons) || item.made_of(Material::Oil) {
        return None;
    }
    if ammo.effects.iter().any(|e| e.is_cookoff()) {
        Some(Cookoff::Shrapnel(ammo.damage / 2))
    } else if !ammo.effects.is_empty() {
        Some(Cookoff::Payload(ammo.clone()))
    } else {
        None
    }
}

/// Burn items on the tile until the fire has eaten its fill. Returns the
/// smoke pressure the burning produced.
fn burn_fuel(ctx: &mut TickContext, p: Point) -> i32 {
    let density = ctx.density();
    let max_consume = density * 2;
    let items = match ctx.world.tile_mut(p) {
        Some(tile) if !tile.items.is_empty() => std::mem::take(&mut tile.items),
        _ => return 0,
    };

    let mut kept = Vec::with_capacity(items.len());
    let mut released = Vec::new();
    let mut consumed = 0;
    let mut smoke = 0;
    let mut pending = items.into_iter();
    while consumed < max_consume {
        let Some(mut item) = pending.next() else {
            break;
        };
        if let Some(kind) = cookoff(&item) {
            let rounds = ctx.rng.range(1, item.charges.max(1));
            for _ in 0..rounds / 10 + 1 {
                match &kind {
                    Cookoff::Shrapnel(power) => explosion(ctx, p, *power, false),
                    Cookoff::Payload(ammo) => ammo_effects(ctx, p, &ammo.effects),
                }
            }
            item.charges -= rounds;
            if item.charges > 0 {
                kept.push(item);
            }
            break;
        }

        let Some(fuel) = fuel_value(ctx.rng, &item, density, max_consume - consumed) else {
            kept.push(item);
            continue;
        };
        consumed += 1;
        smoke += fuel.smoke;
        let destroyed = fuel.destroyed || item.burn(fuel.burn);
        ctx.decay(-fuel.time_added);
        if destroyed {
            released.append(&mut item.contents);
        } else {
            kept.push(item);
        }
    }
    kept.extend(pending);

    let tick = ctx.world.tick_count;
    for item in released.iter_mut() {
        item.bday = tick;
    }
    kept.extend(released);
    if let Some(tile) = ctx.world.tile_mut(p) {
        kept.append(&mut tile.items);
        tile.items = kept;
    }
    smoke
}

/// Material-driven burn for one item, or `None` for items the fire ignores.
fn fuel_value(rng: &mut SimRng, item: &Item, density: i32, remaining: i32) -> Option<Fuel> {
    let vol = item.volume;
    let is_ammo = item.is_ammo();
    let mut fuel = Fuel::default();

    if item.made_of(Material::Paper) {
        // Paper burns three times as fast as anything else.
        let base = 3;
        fuel.burn = base * remaining;
        if is_ammo && item.charges - fuel.burn < 0 {
            fuel.burn = item.charges;
        }
        if density == 1 {
            fuel.time_added = vol * 10 + vol * 10 * (fuel.burn / base);
        }
        if vol >= 4 {
            fuel.smoke += 1;
        }
    } else if item.made_of(Material::Wood) || item.made_of(Material::Veggy) {
        if vol <= density * 10 || density == 3 {
            fuel.time_added = 1;
            if rng.one_in(if is_ammo { 25 } else { 50 }) {
                fuel.burn = density;
            }
        } else if item.burnt < density {
            fuel.burn = 1;
        }
        fuel.smoke += 1;
    } else if (item.made_of(Material::Cotton) || item.made_of(Material::Wool)) && !item.made_of(Material::Nomex) {
        if vol <= 5 || density > 1 {
            fuel.time_added = 1;
            fuel.burn = density;
        } else if rng.x_in_y(density, item.burnt) {
            fuel.burn = 1;
        }
        fuel.smoke += 1;
    } else if item.made_of(Material::Flesh) {
        if vol <= density * 5 || (density == 3 && rng.one_in(vol / 20)) {
            fuel.time_added = 1;
            fuel.burn = density;
            fuel.smoke += 3;
        } else if rng.x_in_y(density, item.burnt) {
            fuel.burn = 1;
            fuel.smoke += 1;
        }
    } else if item.is_liquid() {
        if item.made_of(Material::Hydrocarbons) {
            fuel.time_added = 300;
            fuel.smoke += 6;
        } else if item.made_of(Material::Alcohol) && item.materials.len() == 1 {
            fuel.time_added = 250;
            fuel.smoke += 1;
        } else if item.type_id == "lamp_oil" {
            fuel.time_added = 300;
            fuel.smoke += 3;
        } else {
            // Water and the like smother the flames.
            fuel.time_added = -rng.range(80 * vol, 300 * vol);
            fuel.smoke += 1;
        }
        fuel.burn = density;
    } else if item.made_of(Material::Powder) {
        fuel.time_added = vol * 100;
        fuel.destroyed = true;
        fuel.smoke += 2;
    } else if item.made_of(Material::Plastic) && !item.made_of(Material::Nomex) {
        fuel.smoke += 3;
        if item.burnt <= density * 2 || (density == 3 && rng.one_in(vol)) {
            fuel.burn = density;
            if rng.one_in(if is_ammo { vol } else { item.burnt }) {
                fuel.time_added = 1;
            }
        }
    } else if !item.made_of(Material::Nomex) {
        let resist = item.fire_resist();
        if resist < density && rng.one_in(vol) {
            fuel.smoke += 1;
            fuel.burn = density - resist;
        }
    } else {
        return None;
    }
    Some(fuel)
}

// === Terrain ===

/// Feed on the ground itself. Returns the extra smoke pressure.
fn consume_terrain(ctx: &mut TickContext, p: Point) -> i32 {
    let density = ctx.density();
    let scorched = |ctx: &TickContext| ctx.density() == 3 || ctx.age() < FIRE_SCORCH_AGE;

    if ctx.world.has_flag(p, TerrainFlag::Flammable) && ctx.rng.one_in(32 - density * 10) {
        ctx.decay(-density * density * 40);
        if ctx.density() == 3 {
            if let Some(tile) = ctx.world.tile_mut(p) {
                tile.destroy();
            }
        }
        15
    } else if ctx.world.has_flag(p, TerrainFlag::FlammableAsh) && ctx.rng.one_in(32 - density * 10) {
        ctx.decay(-density * density * 40);
        if scorched(ctx) {
            if let Some(tile) = ctx.world.tile_mut(p) {
                tile.convert_to_ash();
            }
        }
        15
    } else if ctx.world.has_flag(p, TerrainFlag::FlammableHard) && ctx.rng.one_in(62 - density * 10) {
        ctx.decay(-density * density * 30);
        if scorched(ctx) {
            if let Some(tile) = ctx.world.tile_mut(p) {
                tile.destroy();
            }
        }
        10
    } else {
        if ctx.world.has_flag(p, TerrainFlag::Swimmable) {
            ctx.decay(FIRE_WATER_DECAY);
        }
        0
    }
}

// === Growth ===

/// An inferno spends banked age making nearby fires bigger.
fn feed_neighbours(ctx: &mut TickContext, p: Point, in_pit: bool) {
    let start_col = ctx.rng.range(0, 2);
    let start_row = ctx.rng.range(0, 2);
    for q in rotated_block(p, start_col, start_row) {
        if ctx.age() >= 0 {
            break;
        }
        if q == p || ctx.world.tile(q).is_none_or(|t| t.is_pit() != in_pit) {
            continue;
        }
        if let Some(other) = ctx.world.get_field_mut(q, FieldKind::Fire) {
            if other.density() < 3 {
                other.intensify(1);
                ctx.decay(FIRE_DONATION_COST);
            }
        }
    }
}

/// Grow toward the size the fuel bank or burning neighbours allow.
fn grow(ctx: &mut TickContext, p: Point) {
    let max_density = if ctx.age() < FIRE_INFERNO_AGE {
        3
    } else {
        let adjacent = OFFSETS_9
            .iter()
            .filter(|&&(dx, dy)| (dx, dy) != (0, 0))
            .filter(|&&(dx, dy)| ctx.world.has_field(p.offset(dx, dy), FieldKind::Fire))
            .count();
        let by_neighbours = 1 + i32::from(adjacent >= 1) + i32::from(adjacent >= 2);
        if by_neighbours < 2 && ctx.age() < FIRE_RAGING_AGE {
            2
        } else {
            by_neighbours
        }
    };
    while ctx.density() < max_density && ctx.age() < 0 {
        ctx.decay(FIRE_GROWTH_COST);
        ctx.intensify(1);
    }
}

// === Spread ===

fn spread(ctx: &mut TickContext, p: Point, in_pit: bool, contained: bool, smoke: &mut i32) {
    let start_col = ctx.rng.range(0, 2);
    let start_row = ctx.rng.range(0, 2);
    // The first square of the rotated scan is never a target.
    for q in rotated_block(p, start_col, start_row).skip(1) {
        if !ctx.world.in_bounds(q) {
            continue;
        }
        if try_ignite(ctx, q, in_pit, contained) {
            continue;
        }
        maybe_smoke(ctx, p, q, smoke);
    }
}

fn try_ignite(ctx: &mut TickContext, q: Point, in_pit: bool, contained: bool) -> bool {
    let density = ctx.density();
    let has_web = ctx.world.has_field(q, FieldKind::Web);
    let mut chance = 25 * (density - 1);
    if has_web {
        chance = 50 + chance / 2;
    }
    if ctx.rng.range(1, 100) >= chance || ctx.age() >= FIRE_SPREAD_MAX_AGE || contained {
        return false;
    }
    let Some(tile) = ctx.world.tile(q) else {
        return false;
    };
    if tile.is_pit() != in_pit {
        return false;
    }
    let flammable = tile.has_flag(TerrainFlag::Flammable);
    let ash = tile.has_flag(TerrainFlag::FlammableAsh);
    let hard = tile.has_flag(TerrainFlag::FlammableHard);
    let has_fuel = tile.has_flammable_items();
    let catches = (density >= 2 && flammable && ctx.rng.one_in(20))
        || (density >= 2 && ash && ctx.rng.one_in(10))
        || (density == 3 && hard && ctx.rng.one_in(10))
        || has_fuel
        || has_web;
    if !catches {
        return false;
    }

    ctx.add_field(q, FieldKind::Fire, 1, 0);
    if let Some(lit) = ctx.world.get_field_mut(q, FieldKind::Fire) {
        lit.decay(FIRE_IGNITION_NEW_AGE);
        ctx.decay(FIRE_IGNITION_COST);
    }
    if has_web {
        ctx.remove_field(q, FieldKind::Web);
    }
    true
}

fn maybe_smoke(ctx: &mut TickContext, p: Point, q: Point, smoke: &mut i32) {
    let mut no_smoke = true;
    for (dx, dy) in OFFSETS_9 {
        let r = p.offset(dx, dy);
        let fire = ctx.world.field_density(r, FieldKind::Fire);
        if fire == 3 || (fire == 2 && ctx.rng.one_in(4)) {
            *smoke += 1;
        } else if ctx.world.has_field(r, FieldKind::Smoke) {
            no_smoke = false;
        }
    }
    if !ctx.world.is_outside(q) {
        *smoke += FIRE_INDOOR_SMOKE;
    }
    let density = ctx.density();
    if ctx.world.move_cost(q) > 0
        && (ctx.rng.range(0, 100) <= *smoke || (no_smoke && ctx.rng.one_in(40)))
        && ctx.rng.range(3, 35) < density * 5
        && ctx.age() < FIRE_SMOKE_MAX_AGE
        && !ctx.world.has_flag(p, TerrainFlag::SuppressSmoke)
    {
        *smoke -= 1;
        let puff = ctx.rng.range(1, density);
        ctx.add_field(q, FieldKind::Smoke, puff, 0);
    }
}
