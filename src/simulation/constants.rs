//! Tuned rule numbers for the field engine.
//!
//! Ages are in ticks; negative ages are banked lifetime. Percentages are
//! rolled against `1..=100`.

/// Diffusion parameters for one gas kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSpread {
    /// Chance per tick, in percent, of attempting a spread. Values over 100
    /// always spread.
    pub percent: i32,
    /// Extra age added each tick while the gas is outdoors.
    pub outdoor_age: i32,
}

pub const SMOKE_SPREAD: GasSpread = GasSpread { percent: 80, outdoor_age: 50 };
pub const TEAR_GAS_SPREAD: GasSpread = GasSpread { percent: 33, outdoor_age: 30 };
pub const RELAX_GAS_SPREAD: GasSpread = GasSpread { percent: 25, outdoor_age: 50 };
pub const FUNGAL_HAZE_SPREAD: GasSpread = GasSpread { percent: 33, outdoor_age: 5 };
pub const TOXIC_GAS_SPREAD: GasSpread = GasSpread { percent: 50, outdoor_age: 30 };
pub const CIG_SMOKE_SPREAD: GasSpread = GasSpread { percent: 250, outdoor_age: 65 };
pub const WEED_SMOKE_SPREAD: GasSpread = GasSpread { percent: 200, outdoor_age: 60 };
pub const METH_SMOKE_SPREAD: GasSpread = GasSpread { percent: 175, outdoor_age: 70 };
pub const CRACK_SMOKE_SPREAD: GasSpread = GasSpread { percent: 175, outdoor_age: 80 };
pub const NUKE_GAS_SPREAD: GasSpread = GasSpread { percent: 50, outdoor_age: 10 };
pub const HOT_AIR_SPREAD: GasSpread = GasSpread { percent: 100, outdoor_age: 1000 };
pub const BEES_SPREAD: GasSpread = GasSpread { percent: 5, outdoor_age: 0 };
pub const INCENDIARY_SPREAD: GasSpread = GasSpread { percent: 66, outdoor_age: 40 };

// === Liquids ===

/// Extra aging for blood, bile and gibs lying in water.
pub const RESIDUE_WATER_DECAY: i32 = 250;
/// Extra aging for acid diluted by water.
pub const ACID_WATER_DECAY: i32 = 20;
/// Item damage at which acid dissolves an item.
pub const ACID_DESTROY_DAMAGE: i32 = 5;
/// Acid resistance at or above which an item never corrodes.
pub const ACID_PROOF_RESIST: i32 = 9;

// === Fire ===

/// Fires older than this no longer spread to neighbours.
pub const FIRE_SPREAD_MAX_AGE: i32 = 200;
/// Fires older than this no longer give off smoke.
pub const FIRE_SMOKE_MAX_AGE: i32 = 1000;
/// Below this age a fire may reach density 3 without burning neighbours.
pub const FIRE_INFERNO_AGE: i32 = -1500;
/// Below this age a lone fire may reach density 2.
pub const FIRE_RAGING_AGE: i32 = -500;
/// Below this age burning ground is reduced to ash or rubble.
pub const FIRE_SCORCH_AGE: i32 = -600;
/// Age spent for each density step a fire grows.
pub const FIRE_GROWTH_COST: i32 = 300;
/// Age a density-3 fire spends to intensify a neighbouring fire.
pub const FIRE_DONATION_COST: i32 = 150;
/// Starting age of a freshly ignited neighbour.
pub const FIRE_IGNITION_NEW_AGE: i32 = 100;
/// Age a fire spends to ignite a neighbour.
pub const FIRE_IGNITION_COST: i32 = 50;
/// Extra aging for fire on water.
pub const FIRE_WATER_DECAY: i32 = 800;
/// Smoke bias for fires spreading into enclosed squares.
pub const FIRE_INDOOR_SMOKE: i32 = 10;
/// Damage per density dealt to a vehicle part standing in fire.
pub const FIRE_VEHICLE_DAMAGE: i32 = 10;
/// Hot-air decoys released by a fire each tick.
pub const HOT_AIR_PUFFS: i32 = 5;

// === Electricity ===

/// One in this many ticks electricity stays put.
pub const ELECTRICITY_IDLE_ONE_IN: i32 = 5;
/// Failed arc attempts before a grounded charge gives up for the tick.
pub const ELECTRICITY_ARC_RETRIES: i32 = 10;
/// Grounded charge older than this stops arcing.
pub const ELECTRICITY_ARC_MAX_AGE: i32 = 50;

// === Vents ===

pub const FIRE_VENT_COOLDOWN_ONE_IN: i32 = 3;
pub const SHOCK_VENT_COOLDOWN_ONE_IN: i32 = 5;
/// Bolt count range for a shock vent discharge.
pub const SHOCK_VENT_BOLTS: (i32, i32) = (3, 6);
/// Bolt length range, in squares.
pub const SHOCK_VENT_BOLT_LENGTH: (i32, i32) = (4, 12);
/// One in this many steps a bolt changes axis.
pub const SHOCK_VENT_TURN_ONE_IN: i32 = 4;
pub const ACID_VENT_RADIUS: i32 = 5;
/// Age at which a discharged acid vent drops one density.
pub const ACID_VENT_RECHARGE_AGE: i32 = 10;

// === Fatigue ===

/// Ticks between chances for a fatigue rift to grow.
pub const FATIGUE_GROWTH_PERIOD: u64 = 3600;
pub const FATIGUE_GROWTH_ONE_IN: i32 = 10;
pub const FATIGUE_SPAWN_ONE_IN: i32 = 600;
pub const FATIGUE_SPAWN_RADIUS: i32 = 3;
/// How far a monster may be flung by a rift.
pub const FATIGUE_TELEPORT_RANGE: i32 = 12;
pub const FATIGUE_TELEPORT_TRIES: i32 = 10;
/// Species a rift may let through.
pub const NETHER_SPECIES: [&str; 9] = [
    "flying polyp",
    "hunting horror",
    "mi-go",
    "yugg",
    "gelatinous blob",
    "flaming eye",
    "kreck",
    "gracke",
    "blank body",
];

// === Item pusher ===

/// Only items of this type are moved by the pusher.
pub const PUSHED_ITEM_TYPE: &str = "rock";
/// Bash damage dealt to whatever a pushed item lands on.
pub const PUSH_HIT_DAMAGE: i32 = 6;

// === Bees ===

/// Bees chase targets strictly closer than this.
pub const BEES_SIGHT_RANGE: i32 = 10;
/// Sting attempts per tick against a character in the swarm.
pub const BEE_STING_ROLLS: i32 = 8;

/// One in this many ticks a friendly bystander remarks on narcotic smoke.
pub const NARCOTIC_REMARK_ONE_IN: i32 = 20;
