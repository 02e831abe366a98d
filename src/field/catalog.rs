use std::fmt;

use tracing::warn;

/// Divisor class used when a whole tile is bulk-aged by [`FieldSet::decay`].
///
/// [`FieldSet::decay`]: crate::field::FieldSet::decay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecayType {
    None,
    Fire,
    Liquid,
    Gas,
}

impl DecayType {
    /// Bulk-aging divisor. Zero means the kind is immune to bulk aging.
    pub fn divisor(self) -> i32 {
        match self {
            DecayType::None => 0,
            DecayType::Fire => 1,
            DecayType::Liquid => 3,
            DecayType::Gas => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Red,
    LightRed,
    Pink,
    Brown,
    Yellow,
    Green,
    LightGreen,
    Cyan,
    Blue,
    LightBlue,
    Magenta,
    LightGray,
    DarkGray,
    Black,
    LightRedYellow,
    LightRedRed,
}

/// Every hazard kind the engine knows about.
///
/// The discriminant is the positional index used by the snapshot encoding,
/// so the order here must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum FieldKind {
    Null,
    Blood,
    Bile,
    GibsFlesh,
    GibsVeggy,
    Web,
    Slime,
    Acid,
    Sap,
    Sludge,
    Fire,
    Rubble,
    Smoke,
    ToxicGas,
    TearGas,
    NukeGas,
    GasVent,
    FireVent,
    FlameBurst,
    Electricity,
    Fatigue,
    PushItems,
    ShockVent,
    AcidVent,
    Plasma,
    Laser,
    Spotlight,
    Dazzling,
    BloodVeggy,
    BloodInsect,
    BloodInvertebrate,
    GibsInsect,
    GibsInvertebrate,
    CigSmoke,
    WeedSmoke,
    CrackSmoke,
    MethSmoke,
    Bees,
    Incendiary,
    RelaxGas,
    FungalHaze,
    HotAir1,
    HotAir2,
    HotAir3,
    HotAir4,
}

impl FieldKind {
    pub const COUNT: usize = 45;

    pub const ALL: [FieldKind; FieldKind::COUNT] = [
        FieldKind::Null,
        FieldKind::Blood,
        FieldKind::Bile,
        FieldKind::GibsFlesh,
        FieldKind::GibsVeggy,
        FieldKind::Web,
        FieldKind::Slime,
        FieldKind::Acid,
        FieldKind::Sap,
        FieldKind::Sludge,
        FieldKind::Fire,
        FieldKind::Rubble,
        FieldKind::Smoke,
        FieldKind::ToxicGas,
        FieldKind::TearGas,
        FieldKind::NukeGas,
        FieldKind::GasVent,
        FieldKind::FireVent,
        FieldKind::FlameBurst,
        FieldKind::Electricity,
        FieldKind::Fatigue,
        FieldKind::PushItems,
        FieldKind::ShockVent,
        FieldKind::AcidVent,
        FieldKind::Plasma,
        FieldKind::Laser,
        FieldKind::Spotlight,
        FieldKind::Dazzling,
        FieldKind::BloodVeggy,
        FieldKind::BloodInsect,
        FieldKind::BloodInvertebrate,
        FieldKind::GibsInsect,
        FieldKind::GibsInvertebrate,
        FieldKind::CigSmoke,
        FieldKind::WeedSmoke,
        FieldKind::CrackSmoke,
        FieldKind::MethSmoke,
        FieldKind::Bees,
        FieldKind::Incendiary,
        FieldKind::RelaxGas,
        FieldKind::FungalHaze,
        FieldKind::HotAir1,
        FieldKind::HotAir2,
        FieldKind::HotAir3,
        FieldKind::HotAir4,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<FieldKind> {
        FieldKind::ALL.get(index).copied()
    }

    /// Catalog entry for this kind. Never fails: every kind owns a slot.
    pub fn def(self) -> &'static FieldDef {
        &CATALOG[self.index()]
    }

    pub fn id(self) -> &'static str {
        self.def().id
    }

    /// Hot-air decoy kind matching a fire tier; tiers above 4 saturate.
    pub fn hot_air(tier: i32) -> FieldKind {
        match tier {
            i32::MIN..=1 => FieldKind::HotAir1,
            2 => FieldKind::HotAir2,
            3 => FieldKind::HotAir3,
            _ => FieldKind::HotAir4,
        }
    }

    pub fn is_hot_air(self) -> bool {
        matches!(
            self,
            FieldKind::HotAir1 | FieldKind::HotAir2 | FieldKind::HotAir3 | FieldKind::HotAir4
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Density-indexed presentation and danger data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldVariant {
    pub name: &'static str,
    pub color: Color,
    pub dangerous: bool,
    /// 1.0 is fully see-through, 0.0 fully opaque.
    pub transparency: f32,
    pub luminance: f32,
}

/// Static metadata for one field kind.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub kind: FieldKind,
    pub id: &'static str,
    pub symbol: char,
    /// Higher wins when several kinds share a tile. Only affects drawing.
    pub priority: i32,
    /// Ticks; zero or less never decays.
    pub half_life: i32,
    pub decay: DecayType,
    pub variants: [FieldVariant; 3],
}

impl FieldDef {
    /// Variant for a density in 1..=3. Out-of-range densities are clamped.
    pub fn variant(&self, density: i32) -> &FieldVariant {
        &self.variants[(density.clamp(1, 3) - 1) as usize]
    }

    /// True when any density tier of this kind obscures vision.
    pub fn can_obscure(&self) -> bool {
        self.variants.iter().any(|v| v.transparency < 1.0)
    }

    /// True when any density tier of this kind emits light.
    pub fn can_glow(&self) -> bool {
        self.variants.iter().any(|v| v.luminance > 0.0)
    }
}

/// Look up the catalog entry for `kind`.
pub fn lookup(kind: FieldKind) -> &'static FieldDef {
    kind.def()
}

/// Resolve a catalog ident such as `"fd_fire"`.
///
/// Unknown idents are reported and resolve to [`FieldKind::Null`].
pub fn kind_from_name(name: &str) -> FieldKind {
    match CATALOG.iter().find(|def| def.id == name) {
        Some(def) => def.kind,
        None => {
            warn!(ident = name, "unknown field ident");
            FieldKind::Null
        }
    }
}

#[allow(clippy::too_many_arguments)]
const fn def(
    kind: FieldKind,
    id: &'static str,
    symbol: char,
    priority: i32,
    half_life: i32,
    decay: DecayType,
    names: [&'static str; 3],
    colors: [Color; 3],
    dangerous: [bool; 3],
    transparency: [f32; 3],
    luminance: [f32; 3],
) -> FieldDef {
    FieldDef {
        kind,
        id,
        symbol,
        priority,
        half_life,
        decay,
        variants: [
            variant(&names, &colors, &dangerous, &transparency, &luminance, 0),
            variant(&names, &colors, &dangerous, &transparency, &luminance, 1),
            variant(&names, &colors, &dangerous, &transparency, &luminance, 2),
        ],
    }
}

const fn variant(
    names: &[&'static str; 3],
    colors: &[Color; 3],
    dangerous: &[bool; 3],
    transparency: &[f32; 3],
    luminance: &[f32; 3],
    i: usize,
) -> FieldVariant {
    FieldVariant {
        name: names[i],
        color: colors[i],
        dangerous: dangerous[i],
        transparency: transparency[i],
        luminance: luminance[i],
    }
}

use Color::*;
use DecayType as D;

const CLEAR: [f32; 3] = [1.0, 1.0, 1.0];
const DARK: [f32; 3] = [0.0, 0.0, 0.0];
const SAFE: [bool; 3] = [false, false, false];
const HAZARD: [bool; 3] = [true, true, true];
const BLANK: [&str; 3] = ["", "", ""];

static CATALOG: [FieldDef; FieldKind::COUNT] = [
    def(FieldKind::Null, "fd_null", '%', 0, 0, D::None, BLANK, [White, White, White], SAFE, CLEAR, DARK),
    def(
        FieldKind::Blood, "fd_blood", '%', 0, 28800, D::Liquid,
        ["blood splatter", "blood stain", "puddle of blood"],
        [Red, Red, Red], SAFE, CLEAR, DARK,
    ),
    def(
        FieldKind::Bile, "fd_bile", '%', 0, 14400, D::Liquid,
        ["bile splatter", "bile stain", "puddle of bile"],
        [Pink, Pink, Pink], SAFE, CLEAR, DARK,
    ),
    def(
        FieldKind::GibsFlesh, "fd_gibs_flesh", '~', 0, 28800, D::Liquid,
        ["scraps of flesh", "bloody meat chunks", "heap of gore"],
        [Brown, LightRed, Red], SAFE, CLEAR, DARK,
    ),
    def(
        FieldKind::GibsVeggy, "fd_gibs_veggy", '~', 0, 28800, D::Liquid,
        ["shredded leaves and twigs", "shattered branches and leaves", "broken vegetation tangle"],
        [LightGreen, LightGreen, Green], SAFE, CLEAR, DARK,
    ),
    def(
        FieldKind::Web, "fd_web", '}', 2, 0, D::None,
        ["cobwebs", "webs", "thick webs"],
        [White, White, White], SAFE, [1.0, 1.0, 0.0], DARK,
    ),
    def(
        FieldKind::Slime, "fd_slime", '%', 0, 14400, D::Liquid,
        ["slime trail", "slime stain", "puddle of slime"],
        [LightGreen, LightGreen, Green], SAFE, CLEAR, DARK,
    ),
    def(
        FieldKind::Acid, "fd_acid", '5', 2, 10, D::None,
        ["acid splatter", "acid streak", "pool of acid"],
        [LightGreen, Green, Green], HAZARD, CLEAR, DARK,
    ),
    def(
        FieldKind::Sap, "fd_sap", '5', 2, 20, D::None,
        ["sap splatter", "glob of sap", "pool of sap"],
        [Yellow, Brown, Brown], HAZARD, CLEAR, DARK,
    ),
    def(
        FieldKind::Sludge, "fd_sludge", '5', 2, 3600, D::None,
        ["thin sludge trail", "sludge trail", "thick sludge trail"],
        [LightGray, DarkGray, Black], SAFE, CLEAR, DARK,
    ),
    def(
        FieldKind::Fire, "fd_fire", '4', 4, 800, D::Fire,
        ["small fire", "fire", "raging fire"],
        [Yellow, LightRed, Red], HAZARD, CLEAR, [16.0, 60.0, 160.0],
    ),
    def(
        FieldKind::Rubble, "fd_rubble", '#', 0, 1, D::None,
        ["legacy rubble", "legacy rubble", "legacy rubble"],
        [DarkGray, DarkGray, DarkGray], SAFE, CLEAR, DARK,
    ),
    def(
        FieldKind::Smoke, "fd_smoke", '8', 8, 300, D::Gas,
        ["thin smoke", "smoke", "thick smoke"],
        [White, LightGray, DarkGray], [false, true, true], [1.0, 0.5, 0.0], DARK,
    ),
    def(
        FieldKind::ToxicGas, "fd_toxic_gas", '8', 8, 900, D::Gas,
        ["hazy cloud", "toxic gas", "thick toxic gas"],
        [White, LightGreen, Green], [false, true, true], [1.0, 0.5, 0.0], DARK,
    ),
    def(
        FieldKind::TearGas, "fd_tear_gas", '8', 8, 600, D::Gas,
        ["hazy cloud", "tear gas", "thick tear gas"],
        [White, Yellow, Brown], HAZARD, [1.0, 0.5, 0.0], DARK,
    ),
    def(
        FieldKind::NukeGas, "fd_nuke_gas", '8', 8, 1000, D::Gas,
        ["hazy cloud", "radioactive gas", "thick radioactive gas"],
        [White, LightGreen, Green], HAZARD, [0.5, 0.5, 0.0], DARK,
    ),
    def(
        FieldKind::GasVent, "fd_gas_vent", '%', 0, 0, D::None,
        ["gas vent", "gas vent", "gas vent"],
        [White, White, White], SAFE, CLEAR, DARK,
    ),
    def(
        FieldKind::FireVent, "fd_fire_vent", '&', -1, 0, D::None,
        BLANK, [White, White, White], SAFE, CLEAR, [8.0, 8.0, 8.0],
    ),
    def(
        FieldKind::FlameBurst, "fd_flame_burst", '5', 4, 0, D::None,
        ["fire", "fire", "fire"],
        [Red, Red, Red], HAZARD, CLEAR, [8.0, 8.0, 8.0],
    ),
    def(
        FieldKind::Electricity, "fd_electricity", '9', 4, 2, D::None,
        ["sparks", "electric crackle", "electric cloud"],
        [White, Cyan, Blue], HAZARD, CLEAR, [1.0, 1.0, 8.0],
    ),
    def(
        FieldKind::Fatigue, "fd_fatigue", '*', 8, 0, D::None,
        ["odd ripple", "swirling air", "tear in reality"],
        [LightGray, DarkGray, Magenta], SAFE, [1.0, 1.0, 0.0], DARK,
    ),
    def(FieldKind::PushItems, "fd_push_items", '&', -1, 0, D::None, BLANK, [White, White, White], SAFE, CLEAR, DARK),
    def(FieldKind::ShockVent, "fd_shock_vent", '&', -1, 0, D::None, BLANK, [White, White, White], SAFE, CLEAR, DARK),
    def(FieldKind::AcidVent, "fd_acid_vent", '&', -1, 0, D::None, BLANK, [White, White, White], SAFE, CLEAR, DARK),
    def(
        FieldKind::Plasma, "fd_plasma", '9', 4, 2, D::None,
        ["faint plasma", "glowing plasma", "glaring plasma"],
        [Magenta, Pink, White], SAFE, CLEAR, [1.0, 1.0, 8.0],
    ),
    def(
        FieldKind::Laser, "fd_laser", '#', 4, 1, D::None,
        ["faint glimmer", "beam of light", "intense beam of light"],
        [Blue, LightBlue, White], SAFE, CLEAR, [1.0, 1.0, 1.0],
    ),
    def(
        FieldKind::Spotlight, "fd_spotlight", '&', 1, 1, D::None,
        ["spotlight", "spotlight", "spotlight"],
        [White, White, White], SAFE, CLEAR, [20.0, 20.0, 20.0],
    ),
    def(
        FieldKind::Dazzling, "fd_dazzling", '#', 4, 1, D::None,
        ["dazzling", "dazzling", "dazzling"],
        [LightRedYellow, LightRedYellow, LightRedYellow], SAFE, CLEAR, [2.0, 2.0, 2.0],
    ),
    def(
        FieldKind::BloodVeggy, "fd_blood_veggy", '%', 0, 28800, D::Liquid,
        ["plant sap splatter", "plant sap stain", "puddle of resin"],
        [LightGreen, LightGreen, LightGreen], SAFE, CLEAR, DARK,
    ),
    def(
        FieldKind::BloodInsect, "fd_blood_insect", '%', 0, 28800, D::Liquid,
        ["bug blood splatter", "bug blood stain", "puddle of bug blood"],
        [Green, Green, Green], SAFE, CLEAR, DARK,
    ),
    def(
        FieldKind::BloodInvertebrate, "fd_blood_invertebrate", '%', 0, 28800, D::Liquid,
        ["hemolymph splatter", "hemolymph stain", "puddle of hemolymph"],
        [LightGray, LightGray, LightGray], SAFE, CLEAR, DARK,
    ),
    def(
        FieldKind::GibsInsect, "fd_gibs_insect", '~', 0, 28800, D::Liquid,
        ["shards of chitin", "shattered bug leg", "torn insect organs"],
        [LightGreen, Green, Yellow], SAFE, CLEAR, DARK,
    ),
    def(
        FieldKind::GibsInvertebrate, "fd_gibs_invertebrate", '~', 0, 28800, D::Liquid,
        ["gooey scraps", "icky mess", "heap of squishy gore"],
        [LightGray, LightGray, DarkGray], SAFE, CLEAR, DARK,
    ),
    def(
        FieldKind::CigSmoke, "fd_cigsmoke", '%', 8, 350, D::Gas,
        ["swirl of tobacco smoke", "tobacco smoke", "thick tobacco smoke"],
        [White, LightGray, DarkGray], SAFE, [0.7, 0.7, 0.7], DARK,
    ),
    def(
        FieldKind::WeedSmoke, "fd_weedsmoke", '%', 8, 325, D::Gas,
        ["swirl of pot smoke", "pot smoke", "thick pot smoke"],
        [White, LightGray, DarkGray], SAFE, [0.7, 0.7, 0.7], DARK,
    ),
    def(
        FieldKind::CrackSmoke, "fd_cracksmoke", '%', 8, 225, D::Gas,
        ["swirl of crack smoke", "crack smoke", "thick crack smoke"],
        [White, LightGray, DarkGray], SAFE, [0.7, 0.7, 0.7], DARK,
    ),
    def(
        FieldKind::MethSmoke, "fd_methsmoke", '%', 8, 275, D::Gas,
        ["swirl of meth smoke", "meth smoke", "thick meth smoke"],
        [White, LightGray, DarkGray], SAFE, [0.7, 0.7, 0.7], DARK,
    ),
    def(
        FieldKind::Bees, "fd_bees", '8', 8, 1000, D::None,
        ["some bees", "swarm of bees", "angry swarm of bees"],
        [White, LightGray, DarkGray], HAZARD, CLEAR, DARK,
    ),
    def(
        FieldKind::Incendiary, "fd_incendiary", '8', 8, 500, D::None,
        ["smoke", "airborne incendiary", "airborne incendiary"],
        [White, LightRed, LightRedRed], HAZARD, [1.0, 0.5, 0.0], [8.0, 16.0, 30.0],
    ),
    def(
        FieldKind::RelaxGas, "fd_relax_gas", '.', 8, 500, D::Gas,
        ["hazy cloud", "sedative gas", "relaxation gas"],
        [White, Pink, Cyan], [false, true, true], [0.7, 0.7, 0.7], DARK,
    ),
    def(
        FieldKind::FungalHaze, "fd_fungal_haze", '.', 8, 40, D::Gas,
        ["hazy cloud", "fungal haze", "thick fungal haze"],
        [White, Cyan, Cyan], HAZARD, [1.0, 0.5, 0.0], DARK,
    ),
    def(FieldKind::HotAir1, "fd_hot_air1", '&', -1, 500, D::Gas, BLANK, [White, Yellow, Red], SAFE, CLEAR, DARK),
    def(FieldKind::HotAir2, "fd_hot_air2", '&', -1, 500, D::Gas, BLANK, [White, Yellow, Red], SAFE, CLEAR, DARK),
    def(FieldKind::HotAir3, "fd_hot_air3", '&', -1, 500, D::Gas, BLANK, [White, Yellow, Red], SAFE, CLEAR, DARK),
    def(FieldKind::HotAir4, "fd_hot_air4", '&', -1, 500, D::Gas, BLANK, [White, Yellow, Red], SAFE, CLEAR, DARK),
];
