use serde::{Deserialize, Serialize};

use crate::field::Protection;
use crate::rng::SimRng;
use crate::world::grid::Point;
use crate::world::item::Material;

// === Body ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyPart {
    Torso,
    Head,
    Eyes,
    Mouth,
    ArmL,
    ArmR,
    HandL,
    HandR,
    LegL,
    LegR,
    FootL,
    FootR,
}

impl BodyPart {
    pub const ALL: [BodyPart; 12] = [
        BodyPart::Torso,
        BodyPart::Head,
        BodyPart::Eyes,
        BodyPart::Mouth,
        BodyPart::ArmL,
        BodyPart::ArmR,
        BodyPart::HandL,
        BodyPart::HandR,
        BodyPart::LegL,
        BodyPart::LegR,
        BodyPart::FootL,
        BodyPart::FootR,
    ];

    /// Hit-point pool that absorbs damage dealt to this part.
    pub fn hp_part(self) -> HpPart {
        match self {
            BodyPart::Torso => HpPart::Torso,
            BodyPart::Head | BodyPart::Eyes | BodyPart::Mouth => HpPart::Head,
            BodyPart::ArmL | BodyPart::HandL => HpPart::ArmL,
            BodyPart::ArmR | BodyPart::HandR => HpPart::ArmR,
            BodyPart::LegL | BodyPart::FootL => HpPart::LegL,
            BodyPart::LegR | BodyPart::FootR => HpPart::LegR,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HpPart {
    Torso,
    Head,
    ArmL,
    ArmR,
    LegL,
    LegR,
}

impl HpPart {
    pub const COUNT: usize = 6;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageKind {
    Bash,
    Acid,
    Heat,
    Electric,
}

// === Effects ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Webbed,
    Sap,
    OnFire,
    Smoke,
    TearGas,
    Blind,
    RelaxGas,
    Fungus,
    Poison,
    BadPoison,
    Stung,
    Stunned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub duration: i32,
    pub intensity: i32,
}

// === Capabilities ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trait {
    WebWalker,
    /// Mycus fireproofing; also shrugs off incendiary burns.
    Fireproof,
    /// Heat sink or sealed suit.
    HeatSink,
    FungalImmune,
    ElectricImmune,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterFlag {
    Flies,
    Digs,
    NoBreathe,
    WebWalk,
    SludgeProof,
    Sees,
    Firey,
}

/// Players and NPCs: hit points per limb, worn protection per body part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub is_player: bool,
    pub friendly: bool,
    pub hp: [i32; HpPart::COUNT],
    pub env_resist: [i32; 12],
    pub traits: Vec<Trait>,
    pub strength: i32,
    pub radiation: i32,
    pub in_vehicle: bool,
    pub on_ground: bool,
    pub underwater: bool,
}

impl Character {
    pub fn new(is_player: bool) -> Self {
        Self {
            is_player,
            friendly: !is_player,
            hp: [60; HpPart::COUNT],
            env_resist: [0; 12],
            traits: Vec::new(),
            strength: 8,
            radiation: 0,
            in_vehicle: false,
            on_ground: false,
            underwater: false,
        }
    }

    pub fn has_trait(&self, t: Trait) -> bool {
        self.traits.contains(&t)
    }

    pub fn env_resist(&self, part: BodyPart) -> i32 {
        self.env_resist[part.index()]
    }

    pub fn is_heat_immune(&self) -> bool {
        self.has_trait(Trait::HeatSink) || self.has_trait(Trait::Fireproof)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub species: String,
    pub hp: i32,
    pub flags: Vec<MonsterFlag>,
    pub materials: Vec<Material>,
    pub armor_bash: i32,
}

impl Monster {
    pub fn has_flag(&self, flag: MonsterFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn made_of(&self, material: Material) -> bool {
        self.materials.contains(&material)
    }

    pub fn made_of_any(&self, materials: &[Material]) -> bool {
        materials.iter().any(|m| self.made_of(*m))
    }

    pub fn is_fungus(&self) -> bool {
        self.species == "FUNGUS"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CreatureKind {
    Character(Character),
    Monster(Monster),
}

// === Creature ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub id: u32,
    pub name: String,
    pub pos: Point,
    /// Action points; penalties push this negative.
    pub moves: i32,
    pub effects: Vec<Effect>,
    pub dead: bool,
    pub kind: CreatureKind,
}

impl Creature {
    pub fn character(id: u32, name: &str, pos: Point, character: Character) -> Self {
        Self::with_kind(id, name, pos, CreatureKind::Character(character))
    }

    pub fn monster(id: u32, name: &str, pos: Point, monster: Monster) -> Self {
        Self::with_kind(id, name, pos, CreatureKind::Monster(monster))
    }

    fn with_kind(id: u32, name: &str, pos: Point, kind: CreatureKind) -> Self {
        Self {
            id,
            name: name.to_string(),
            pos,
            moves: 100,
            effects: Vec::new(),
            dead: false,
            kind,
        }
    }

    pub fn as_character(&self) -> Option<&Character> {
        match &self.kind {
            CreatureKind::Character(c) => Some(c),
            CreatureKind::Monster(_) => None,
        }
    }

    pub fn as_character_mut(&mut self) -> Option<&mut Character> {
        match &mut self.kind {
            CreatureKind::Character(c) => Some(c),
            CreatureKind::Monster(_) => None,
        }
    }

    pub fn as_monster(&self) -> Option<&Monster> {
        match &self.kind {
            CreatureKind::Monster(m) => Some(m),
            CreatureKind::Character(_) => None,
        }
    }

    pub fn as_monster_mut(&mut self) -> Option<&mut Monster> {
        match &mut self.kind {
            CreatureKind::Monster(m) => Some(m),
            CreatureKind::Character(_) => None,
        }
    }

    pub fn is_player(&self) -> bool {
        self.as_character().is_some_and(|c| c.is_player)
    }

    /// Breathing and eye protection, as consulted by field danger checks.
    pub fn protection(&self) -> Protection {
        match &self.kind {
            CreatureKind::Character(c) => Protection {
                mouth: c.env_resist(BodyPart::Mouth),
                eyes: c.env_resist(BodyPart::Eyes),
                fungal_immune: c.has_trait(Trait::FungalImmune),
            },
            CreatureKind::Monster(m) => Protection {
                mouth: if m.has_flag(MonsterFlag::NoBreathe) { i32::MAX } else { 0 },
                eyes: 0,
                fungal_immune: m.is_fungus(),
            },
        }
    }

    /// Apply damage to one body part. Monsters have a single pool.
    /// Returns the damage actually dealt.
    pub fn deal_damage(&mut self, part: BodyPart, _kind: DamageKind, amount: i32) -> i32 {
        let amount = amount.max(0);
        match &mut self.kind {
            CreatureKind::Character(c) => c.hp[part.hp_part() as usize] -= amount,
            CreatureKind::Monster(m) => m.hp -= amount,
        }
        amount
    }

    /// Untyped damage to every hit-point pool.
    pub fn hurt_all(&mut self, amount: i32) {
        let amount = amount.max(0);
        match &mut self.kind {
            CreatureKind::Character(c) => c.hp.iter_mut().for_each(|hp| *hp -= amount),
            CreatureKind::Monster(m) => m.hp -= amount,
        }
    }

    pub fn mod_moves(&mut self, delta: i32) {
        self.moves += delta;
    }

    pub fn add_effect(&mut self, kind: EffectKind, duration: i32) {
        self.add_effect_intensity(kind, duration, 1);
    }

    /// Add or extend an effect. Repeat applications stack duration and keep
    /// the strongest intensity.
    pub fn add_effect_intensity(&mut self, kind: EffectKind, duration: i32, intensity: i32) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == kind) {
            existing.duration += duration;
            existing.intensity = existing.intensity.max(intensity);
            return;
        }
        self.effects.push(Effect {
            kind,
            duration,
            intensity,
        });
    }

    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn effect(&self, kind: EffectKind) -> Option<&Effect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    /// Environmental effect resisted by the protection worn on `part`:
    /// lands when `dice(strength, 3)` beats `dice(protection, 3)`.
    pub fn add_env_effect(
        &mut self,
        rng: &mut SimRng,
        kind: EffectKind,
        part: BodyPart,
        strength: i32,
        duration: i32,
    ) -> bool {
        let protection = match &self.kind {
            CreatureKind::Character(c) => c.env_resist(part),
            CreatureKind::Monster(_) => 0,
        };
        if rng.dice(strength, 3) > rng.dice(protection, 3) {
            self.add_effect(kind, duration);
            true
        } else {
            false
        }
    }

    /// Marks the creature dead once a vital pool is exhausted.
    pub fn check_dead_state(&mut self) -> bool {
        let exhausted = match &self.kind {
            CreatureKind::Character(c) => {
                c.hp[HpPart::Torso as usize] <= 0 || c.hp[HpPart::Head as usize] <= 0
            }
            CreatureKind::Monster(m) => m.hp <= 0,
        };
        if exhausted {
            self.dead = true;
        }
        self.dead
    }

    pub fn die(&mut self) {
        self.dead = true;
    }

    /// Turn a monster into a fungal host. Only living tissue can be taken.
    pub fn make_fungus(&mut self) -> bool {
        let name = format!("fungal {}", self.name);
        let Some(m) = self.as_monster_mut() else {
            return false;
        };
        if m.is_fungus() {
            return true;
        }
        if !m.made_of_any(&[Material::Flesh, Material::Veggy]) {
            return false;
        }
        m.species = "FUNGUS".to_string();
        m.materials = vec![Material::Veggy];
        self.name = name;
        true
    }
}
