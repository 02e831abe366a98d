use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Paper,
    Wood,
    Veggy,
    Cotton,
    Wool,
    Nomex,
    Flesh,
    Plastic,
    Powder,
    Hydrocarbons,
    Oil,
    Alcohol,
    Water,
    Bone,
    Stone,
    Steel,
    Kevlar,
    Glass,
}

impl Material {
    /// Resistance to burning; fire of a lower density cannot char it.
    pub fn fire_resist(self) -> i32 {
        match self {
            Material::Paper | Material::Veggy | Material::Cotton | Material::Powder => 0,
            Material::Hydrocarbons | Material::Oil | Material::Alcohol => 0,
            Material::Wood | Material::Wool | Material::Flesh | Material::Plastic => 1,
            Material::Bone | Material::Water => 2,
            Material::Kevlar => 3,
            Material::Stone | Material::Nomex => 4,
            Material::Glass | Material::Steel => 5,
        }
    }

    /// Acid resistance; 0 corrodes every tick, 9 and above never.
    pub fn acid_resist(self) -> i32 {
        match self {
            Material::Paper | Material::Veggy | Material::Cotton | Material::Flesh => 0,
            Material::Wool | Material::Powder => 0,
            Material::Wood | Material::Bone => 1,
            Material::Kevlar | Material::Nomex => 3,
            Material::Steel => 5,
            Material::Plastic => 6,
            Material::Hydrocarbons | Material::Oil | Material::Alcohol | Material::Water => 9,
            Material::Stone | Material::Glass => 9,
        }
    }

    pub fn is_liquid(self) -> bool {
        matches!(
            self,
            Material::Water | Material::Oil | Material::Alcohol | Material::Hydrocarbons
        )
    }

    fn burns(self) -> bool {
        matches!(
            self,
            Material::Paper
                | Material::Wood
                | Material::Veggy
                | Material::Cotton
                | Material::Wool
                | Material::Flesh
                | Material::Plastic
                | Material::Powder
                | Material::Hydrocarbons
                | Material::Oil
                | Material::Alcohol
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemPhase {
    Solid,
    Liquid,
    Powder,
}

/// Tags describing what a round does when it goes off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmmoEffect {
    Incendiary,
    Cookoff,
    Frag,
    Napalm,
    NapalmBig,
    Explosive,
    ExplosiveBig,
    ExplosiveHuge,
    Teargas,
    Smoke,
    SmokeBig,
    Flashbang,
}

impl AmmoEffect {
    /// Cooks off as shrapnel when heated.
    pub fn is_cookoff(self) -> bool {
        matches!(self, AmmoEffect::Incendiary | AmmoEffect::Cookoff)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmmoData {
    pub damage: i32,
    pub effects: Vec<AmmoEffect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub type_id: String,
    pub materials: SmallVec<[Material; 2]>,
    pub phase: ItemPhase,
    pub volume: i32,
    pub burnt: i32,
    /// Corrosion and wear; destroyed by acid at 5.
    pub damage: i32,
    /// Stack size for ammunition and liquids; 0 for single items.
    pub charges: i32,
    /// Blast power when heated; 0 for inert items.
    pub explode_in_fire: i32,
    pub ammo: Option<AmmoData>,
    pub contents: Vec<Item>,
    /// Tick the item appeared on its current tile.
    pub bday: u64,
}

impl Item {
    pub fn new(type_id: &str, materials: &[Material], volume: i32) -> Self {
        Self {
            type_id: type_id.to_string(),
            materials: materials.iter().copied().collect(),
            phase: ItemPhase::Solid,
            volume,
            burnt: 0,
            damage: 0,
            charges: 0,
            explode_in_fire: 0,
            ammo: None,
            contents: Vec::new(),
            bday: 0,
        }
    }

    pub fn liquid(type_id: &str, material: Material, charges: i32) -> Self {
        Self {
            phase: ItemPhase::Liquid,
            charges,
            ..Item::new(type_id, &[material], 1)
        }
    }

    pub fn ammo(type_id: &str, damage: i32, effects: &[AmmoEffect], charges: i32) -> Self {
        Self {
            charges,
            ammo: Some(AmmoData {
                damage,
                effects: effects.to_vec(),
            }),
            ..Item::new(type_id, &[Material::Steel, Material::Powder], 1)
        }
    }

    pub fn with_contents(mut self, contents: Vec<Item>) -> Self {
        self.contents = contents;
        self
    }

    pub fn made_of(&self, material: Material) -> bool {
        self.materials.contains(&material)
    }

    pub fn is_liquid(&self) -> bool {
        self.phase == ItemPhase::Liquid
    }

    pub fn is_ammo(&self) -> bool {
        self.ammo.is_some()
    }

    /// Toughest acid resistance among the item's materials.
    pub fn acid_resist(&self) -> i32 {
        self.materials.iter().map(|m| m.acid_resist()).max().unwrap_or(0)
    }

    pub fn fire_resist(&self) -> i32 {
        self.materials.iter().map(|m| m.fire_resist()).max().unwrap_or(0)
    }

    /// Anything on the tile that fire could feed on.
    pub fn is_flammable(&self) -> bool {
        !self.made_of(Material::Nomex) && self.materials.iter().any(|m| m.burns())
    }

    /// Char the item by `amount`. Stacks lose charges, single items
    /// accumulate burn. Returns whether the item is consumed.
    pub fn burn(&mut self, amount: i32) -> bool {
        if amount <= 0 {
            return false;
        }
        if self.charges > 0 {
            self.charges -= amount;
            return self.charges <= 0;
        }
        self.burnt += amount;
        self.burnt >= self.volume.max(1) * 3
    }
}
