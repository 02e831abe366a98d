use serde::{Deserialize, Serialize};

use crate::field::FieldSet;
use crate::world::item::Item;

// === Flags ===

/// Named properties shared by terrain and furniture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainFlag {
    /// Burns readily and is destroyed by a raging fire.
    Flammable,
    /// Burns down to dirt and ash.
    FlammableAsh,
    /// Burns slowly; only a raging fire spreads onto it.
    FlammableHard,
    /// Gas passes through even though creatures cannot.
    Permeable,
    Swimmable,
    /// Fire on this tile never consumes terrain nor spreads.
    FireContainer,
    SuppressSmoke,
    Transparent,
}

// === Terrain ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Dirt,
    Grass,
    Underbrush,
    Tree,
    FloorWood,
    FloorConcrete,
    WallWood,
    WallConcrete,
    DoorClosed,
    DoorOpen,
    Window,
    ChainFence,
    WaterShallow,
    WaterDeep,
    Pit,
    Rubble,
    FungalFloor,
}

impl Terrain {
    pub fn name(self) -> &'static str {
        match self {
            Terrain::Dirt => "dirt",
            Terrain::Grass => "grass",
            Terrain::Underbrush => "underbrush",
            Terrain::Tree => "tree",
            Terrain::FloorWood => "wooden floor",
            Terrain::FloorConcrete => "concrete floor",
            Terrain::WallWood => "wooden wall",
            Terrain::WallConcrete => "concrete wall",
            Terrain::DoorClosed => "closed door",
            Terrain::DoorOpen => "open door",
            Terrain::Window => "window",
            Terrain::ChainFence => "chain link fence",
            Terrain::WaterShallow => "shallow water",
            Terrain::WaterDeep => "deep water",
            Terrain::Pit => "pit",
            Terrain::Rubble => "rubble",
            Terrain::FungalFloor => "fungal bed",
        }
    }

    /// Movement cost; 0 means impassable.
    pub fn move_cost(self) -> i32 {
        match self {
            Terrain::Dirt | Terrain::Grass | Terrain::FloorWood | Terrain::FloorConcrete => 2,
            Terrain::DoorOpen | Terrain::FungalFloor => 2,
            Terrain::Underbrush => 3,
            Terrain::Rubble => 4,
            Terrain::WaterShallow => 5,
            Terrain::WaterDeep => 8,
            Terrain::Pit => 10,
            Terrain::Tree
            | Terrain::WallWood
            | Terrain::WallConcrete
            | Terrain::DoorClosed
            | Terrain::Window
            | Terrain::ChainFence => 0,
        }
    }

    pub fn flags(self) -> &'static [TerrainFlag] {
        use TerrainFlag::*;
        match self {
            Terrain::Dirt | Terrain::FloorConcrete | Terrain::Pit | Terrain::Rubble => &[Transparent],
            Terrain::FungalFloor | Terrain::Window => &[Transparent],
            Terrain::Grass | Terrain::Underbrush => &[Transparent, FlammableAsh],
            Terrain::Tree => &[FlammableAsh],
            Terrain::FloorWood => &[Transparent, FlammableHard],
            Terrain::WallWood => &[FlammableHard],
            Terrain::WallConcrete => &[],
            Terrain::DoorClosed => &[FlammableAsh],
            Terrain::DoorOpen => &[Transparent, FlammableAsh],
            Terrain::ChainFence => &[Transparent, Permeable],
            Terrain::WaterShallow => &[Transparent],
            Terrain::WaterDeep => &[Transparent, Swimmable],
        }
    }

    pub fn has_flag(self, flag: TerrainFlag) -> bool {
        self.flags().contains(&flag)
    }

    /// What remains after the terrain is destroyed by fire or force.
    pub fn destroyed(self) -> Terrain {
        match self {
            Terrain::WallWood
            | Terrain::WallConcrete
            | Terrain::DoorClosed
            | Terrain::DoorOpen
            | Terrain::Window
            | Terrain::ChainFence => Terrain::Rubble,
            Terrain::Grass | Terrain::Underbrush | Terrain::Tree | Terrain::FloorWood => Terrain::Dirt,
            other => other,
        }
    }
}

// === Furniture ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Furniture {
    None,
    Ash,
    Brazier,
    Fireplace,
    Table,
    Bookcase,
    Bed,
    RangeHood,
}

impl Furniture {
    pub fn name(self) -> &'static str {
        match self {
            Furniture::None => "",
            Furniture::Ash => "ash",
            Furniture::Brazier => "brazier",
            Furniture::Fireplace => "fireplace",
            Furniture::Table => "table",
            Furniture::Bookcase => "bookcase",
            Furniture::Bed => "bed",
            Furniture::RangeHood => "range hood",
        }
    }

    /// Extra movement cost on top of the terrain's.
    pub fn move_cost_mod(self) -> i32 {
        match self {
            Furniture::Table | Furniture::Bed => 1,
            Furniture::Brazier | Furniture::Fireplace => 2,
            _ => 0,
        }
    }

    /// Whether the furniture blocks movement outright.
    pub fn blocks(self) -> bool {
        matches!(self, Furniture::Bookcase)
    }

    pub fn flags(self) -> &'static [TerrainFlag] {
        use TerrainFlag::*;
        match self {
            Furniture::None | Furniture::Ash => &[],
            Furniture::Brazier | Furniture::Fireplace => &[FireContainer],
            Furniture::Table => &[FlammableHard],
            Furniture::Bookcase => &[Flammable],
            Furniture::Bed => &[FlammableAsh],
            Furniture::RangeHood => &[SuppressSmoke],
        }
    }
}

// === Vehicle ===

/// The part of a vehicle occupying a tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehiclePart {
    pub name: String,
    pub hp: i32,
    /// Passengers on a covered part count as inside.
    pub covered: bool,
}

impl VehiclePart {
    pub fn damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount.max(0)).max(0);
    }

    pub fn is_broken(&self) -> bool {
        self.hp == 0
    }
}

// === Tile ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub terrain: Terrain,
    pub furniture: Furniture,
    /// Open to the sky; gases dissipate faster.
    pub outside: bool,
    pub fields: FieldSet,
    pub items: Vec<Item>,
    pub scent: i32,
    pub radiation: i32,
    pub vehicle: Option<VehiclePart>,
}

impl Tile {
    pub fn new(terrain: Terrain, outside: bool) -> Self {
        Self {
            terrain,
            furniture: Furniture::None,
            outside,
            fields: FieldSet::new(),
            items: Vec::new(),
            scent: 0,
            radiation: 0,
            vehicle: None,
        }
    }

    /// Flag carried by either the terrain or the furniture.
    pub fn has_flag(&self, flag: TerrainFlag) -> bool {
        self.terrain.has_flag(flag) || self.furniture.flags().contains(&flag)
    }

    pub fn move_cost(&self) -> i32 {
        let base = self.terrain.move_cost();
        if base == 0 || self.furniture.blocks() {
            return 0;
        }
        base + self.furniture.move_cost_mod()
    }

    pub fn is_walkable(&self) -> bool {
        self.move_cost() > 0
    }

    pub fn is_pit(&self) -> bool {
        self.terrain == Terrain::Pit
    }

    /// Terrain see-through check, ignoring fields.
    pub fn is_transparent(&self) -> bool {
        self.terrain.has_flag(TerrainFlag::Transparent) && !self.furniture.blocks()
    }

    pub fn is_flammable(&self) -> bool {
        self.has_flag(TerrainFlag::Flammable)
            || self.has_flag(TerrainFlag::FlammableAsh)
            || self.has_flag(TerrainFlag::FlammableHard)
    }

    /// Fire stays put: a container or a brazier.
    pub fn contains_fire(&self) -> bool {
        self.has_flag(TerrainFlag::FireContainer)
    }

    pub fn has_flammable_items(&self) -> bool {
        self.items.iter().any(|item| item.is_flammable())
    }

    /// Burned down to bare dirt with an ash pile.
    pub fn convert_to_ash(&mut self) {
        self.terrain = Terrain::Dirt;
        self.furniture = Furniture::Ash;
    }

    pub fn destroy(&mut self) {
        self.terrain = self.terrain.destroyed();
        self.furniture = Furniture::None;
    }

    pub fn make_rubble(&mut self) {
        self.terrain = Terrain::Rubble;
        self.furniture = Furniture::None;
    }

    /// Spores take root; only open ground is converted.
    pub fn spread_fungus(&mut self) {
        if matches!(
            self.terrain,
            Terrain::Dirt | Terrain::Grass | Terrain::Underbrush | Terrain::FloorWood | Terrain::FloorConcrete
        ) {
            self.terrain = Terrain::FungalFloor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;

    #[test]
    fn flags_merge_terrain_and_furniture() {
        let mut tile = Tile::new(Terrain::FloorConcrete, false);
        assert!(!tile.is_flammable());
        tile.furniture = Furniture::Bookcase;
        assert!(tile.has_flag(TerrainFlag::Flammable));
        assert!(tile.is_flammable());
        tile.furniture = Furniture::Brazier;
        assert!(tile.contains_fire());
    }

    #[test]
    fn move_cost_respects_walls_and_furniture() {
        let mut tile = Tile::new(Terrain::Dirt, true);
        assert_eq!(tile.move_cost(), 2);
        tile.furniture = Furniture::Table;
        assert_eq!(tile.move_cost(), 3);
        tile.furniture = Furniture::Bookcase;
        assert!(!tile.is_walkable());
        assert!(!Tile::new(Terrain::WallConcrete, false).is_walkable());
    }

    #[test]
    fn fence_is_permeable_but_blocking() {
        let fence = Tile::new(Terrain::ChainFence, true);
        assert!(!fence.is_walkable());
        assert!(fence.has_flag(TerrainFlag::Permeable));
    }

    #[test]
    fn burning_transitions() {
        let mut tile = Tile::new(Terrain::Grass, true);
        tile.furniture = Furniture::Bed;
        tile.convert_to_ash();
        assert_eq!(tile.terrain, Terrain::Dirt);
        assert_eq!(tile.furniture, Furniture::Ash);

        let mut wall = Tile::new(Terrain::WallWood, false);
        wall.destroy();
        assert_eq!(wall.terrain, Terrain::Rubble);
        assert!(wall.is_walkable());
    }

    #[test]
    fn fungus_only_takes_open_ground() {
        let mut grass = Tile::new(Terrain::Grass, true);
        grass.spread_fungus();
        assert_eq!(grass.terrain, Terrain::FungalFloor);
        let mut water = Tile::new(Terrain::WaterDeep, true);
        water.spread_fungus();
        assert_eq!(water.terrain, Terrain::WaterDeep);
    }

    #[test]
    fn vehicle_damage_saturates() {
        let mut part = VehiclePart {
            name: "frame".to_string(),
            hp: 25,
            covered: false,
        };
        part.damage(10);
        assert_eq!(part.hp, 15);
        part.damage(100);
        assert!(part.is_broken());
    }

    #[test]
    fn tile_serde_round_trip() {
        let mut tile = Tile::new(Terrain::FloorWood, false);
        tile.fields.add(FieldKind::Fire, 2, -30);
        tile.fields.add(FieldKind::Smoke, 1, 4);
        tile.scent = 12;
        let encoded = bincode::serialize(&tile).expect("serialize");
        let decoded: Tile = bincode::deserialize(&encoded).expect("deserialize");
        assert_eq!(tile, decoded);
        assert!(decoded.fields.has_fire());
    }
}
