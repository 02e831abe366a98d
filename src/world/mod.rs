pub mod creature;
pub mod generation;
pub mod grid;
pub mod item;
pub mod tile;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::generation::GenerationParams;
use crate::field::{FieldEntry, FieldKind, FieldSet};
pub use creature::{Creature, CreatureKind};
pub use grid::Point;
pub use item::Item;
pub use tile::{Furniture, Terrain, TerrainFlag, Tile};

/// A rectangular map of tiles plus everything living on it.
/// Tiles are stored row-major: index = y * width + x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub id: Uuid,
    pub name: String,
    pub created_at: String,
    pub tick_count: u64,
    pub width: u32,
    pub height: u32,
    pub generation_params: GenerationParams,
    pub snapshot_path: Option<String>,
    pub tiles: Vec<Tile>,
    pub creatures: Vec<Creature>,
    pub next_creature_id: u32,
    /// Set when a field that blocks sight is added; consumers clear it.
    #[serde(skip)]
    pub transparency_dirty: bool,
}

impl World {
    /// An empty outdoor dirt map, mostly for tests and tools.
    pub fn blank(width: u32, height: u32) -> Self {
        let params = GenerationParams {
            seed: 1,
            width,
            height,
            ..GenerationParams::default()
        };
        World {
            id: Uuid::nil(),
            name: format!("Blank-{}x{}", width, height),
            created_at: "0".to_string(),
            tick_count: 0,
            width,
            height,
            generation_params: params,
            snapshot_path: None,
            tiles: vec![Tile::new(Terrain::Dirt, true); (width * height) as usize],
            creatures: Vec::new(),
            next_creature_id: 1,
            transparency_dirty: false,
        }
    }

    pub fn seed(&self) -> u64 {
        self.generation_params.seed
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width && (p.y as u32) < self.height
    }

    fn index(&self, p: Point) -> Option<usize> {
        if self.in_bounds(p) {
            Some(p.y as usize * self.width as usize + p.x as usize)
        } else {
            None
        }
    }

    pub fn point_of(&self, index: usize) -> Point {
        let w = self.width as usize;
        Point::new((index % w) as i32, (index / w) as i32)
    }

    pub fn tile(&self, p: Point) -> Option<&Tile> {
        self.index(p).map(|i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, p: Point) -> Option<&mut Tile> {
        self.index(p).map(move |i| &mut self.tiles[i])
    }

    // === Field access ===

    pub fn field_at(&self, p: Point) -> Option<&FieldSet> {
        self.tile(p).map(|t| &t.fields)
    }

    pub fn field_at_mut(&mut self, p: Point) -> Option<&mut FieldSet> {
        self.tile_mut(p).map(|t| &mut t.fields)
    }

    pub fn get_field(&self, p: Point, kind: FieldKind) -> Option<&FieldEntry> {
        self.field_at(p).and_then(|f| f.find(kind))
    }

    pub fn get_field_mut(&mut self, p: Point, kind: FieldKind) -> Option<&mut FieldEntry> {
        self.field_at_mut(p).and_then(|f| f.find_mut(kind))
    }

    pub fn has_field(&self, p: Point, kind: FieldKind) -> bool {
        self.get_field(p, kind).is_some()
    }

    /// Density of `kind` at `p`, or 0 when absent.
    pub fn field_density(&self, p: Point, kind: FieldKind) -> i32 {
        self.get_field(p, kind).map_or(0, |e| e.density())
    }

    /// Add or merge a field. False when `p` is off the map or the kind
    /// was already present (its density was raised instead).
    pub fn add_field(&mut self, p: Point, kind: FieldKind, density: i32, age: i32) -> bool {
        let Some(fields) = self.field_at_mut(p) else {
            return false;
        };
        let created = fields.add(kind, density, age);
        if kind.def().can_obscure() {
            self.transparency_dirty = true;
        }
        created
    }

    pub fn remove_field(&mut self, p: Point, kind: FieldKind) -> bool {
        let removed = self.field_at_mut(p).is_some_and(|f| f.remove(kind));
        if removed && kind.def().can_obscure() {
            self.transparency_dirty = true;
        }
        removed
    }

    pub fn field_count(&self, p: Point) -> usize {
        self.field_at(p).map_or(0, |f| f.len())
    }

    /// Points of every tile currently holding at least one field.
    pub fn active_points(&self) -> Vec<Point> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.fields.is_empty())
            .map(|(i, _)| self.point_of(i))
            .collect()
    }

    // === Terrain queries ===

    /// Movement cost; 0 for impassable or off-map squares.
    pub fn move_cost(&self, p: Point) -> i32 {
        self.tile(p).map_or(0, |t| t.move_cost())
    }

    pub fn has_flag(&self, p: Point, flag: TerrainFlag) -> bool {
        self.tile(p).is_some_and(|t| t.has_flag(flag))
    }

    pub fn is_outside(&self, p: Point) -> bool {
        self.tile(p).is_some_and(|t| t.outside)
    }

    /// Sight passes through the terrain and whatever fields hang over it.
    pub fn is_see_through(&self, p: Point) -> bool {
        self.tile(p)
            .is_some_and(|t| t.is_transparent() && t.fields.transparency() > 0.0)
    }

    /// True when `to` is within `range` and every square strictly between
    /// the two points is see-through.
    pub fn clear_path(&self, from: Point, to: Point, range: i32) -> bool {
        if grid::rl_dist(from, to) > range || !self.in_bounds(to) {
            return false;
        }
        let line = grid::line_to(from, to);
        line.iter()
            .take(line.len().saturating_sub(1))
            .all(|&p| self.is_see_through(p))
    }

    // === Items ===

    pub fn spawn_item(&mut self, p: Point, mut item: Item) -> bool {
        let tick = self.tick_count;
        match self.tile_mut(p) {
            Some(tile) => {
                item.bday = tick;
                tile.items.push(item);
                true
            }
            None => false,
        }
    }

    // === Creatures ===

    /// Index of the living creature standing on `p`.
    pub fn creature_at(&self, p: Point) -> Option<usize> {
        self.creatures.iter().position(|c| !c.dead && c.pos == p)
    }

    pub fn player_index(&self) -> Option<usize> {
        self.creatures.iter().position(|c| c.is_player())
    }

    pub fn add_creature(&mut self, mut creature: Creature) -> u32 {
        let id = self.next_creature_id;
        self.next_creature_id += 1;
        creature.id = id;
        self.creatures.push(creature);
        id
    }

    pub fn living_creatures(&self) -> usize {
        self.creatures.iter().filter(|c| !c.dead).count()
    }
}
