use std::collections::HashMap;

use rayon::prelude::*;

use crate::field::FieldKind;
use crate::world::{Tile, World};

/// Per-tick aggregate metrics for introspection and runaway detection.
#[derive(Debug, Clone, Default)]
pub struct TickStatistics {
    pub tick: u64,
    /// Tiles holding at least one field.
    pub active_tiles: u32,
    pub total_entries: u32,
    pub kind_counts: HashMap<FieldKind, u32>,
    pub total_density: u64,
    pub fire_tiles: u32,
    pub opaque_tiles: u32,
    pub luminous_tiles: u32,
    pub creatures_alive: u32,
    pub events: u32,
    pub tick_duration_ms: f32,
}

impl TickStatistics {
    fn merge(mut self, other: TickStatistics) -> TickStatistics {
        self.active_tiles += other.active_tiles;
        self.total_entries += other.total_entries;
        self.total_density += other.total_density;
        self.fire_tiles += other.fire_tiles;
        self.opaque_tiles += other.opaque_tiles;
        self.luminous_tiles += other.luminous_tiles;
        for (kind, count) in other.kind_counts {
            *self.kind_counts.entry(kind).or_insert(0) += count;
        }
        self
    }

    fn add_tile(mut self, tile: &Tile) -> TickStatistics {
        if tile.fields.is_empty() {
            return self;
        }
        self.active_tiles += 1;
        for entry in tile.fields.iter() {
            self.total_entries += 1;
            self.total_density += entry.density().max(0) as u64;
            *self.kind_counts.entry(entry.kind()).or_insert(0) += 1;
        }
        if tile.fields.has_fire() {
            self.fire_tiles += 1;
        }
        if tile.fields.opaque_count() > 0 {
            self.opaque_tiles += 1;
        }
        if tile.fields.has_luminous() {
            self.luminous_tiles += 1;
        }
        self
    }

    /// Most common field kinds, largest first; ties broken by catalog order.
    pub fn top_kinds(&self, n: usize) -> Vec<(FieldKind, u32)> {
        let mut kinds: Vec<(FieldKind, u32)> = self.kind_counts.iter().map(|(k, c)| (*k, *c)).collect();
        kinds.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.index().cmp(&b.0.index())));
        kinds.truncate(n);
        kinds
    }
}

/// Compute statistics for the current world state after a tick.
pub fn compute_statistics(world: &World, events: u32, tick_duration_ms: f32) -> TickStatistics {
    let fields = world
        .tiles
        .par_iter()
        .fold(TickStatistics::default, TickStatistics::add_tile)
        .reduce(TickStatistics::default, TickStatistics::merge);

    TickStatistics {
        tick: world.tick_count,
        creatures_alive: world.living_creatures() as u32,
        events,
        tick_duration_ms,
        ..fields
    }
}
