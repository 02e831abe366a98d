use tracing::{debug, warn};

use crate::field::{FieldCursor, FieldEntry, FieldKind};
use crate::rng::SimRng;
use crate::simulation::effects::FieldEvent;
use crate::simulation::rules;
use crate::world::{Point, World};

/// Mutable view of the world handed to a transition rule.
///
/// The rule runs for the entry under the cursor at `pos`. Every change to
/// that tile's own field set must go through [`TickContext::remove_field`]
/// so the cursor stays valid; other tiles may be edited through `world`.
pub struct TickContext<'a> {
    pub world: &'a mut World,
    pub rng: &'a mut SimRng,
    pub events: Vec<FieldEvent>,
    pos: Point,
    cursor: FieldCursor,
    removed_self: bool,
}

impl<'a> TickContext<'a> {
    pub fn new(world: &'a mut World, rng: &'a mut SimRng) -> Self {
        Self {
            world,
            rng,
            events: Vec::new(),
            pos: Point::default(),
            cursor: FieldCursor::default(),
            removed_self: false,
        }
    }

    /// Point the context at the entry of `kind` on `p`, as the field pass
    /// does before running that entry's rule.
    #[cfg(test)]
    pub(crate) fn focus(&mut self, p: Point, kind: FieldKind) {
        self.pos = p;
        self.removed_self = false;
        self.cursor = self
            .world
            .field_at(p)
            .and_then(|f| f.cursor_of(kind))
            .unwrap_or_default();
    }

    /// Tile whose entry is being processed.
    pub fn pos(&self) -> Point {
        self.pos
    }

    fn current(&self) -> Option<&FieldEntry> {
        if self.removed_self {
            return None;
        }
        self.world.field_at(self.pos).and_then(|f| f.at(self.cursor))
    }

    fn current_mut(&mut self) -> Option<&mut FieldEntry> {
        if self.removed_self {
            return None;
        }
        let cursor = self.cursor;
        self.world.field_at_mut(self.pos).and_then(|f| f.at_mut(cursor))
    }

    // === Current entry ===

    pub fn density(&self) -> i32 {
        self.current().map_or(0, |e| e.density())
    }

    pub fn age(&self) -> i32 {
        self.current().map_or(0, |e| e.age())
    }

    pub fn is_alive(&self) -> bool {
        self.current().is_some_and(|e| e.is_alive())
    }

    pub fn decay(&mut self, delta: i32) {
        if let Some(e) = self.current_mut() {
            e.decay(delta);
        }
    }

    pub fn intensify(&mut self, delta: i32) -> bool {
        self.current_mut().is_some_and(|e| e.intensify(delta))
    }

    pub fn nullify(&mut self) {
        if let Some(e) = self.current_mut() {
            e.nullify();
        }
    }

    pub fn maximize(&mut self) {
        if let Some(e) = self.current_mut() {
            e.maximize();
        }
    }

    // === Field edits ===

    pub fn add_field(&mut self, p: Point, kind: FieldKind, density: i32, age: i32) -> bool {
        self.world.add_field(p, kind, density, age)
    }

    /// Remove a field anywhere on the map, keeping the traversal cursor
    /// valid when the edit lands on the tile being processed.
    pub fn remove_field(&mut self, p: Point, kind: FieldKind) -> bool {
        if p != self.pos {
            return self.world.remove_field(p, kind);
        }
        let current_kind = self.current().map(|e| e.kind());
        let cursor = self.cursor;
        let Some(fields) = self.world.field_at_mut(p) else {
            return false;
        };
        let (next, removed) = fields.remove_at(kind, cursor);
        self.cursor = next;
        if removed {
            if current_kind == Some(kind) {
                self.removed_self = true;
            }
            if kind.def().can_obscure() {
                self.world.transparency_dirty = true;
            }
        }
        removed
    }

    /// Remove the entry being processed. Its generic aging is skipped.
    pub fn remove_self(&mut self) {
        if let Some(kind) = self.current().map(|e| e.kind()) {
            self.remove_field(self.pos, kind);
        }
    }

    pub fn emit(&mut self, event: FieldEvent) {
        self.events.push(event);
    }

    pub fn message(&mut self, text: impl Into<String>) {
        self.events.push(FieldEvent::Message(text.into()));
    }
}

/// Counters from one pass over the field layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldPassSummary {
    pub tiles_visited: usize,
    pub entries_processed: usize,
    pub entries_expired: usize,
}

/// Run every field transition rule once across the map.
///
/// Tiles are visited row by row; entries on a tile in storage order. Entries
/// with age 0 are newborn: their rule is skipped this tick, but they still age.
pub fn process_fields(ctx: &mut TickContext) -> FieldPassSummary {
    let mut summary = FieldPassSummary::default();
    for p in ctx.world.active_points() {
        summary.tiles_visited += 1;
        process_tile(ctx, p, &mut summary);
    }
    // Entries killed on tiles that had already been visited.
    for tile in ctx.world.tiles.iter_mut() {
        summary.entries_expired += tile.fields.collect_dead();
    }
    ctx.world.transparency_dirty |= summary.tiles_visited > 0;
    debug!(
        tiles = summary.tiles_visited,
        processed = summary.entries_processed,
        expired = summary.entries_expired,
        "field pass complete"
    );
    summary
}

fn process_tile(ctx: &mut TickContext, p: Point, summary: &mut FieldPassSummary) {
    ctx.pos = p;
    ctx.cursor = FieldCursor::default();
    loop {
        ctx.removed_self = false;
        let Some(entry) = ctx.current() else {
            break;
        };
        let (kind, density, age, alive) = (entry.kind(), entry.density(), entry.age(), entry.is_alive());
        if !(1..=3).contains(&density) {
            warn!(kind = %kind, density, x = p.x, y = p.y, "field density out of range");
        }
        summary.entries_processed += 1;

        if age != 0 && alive {
            rules::apply(ctx, kind);
        }
        if ctx.removed_self {
            continue;
        }

        let cursor = ctx.cursor;
        let rng = &mut *ctx.rng;
        let alive = ctx
            .world
            .field_at_mut(p)
            .and_then(|f| f.at_mut(cursor))
            .is_some_and(|e| e.update(rng));
        if !alive {
            summary.entries_expired += 1;
            ctx.remove_field(p, kind);
            continue;
        }
        ctx.cursor = ctx.cursor.next();
    }
}
