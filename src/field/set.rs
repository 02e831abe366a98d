use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::warn;

use crate::field::catalog::FieldKind;
use crate::field::entry::{FieldEntry, Protection, MAX_DENSITY, MIN_DENSITY};

/// Position inside a [`FieldSet`] during a traversal that may mutate the set.
///
/// Insertions append, so they never move a cursor. Removals go through
/// [`FieldSet::remove_at`], which hands back a cursor that still points at
/// the next unvisited entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldCursor {
    index: usize,
}

impl FieldCursor {
    pub fn index(self) -> usize {
        self.index
    }

    pub fn next(self) -> FieldCursor {
        FieldCursor {
            index: self.index + 1,
        }
    }
}

/// All hazards on one tile: at most one entry per kind, plus aggregates that
/// are kept in step with membership on every insert and removal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldSet {
    entries: SmallVec<[FieldEntry; 4]>,
    draw_symbol: Option<FieldKind>,
    masks_scent: bool,
    has_fire: bool,
    opaque_count: u8,
    luminous_count: u8,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldEntry> {
        self.entries.iter()
    }

    pub fn kinds(&self) -> SmallVec<[FieldKind; 4]> {
        self.entries.iter().map(|e| e.kind()).collect()
    }

    pub fn find(&self, kind: FieldKind) -> Option<&FieldEntry> {
        self.entries.iter().find(|e| e.kind() == kind)
    }

    pub fn find_mut(&mut self, kind: FieldKind) -> Option<&mut FieldEntry> {
        self.entries.iter_mut().find(|e| e.kind() == kind)
    }

    pub fn contains(&self, kind: FieldKind) -> bool {
        self.find(kind).is_some()
    }

    /// Cursor positioned on the entry of `kind`.
    pub fn cursor_of(&self, kind: FieldKind) -> Option<FieldCursor> {
        self.entries
            .iter()
            .position(|e| e.kind() == kind)
            .map(|index| FieldCursor { index })
    }

    /// Entry under a traversal cursor, if the cursor is still in range.
    pub fn at(&self, cursor: FieldCursor) -> Option<&FieldEntry> {
        self.entries.get(cursor.index)
    }

    pub fn at_mut(&mut self, cursor: FieldCursor) -> Option<&mut FieldEntry> {
        self.entries.get_mut(cursor.index)
    }

    /// Insert `kind`, or merge `density` into the existing entry of that kind.
    ///
    /// `age` only applies to a newly created entry. Returns `true` when a new
    /// entry was created and `false` when an existing one absorbed the density.
    pub fn add(&mut self, kind: FieldKind, density: i32, age: i32) -> bool {
        if let Some(entry) = self.find_mut(kind) {
            entry.intensify(density);
            return false;
        }
        self.entries.push(FieldEntry::new(kind, density, age));
        self.note_added(kind);
        true
    }

    /// Remove the entry of `kind`. Returns whether anything was removed.
    pub fn remove(&mut self, kind: FieldKind) -> bool {
        self.remove_at(kind, FieldCursor::default()).1
    }

    /// Remove the entry of `kind` while a traversal holds `cursor`.
    ///
    /// The returned cursor points at the entry that should be visited next:
    /// removing the entry under the cursor leaves the cursor on its successor,
    /// removing an earlier entry shifts the cursor back by one.
    pub fn remove_at(&mut self, kind: FieldKind, cursor: FieldCursor) -> (FieldCursor, bool) {
        let Some(index) = self.entries.iter().position(|e| e.kind() == kind) else {
            return (cursor, false);
        };
        self.entries.remove(index);
        self.note_removed(kind);
        let cursor = if index < cursor.index {
            FieldCursor {
                index: cursor.index - 1,
            }
        } else {
            cursor
        };
        (cursor, true)
    }

    pub fn clear(&mut self) {
        *self = FieldSet::default();
    }

    /// Kind to draw for this tile; [`FieldKind::Null`] when empty.
    pub fn symbol(&self) -> FieldKind {
        self.draw_symbol.unwrap_or(FieldKind::Null)
    }

    /// True while slime masks the tile's scent.
    pub fn masks_scent(&self) -> bool {
        self.masks_scent
    }

    pub fn has_fire(&self) -> bool {
        self.has_fire
    }

    /// True when no present kind can obscure vision. This is a conservative
    /// per-kind bound: thin smoke counts as opaque even though its own tier
    /// is see-through, so check entry transparency for the exact answer.
    pub fn is_transparent(&self) -> bool {
        self.opaque_count == 0
    }

    pub fn has_luminous(&self) -> bool {
        self.luminous_count > 0
    }

    pub fn opaque_count(&self) -> usize {
        self.opaque_count as usize
    }

    pub fn luminous_count(&self) -> usize {
        self.luminous_count as usize
    }

    pub fn is_dangerous(&self) -> bool {
        self.entries.iter().any(|e| e.is_dangerous())
    }

    pub fn is_dangerous_for(&self, subject: &Protection) -> bool {
        self.entries.iter().any(|e| e.is_dangerous_for(subject))
    }

    /// Comma separated names of the entries that endanger `subject`.
    pub fn danger_description(&self, subject: &Protection) -> String {
        self.entries
            .iter()
            .filter(|e| e.is_dangerous_for(subject))
            .map(|e| e.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Product of every entry's transparency, in `[0, 1]`.
    pub fn transparency(&self) -> f32 {
        let mut value = 1.0_f32;
        for entry in &self.entries {
            if value == 0.0 {
                return 0.0;
            }
            value *= entry.transparency();
        }
        value
    }

    /// Brightest luminance among the entries.
    pub fn luminance(&self) -> f32 {
        self.entries
            .iter()
            .map(|e| e.luminance())
            .fold(0.0_f32, f32::max)
    }

    /// Age every entry by `amount` scaled down by its decay class.
    /// Classes with a zero divisor are skipped.
    pub fn decay(&mut self, amount: i32) {
        for entry in self.entries.iter_mut() {
            let divisor = entry.def().decay.divisor();
            if divisor <= 0 {
                continue;
            }
            entry.decay(amount / divisor);
        }
    }

    /// Drop every entry that has been marked dead. Returns how many went.
    pub fn collect_dead(&mut self) -> usize {
        let dead: SmallVec<[FieldKind; 4]> = self
            .entries
            .iter()
            .filter(|e| !e.is_alive())
            .map(|e| e.kind())
            .collect();
        for kind in &dead {
            self.remove(*kind);
        }
        dead.len()
    }

    /// Ordered `(kind index, density, age)` triples for the live entries.
    pub fn to_triples(&self) -> Vec<(u32, i32, i32)> {
        self.entries
            .iter()
            .filter(|e| e.is_alive())
            .map(|e| (e.kind().index() as u32, e.density(), e.age()))
            .collect()
    }

    /// Rebuild a set from encoded triples. Unknown kind indices and
    /// duplicates are reported and skipped; densities are clamped.
    pub fn from_triples(triples: &[(u32, i32, i32)]) -> FieldSet {
        let mut set = FieldSet::new();
        for &(index, density, age) in triples {
            let Some(kind) = FieldKind::from_index(index as usize) else {
                warn!(index, "unknown field kind index in encoded field");
                continue;
            };
            if set.contains(kind) {
                warn!(kind = %kind, "duplicate field kind in encoded field");
                continue;
            }
            if !(MIN_DENSITY..=MAX_DENSITY).contains(&density) {
                warn!(kind = %kind, density, "encoded field density out of range");
            }
            set.add(kind, density.clamp(MIN_DENSITY, MAX_DENSITY), age);
        }
        set
    }

    fn note_added(&mut self, kind: FieldKind) {
        if self
            .draw_symbol
            .is_none_or(|shown| kind.def().priority > shown.def().priority)
        {
            self.draw_symbol = Some(kind);
        }
        match kind {
            FieldKind::Slime => self.masks_scent = true,
            FieldKind::Fire => self.has_fire = true,
            _ => {}
        }
        let def = kind.def();
        if def.can_obscure() {
            self.opaque_count += 1;
        }
        if def.can_glow() {
            self.luminous_count += 1;
        }
    }

    fn note_removed(&mut self, kind: FieldKind) {
        if self.draw_symbol == Some(kind) {
            self.draw_symbol = None;
            for entry in &self.entries {
                if self
                    .draw_symbol
                    .is_none_or(|shown| entry.def().priority > shown.def().priority)
                {
                    self.draw_symbol = Some(entry.kind());
                }
            }
        }
        match kind {
            FieldKind::Slime => self.masks_scent = false,
            FieldKind::Fire => self.has_fire = false,
            _ => {}
        }
        let def = kind.def();
        if def.can_obscure() {
            self.opaque_count = self.opaque_count.saturating_sub(1);
        }
        if def.can_glow() {
            self.luminous_count = self.luminous_count.saturating_sub(1);
        }
    }
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.to_triples())
    }
}

impl<'de> Deserialize<'de> for FieldSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let triples = Vec::<(u32, i32, i32)>::deserialize(deserializer)?;
        Ok(FieldSet::from_triples(&triples))
    }
}
