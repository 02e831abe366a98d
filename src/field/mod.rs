pub mod catalog;
pub mod entry;
pub mod set;

pub use catalog::{kind_from_name, lookup, Color, DecayType, FieldDef, FieldKind, FieldVariant};
pub use entry::{decay_chance, FieldEntry, Protection, MAX_DENSITY, MIN_DENSITY};
pub use set::{FieldCursor, FieldSet};
