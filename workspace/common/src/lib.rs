//! Transport-layer primitives shared across the workspace.
//! Entity identifiers and the two-state reference type live here so both
//! the relation layer and the HTTP handlers agree on their shapes.

mod ids;
mod refs;

pub use ids::{is_valid_entity_id, new_entity_id};
pub use refs::ResourceRef;
