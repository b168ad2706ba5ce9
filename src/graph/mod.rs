//! Compatibility graph construction.
//!
//! Vertices are original couples (or lone chain-starting donors); a directed
//! edge means the donor of one couple can viably give to the recipient of
//! another. [`builder::GraphBuilder`] resolves crossmatches and scores all
//! combinations in parallel, applies manual overrides and country rules,
//! and emits edges in a stable order for reproducible solver tie-breaks.

pub mod builder;
pub mod model;

pub use builder::GraphBuilder;
pub use model::{CompatibilityEdge, CompatibilityGraph, PairVertex};
