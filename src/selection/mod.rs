//! Selection resolution
//!
//! `(DocumentBounds, RawExpression) → ResolvedSelection`

pub mod bounds;
pub mod broadcast;
pub mod resolve;

pub use bounds::DocumentBounds;
pub use broadcast::broadcast_index;
pub use resolve::{resolve, resolve_with, BeatBound, BeatRange, MeasureSelection, ResolvedSelection};
