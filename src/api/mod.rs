//! EMA slicer WASM API
//!
//! JavaScript-facing exports. Documents, selectors and settings cross the
//! boundary as strings; results come back as JSON strings.
//!
//! # Module Structure
//!
//! - `helpers`: logging macros, error and JSON conversions
//! - `slice`: `sliceMusicXML`, `parseEmaSelector`, `getScoreSummary`

pub mod helpers;
pub mod slice;

pub use slice::{get_score_summary, parse_ema_selector, slice_musicxml};
