//! EMA selection for MusicXML
//!
//! Parses EMA selectors (`measures/staves/beats[/completeness]`), resolves
//! them against a `score-partwise` document and slices the document down to
//! the selection: unselected measures and parts are removed, unselected notes
//! become rests, and in `cut` mode notes are trimmed to the selected beats.

pub mod api;
pub mod errors;
pub mod musicxml;
pub mod parse;
pub mod selection;
pub mod settings;
pub mod slicer;

pub use errors::{EmaError, Result};
pub use musicxml::ScoreDocument;
pub use parse::{parse as parse_selector, Completeness, RawExpression};
pub use selection::{resolve, DocumentBounds, ResolvedSelection};
pub use settings::{BoundsPolicy, SliceSettings};
pub use slicer::{slice_score, SliceReport};

use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Sliced document plus what changed
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SliceResult {
    pub musicxml: String,
    pub report: SliceReport,
}

/// Slice a MusicXML document with an EMA selector
///
/// ```
/// let xml = r#"<score-partwise><part-list><score-part id="P1"/></part-list>
/// <part id="P1">
///   <measure number="1"><attributes><divisions>1</divisions></attributes><note><pitch><step>C</step><octave>4</octave></pitch><duration>4</duration></note></measure>
///   <measure number="2"><note><pitch><step>D</step><octave>4</octave></pitch><duration>4</duration></note></measure>
/// </part></score-partwise>"#;
///
/// let result = ema_wasm::slice_musicxml(xml, "2/1/@all", None).unwrap();
/// assert_eq!(result.report.measures_kept, 1);
/// assert!(!result.musicxml.contains("<step>C</step>"));
/// assert!(result.musicxml.contains("<divisions>1</divisions>"));
/// ```
pub fn slice_musicxml(musicxml: &str, selector: &str, settings: Option<SliceSettings>) -> Result<SliceResult> {
    let settings = settings.unwrap_or_default();

    let raw = parse::parse_with(selector, settings.parse_options())?;
    let mut document = ScoreDocument::parse(musicxml)?;
    let bounds = DocumentBounds::scan(&document)?;

    let mut selection = selection::resolve_with(&bounds, &raw, settings.bounds_policy)?;
    if let Some(completeness) = settings.completeness_override {
        selection = selection.with_completeness(completeness);
    }

    let report = slicer::slice_score_with(&mut document, &selection, settings.bounds_policy)?;
    let musicxml = document.to_xml_string()?;

    Ok(SliceResult { musicxml, report })
}

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(feature = "console_log")]
    console_log::init_with_level(log::Level::Debug).expect("failed to initialize logger");

    log::info!("EMA slicer WASM module initialized");
}
