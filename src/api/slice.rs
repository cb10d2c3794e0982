//! EMA slicing exports
//!
//! Strings in, JSON strings out, the same contract as the rest of the API.

use crate::api::helpers::{parse_settings, to_js_error, to_json};
use crate::musicxml::summary::summarize;
use crate::parse::{parse, RawExpression};
use crate::settings::SliceSettings;
use crate::{slice_musicxml as slice, wasm_info, wasm_log, wasm_warn};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Parsed selector as returned to JavaScript
#[derive(Debug, Serialize)]
pub struct ParsedSelector {
    /// Canonical selector text (`all` spelled `start-end`, completeness explicit)
    pub canonical: String,
    pub expression: RawExpression,
}

/// Slice a MusicXML document to an EMA selection
///
/// # Parameters
/// * `musicxml` - MusicXML `score-partwise` document as a string
/// * `selector` - EMA selector, e.g. `1-3/1+2/@1-2.5/cut`
/// * `settings_json` - Optional JSON slice settings (null for defaults)
///
/// # Returns
/// JSON string containing:
/// - `musicxml`: the sliced document
/// - `report`: counts of kept/removed parts, kept measures, blanked and trimmed notes
///
/// # Example Settings JSON
/// ```json
/// {
///   "bounds_policy": "clamp",
///   "merge_measure_ranges": true,
///   "completeness_override": "cut"
/// }
/// ```
#[wasm_bindgen(js_name = sliceMusicXML)]
pub fn slice_musicxml(musicxml: String, selector: String, settings_json: Option<String>) -> Result<String, JsValue> {
    wasm_info!("sliceMusicXML called: selector '{}', {} bytes", selector, musicxml.len());

    let settings: SliceSettings = parse_settings(settings_json)?;
    let result = slice(&musicxml, &selector, Some(settings)).map_err(|e| to_js_error("sliceMusicXML", &e))?;

    wasm_log!(
        "  kept {} part(s) / {} measure(s), blanked {}, trimmed {}",
        result.report.parts_kept,
        result.report.measures_kept,
        result.report.notes_blanked,
        result.report.notes_trimmed
    );
    if result.report.parts_kept == 0 {
        wasm_warn!("selector '{}' kept no parts; returning an empty score", selector);
    }
    let json = to_json(&result, "Result serialization error")?;
    wasm_info!("sliceMusicXML completed successfully");
    Ok(json)
}

/// Parse an EMA selector without a score
///
/// Returns JSON `{ "canonical": "...", "expression": {...} }`.
#[wasm_bindgen(js_name = parseEmaSelector)]
pub fn parse_ema_selector(selector: String) -> Result<String, JsValue> {
    wasm_log!("parseEmaSelector called: '{}'", selector);

    let expression = parse(&selector).map_err(|e| to_js_error("parseEmaSelector", &e))?;
    let parsed = ParsedSelector {
        canonical: expression.to_string(),
        expression,
    };
    to_json(&parsed, "Result serialization error")
}

/// Summarize a MusicXML document: parts, staves, measure numbers, note and rest counts
#[wasm_bindgen(js_name = getScoreSummary)]
pub fn get_score_summary(musicxml: String) -> Result<String, JsValue> {
    wasm_log!("getScoreSummary called: {} bytes", musicxml.len());

    let summary = summarize(&musicxml).map_err(|e| to_js_error("getScoreSummary", &e))?;
    wasm_info!(
        "  {} part(s), {} staves, {} notes",
        summary.parts.len(),
        summary.staff_count(),
        summary.notes()
    );
    to_json(&summary, "Result serialization error")
}
