//! WASM build test
//!
//! Checks the JavaScript-facing exports in a browser, including the error
//! paths (a `JsValue` error cannot be built in native tests).

use ema_wasm::api::{get_score_summary, parse_ema_selector, slice_musicxml};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const SCORE: &str = r#"<score-partwise>
  <part-list><score-part id="P1"><part-name>Voice</part-name></score-part></part-list>
  <part id="P1">
    <measure number="1">
      <attributes><divisions>4</divisions><time><beats>2</beats><beat-type>4</beat-type></time></attributes>
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>8</duration><type>half</type></note>
    </measure>
    <measure number="2">
      <note><pitch><step>D</step><octave>4</octave></pitch><duration>8</duration><type>half</type></note>
    </measure>
  </part>
</score-partwise>"#;

fn error_text(value: wasm_bindgen::JsValue) -> String {
    value.as_string().unwrap_or_default()
}

#[wasm_bindgen_test]
fn test_slice_musicxml() {
    let json = slice_musicxml(SCORE.to_string(), "2/1/@all".to_string(), None).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["report"]["measures_kept"], 1);
    let musicxml = value["musicxml"].as_str().unwrap();
    assert!(!musicxml.contains("<step>C</step>"));
    assert!(musicxml.contains("<divisions>4</divisions>"));
}

#[wasm_bindgen_test]
fn test_slice_with_clamp_settings() {
    let settings = Some(r#"{"bounds_policy":"clamp"}"#.to_string());
    let json = slice_musicxml(SCORE.to_string(), "2-9/1/@all".to_string(), settings).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["report"]["measures_kept"], 1);
}

#[wasm_bindgen_test]
fn test_out_of_bounds_error_names_kind() {
    let err = slice_musicxml(SCORE.to_string(), "3/1/@all".to_string(), None).unwrap_err();
    assert!(error_text(err).starts_with("out_of_bounds: "));
}

#[wasm_bindgen_test]
fn test_trim_failure_error() {
    let err = slice_musicxml(SCORE.to_string(), "1/1/@1-1.25/cut".to_string(), None).unwrap_err();
    let text = error_text(err);
    assert!(text.starts_with("trim_arithmetic_failure: "), "{}", text);
}

#[wasm_bindgen_test]
fn test_bad_settings_json() {
    let err = slice_musicxml(SCORE.to_string(), "1/1/@all".to_string(), Some("{".to_string())).unwrap_err();
    assert!(error_text(err).starts_with("Settings parse error"));
}

#[wasm_bindgen_test]
fn test_parse_ema_selector() {
    let json = parse_ema_selector("1-3/3,1-3,1+4/@all,@all,@all".to_string()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["canonical"], "1-3/3,1-3,1+4/@start-end,@start-end,@start-end/raw");
    assert_eq!(value["expression"]["staff_ranges"].as_array().unwrap().len(), 3);

    let err = parse_ema_selector("1/1".to_string()).unwrap_err();
    assert!(error_text(err).starts_with("malformed_selector: "));
}

#[wasm_bindgen_test]
fn test_get_score_summary() {
    let json = get_score_summary(SCORE.to_string()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["parts"][0]["measures"], serde_json::json!(["1", "2"]));
    assert_eq!(value["parts"][0]["notes"], 2);

    let err = get_score_summary("<score-partwise>".to_string()).unwrap_err();
    assert!(error_text(err).starts_with("malformed_document: "));
}
