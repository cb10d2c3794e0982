// Selector parsing and resolution without touching a score's notes

use ema_wasm::parse::{ParseOptions, Range, Token};
use ema_wasm::selection::{BeatBound, BeatRange};
use ema_wasm::{parse_selector, resolve, Completeness, DocumentBounds, ScoreDocument};

const PIANO_AND_VOICE: &str = r#"<score-partwise>
  <part-list>
    <score-part id="P1"><part-name>Voice</part-name></score-part>
    <score-part id="P2"><part-name>Piano</part-name></score-part>
  </part-list>
  <part id="P1">
    <measure number="17"><attributes><divisions>1</divisions></attributes><note><rest/><duration>4</duration></note></measure>
    <measure number="18"><note><rest/><duration>4</duration></note></measure>
    <measure number="19"><note><rest/><duration>4</duration></note></measure>
  </part>
  <part id="P2">
    <measure number="17"><attributes><divisions>1</divisions><staves>2</staves></attributes><note><rest/><duration>4</duration></note></measure>
    <measure number="18"><note><rest/><duration>4</duration></note></measure>
    <measure number="19"><note><rest/><duration>4</duration></note></measure>
  </part>
</score-partwise>"#;

#[test]
fn test_single_measure_two_staves() {
    let expr = parse_selector("18-18/2+4/@all").unwrap();

    assert_eq!(expr.measure_ranges, vec![Range::between(18, 18)]);
    assert_eq!(expr.staff_ranges, vec![vec![Range::point(2), Range::point(4)]]);
    assert_eq!(expr.beat_ranges, vec![vec![vec![Range::all()]]]);
    assert_eq!(expr.completeness, Completeness::Raw);
}

#[test]
fn test_canonical_form_round_trips() {
    let cases = [
        ("all/all/@all", "start-end/start-end/@start-end/raw"),
        ("18-18/2+4/@all", "18/2+4/@start-end/raw"),
        ("1-3/3,1-3,1+4/@all,@all,@all/cut", "1-3/3,1-3,1+4/@start-end,@start-end,@start-end/cut"),
        ("2/1+2/@1-2@3-end+@2.5-end", "2/1+2/@1-2@3-end+@2.5-end/raw"),
        ("1/1/@1-1.50/nospace", "1/1/@1-1.5/nospace"),
    ];

    for (selector, canonical) in cases {
        let expr = parse_selector(selector).unwrap();
        assert_eq!(expr.to_string(), canonical, "canonical form of {}", selector);
        assert_eq!(parse_selector(canonical).unwrap(), expr, "reparse of {}", canonical);
    }
}

#[test]
fn test_unknown_completeness_is_raw() {
    let expr = parse_selector("1/1/@all/sideways").unwrap();
    assert_eq!(expr.completeness, Completeness::Raw);
}

#[test]
fn test_malformed_selectors() {
    for selector in ["", "1/1", "1/1/@all/cut/extra", "a/1/@all", "1/1/all", "1/1/@x", "1-2-3/1/@all", "end-3/1/@all", "1/all-2/@all", "1/1/@0-2"] {
        let err = parse_selector(selector).unwrap_err();
        assert_eq!(err.kind(), "malformed_selector", "selector '{}'", selector);
    }
}

#[test]
fn test_merge_option() {
    let options = ParseOptions {
        merge_measure_ranges: true,
    };
    let expr = ema_wasm::parse::parse_with("1-2,3,5/all/@all", options).unwrap();
    assert_eq!(expr.measure_ranges, vec![Range::between(1, 3), Range::point(5)]);

    // Aligned groups keep their measure ranges apart
    let expr = ema_wasm::parse::parse_with("1-2,3/1,2/@all", options).unwrap();
    assert_eq!(expr.measure_ranges.len(), 2);
}

#[test]
fn test_bounds_from_score() {
    let document = ScoreDocument::parse(PIANO_AND_VOICE).unwrap();
    let bounds = DocumentBounds::scan(&document).unwrap();
    assert_eq!(bounds, DocumentBounds::contiguous(17, 19, 3));
}

#[test]
fn test_start_and_end_follow_the_score() {
    let document = ScoreDocument::parse(PIANO_AND_VOICE).unwrap();
    let bounds = DocumentBounds::scan(&document).unwrap();

    let selection = resolve(&bounds, &parse_selector("start-18/end/@2-end").unwrap()).unwrap();
    let measures: Vec<u32> = selection.measures().map(|(number, _)| number).collect();
    assert_eq!(measures, vec![17, 18]);
    assert_eq!(selection.selected_staves().iter().copied().collect::<Vec<_>>(), vec![3]);

    let two = ema_wasm::parse::BeatPosition::from_integer(2);
    assert_eq!(selection.beat_ranges(18, 3), &[BeatRange::new(two, BeatBound::End)]);
}

#[test]
fn test_resolved_ranges_append() {
    let bounds = DocumentBounds::contiguous(1, 4, 2);
    let selection = resolve(&bounds, &parse_selector("1,1/1,1/@1-2,@3-4").unwrap()).unwrap();
    assert_eq!(selection.beat_ranges(1, 1).len(), 2);
    assert!(selection.beat_ranges(1, 2).is_empty());
}

#[test]
fn test_end_end_beats_select_nothing() {
    let bounds = DocumentBounds::contiguous(1, 2, 1);
    let expr = parse_selector("1/1/@end-end").unwrap();
    assert_eq!(expr.beat_ranges[0][0][0].start, Token::End);

    let selection = resolve(&bounds, &expr).unwrap();
    assert!(selection.beat_ranges(1, 1).is_empty());
    assert!(selection.selected_staves().contains(&1));
}

#[test]
fn test_far_apart_measure_numbers_select_only_existing_measures() {
    let document = ScoreDocument::parse(
        r#"<score-partwise><part id="P1">
  <measure number="1"><note><rest/><duration>4</duration></note></measure>
  <measure number="4000000000"><note><rest/><duration>4</duration></note></measure>
</part></score-partwise>"#,
    )
    .unwrap();
    let bounds = DocumentBounds::scan(&document).unwrap();

    let selection = resolve(&bounds, &parse_selector("start-end/1/@all").unwrap()).unwrap();
    let measures: Vec<u32> = selection.measures().map(|(number, _)| number).collect();
    assert_eq!(measures, vec![1, 4_000_000_000]);
}
