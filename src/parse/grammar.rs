//! Selector grammar
//!
//! ```text
//! selector := measures "/" staves "/" beats ["/" completeness]
//! measures := range ("," range)*
//! staves   := range ("+" range)* ("," ...)*
//! beats    := ("@" range)+ ("+" ...)* ("," ...)*
//! range    := token ["-" token]
//! ```

use super::expression::{BeatTerm, Completeness, ParseOptions, RawExpression};
use super::tokens::{BeatPosition, Range, RangeUnit, Token, TokenValue};
use crate::errors::{EmaError, Result};

/// Parse a selector string with default options
pub fn parse(selector: &str) -> Result<RawExpression> {
    parse_with(selector, ParseOptions::default())
}

/// Parse a selector string
pub fn parse_with(selector: &str, options: ParseOptions) -> Result<RawExpression> {
    log::debug!("parse selector '{}'", selector);

    let fields: Vec<&str> = selector.split('/').collect();
    let (measures, staves, beats, completeness) = match fields.as_slice() {
        [measures, staves, beats] => (*measures, *staves, *beats, None),
        [measures, staves, beats, completeness] => (*measures, *staves, *beats, Some(*completeness)),
        _ => {
            return Err(EmaError::MalformedSelector(format!(
                "expected measures/staves/beats[/completeness], found {} field(s) in '{}'",
                fields.len(),
                selector
            )))
        }
    };

    let mut measure_ranges = parse_range_list(measures.split(','), RangeUnit::Measure)?;

    let staff_ranges = staves
        .split(',')
        .map(|group| parse_range_list(group.split('+'), RangeUnit::Staff))
        .collect::<Result<Vec<_>>>()?;

    let beat_ranges = beats
        .split(',')
        .map(|group| group.split('+').map(parse_beat_term).collect::<Result<Vec<_>>>())
        .collect::<Result<Vec<_>>>()?;

    // Unknown completeness keywords fall back to raw
    let completeness = match completeness {
        Some(text) => Completeness::from_token(text).unwrap_or_else(|| {
            log::warn!("ignoring unknown completeness '{}'", text);
            Completeness::Raw
        }),
        None => Completeness::Raw,
    };

    if options.merge_measure_ranges {
        if staff_ranges.len() == 1 && beat_ranges.len() == 1 {
            measure_ranges = merge_adjacent(measure_ranges);
        } else {
            log::debug!("measure ranges left unmerged: staff/beat groups are aligned per measure");
        }
    }

    Ok(RawExpression {
        measure_ranges,
        staff_ranges,
        beat_ranges,
        completeness,
    })
}

fn parse_range_list<'a, T: TokenValue>(
    pieces: impl Iterator<Item = &'a str>,
    unit: RangeUnit,
) -> Result<Vec<Range<T>>> {
    pieces.map(|piece| parse_range(piece, unit)).collect()
}

/// `@1-2@3` → two ranges. The term must start with `@`.
fn parse_beat_term(term: &str) -> Result<BeatTerm> {
    let mut pieces = term.split('@');
    match pieces.next() {
        Some("") => {}
        _ => {
            return Err(EmaError::MalformedSelector(format!(
                "beat selection '{}' must start with '@'",
                term
            )))
        }
    }
    pieces
        .map(|piece| parse_range::<BeatPosition>(piece, RangeUnit::Beat))
        .collect()
}

fn parse_range<T: TokenValue>(text: &str, unit: RangeUnit) -> Result<Range<T>> {
    let tokens: Vec<&str> = text.split('-').collect();
    let range = match tokens.as_slice() {
        ["all"] => Some(Range::all()),
        [single] => {
            let token = parse_token(single, unit)?;
            Range::new(token, token)
        }
        [start, end] => {
            if *start == "all" || *end == "all" {
                return Err(EmaError::MalformedSelector(format!(
                    "'all' cannot be one end of the {} range '{}'",
                    unit.name(),
                    text
                )));
            }
            Range::new(parse_token(start, unit)?, parse_token(end, unit)?)
        }
        _ => {
            return Err(EmaError::MalformedSelector(format!(
                "{} range '{}' has more than two endpoints",
                unit.name(),
                text
            )))
        }
    };

    range.ok_or_else(|| {
        EmaError::MalformedSelector(format!(
            "{} range '{}' cannot start at 'end' or finish at 'start'",
            unit.name(),
            text
        ))
    })
}

fn parse_token<T: TokenValue>(text: &str, unit: RangeUnit) -> Result<Token<T>> {
    match text {
        "start" => Ok(Token::Start),
        "end" => Ok(Token::End),
        _ => T::parse_token_value(text).map(Token::Value).ok_or_else(|| {
            let expected = match unit {
                RangeUnit::Beat => "a decimal",
                RangeUnit::Measure | RangeUnit::Staff => "an integer",
            };
            EmaError::MalformedSelector(format!(
                "invalid {} token '{}': expected {}, 'start', 'end' or 'all'",
                unit.name(),
                text,
                expected
            ))
        }),
    }
}

/// Coalesce `a-b,(b+1)-c` into `a-c` for numeric endpoints
fn merge_adjacent(ranges: Vec<Range<u32>>) -> Vec<Range<u32>> {
    let mut merged: Vec<Range<u32>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        if let Some(last) = merged.last_mut() {
            if let (Token::Value(last_end), Token::Value(start)) = (last.end, range.start) {
                if last_end.checked_add(1) == Some(start) {
                    last.end = range.end;
                    continue;
                }
            }
        }
        merged.push(range);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beat(text: &str) -> BeatPosition {
        BeatPosition::parse_decimal(text).unwrap()
    }

    #[test]
    fn test_parse_single_measure_two_staves() {
        let expr = parse("18-18/2+4/@all").unwrap();

        assert_eq!(expr.measure_ranges, vec![Range::between(18, 18)]);

        assert_eq!(expr.staff_ranges.len(), 1);
        assert_eq!(expr.staff_ranges[0], vec![Range::point(2), Range::point(4)]);

        assert_eq!(expr.beat_ranges.len(), 1);
        assert_eq!(expr.beat_ranges[0].len(), 1);
        assert_eq!(expr.beat_ranges[0][0], vec![Range::all()]);
        assert_eq!(expr.beat_ranges[0][0][0].start, Token::Start);
        assert_eq!(expr.beat_ranges[0][0][0].end, Token::End);

        assert_eq!(expr.completeness, Completeness::Raw);
    }

    #[test]
    fn test_parse_nested_groups() {
        let expr = parse("1-3,4,5-6/1,2,3,1-3+5,2+3,4/@all,@all,@all,@1-2@3+@all+@all+@all,@all+@all,@all").unwrap();

        assert_eq!(expr.measure_ranges.len(), 3);
        assert_eq!(expr.staff_ranges.len(), 6);
        assert_eq!(expr.staff_ranges[3], vec![Range::between(1, 3), Range::point(5)]);
        assert_eq!(expr.beat_ranges.len(), 6);
        assert_eq!(expr.beat_ranges[3].len(), 4);
        assert_eq!(
            expr.beat_ranges[3][0],
            vec![Range::between(beat("1"), beat("2")), Range::point(beat("3"))]
        );
        assert_eq!(expr.beat_ranges[4].len(), 2);
    }

    #[test]
    fn test_parse_completeness() {
        assert_eq!(parse("1/1/@1/cut").unwrap().completeness, Completeness::Cut);
        assert_eq!(parse("1/1/@1/nospace").unwrap().completeness, Completeness::NoSpace);
        assert_eq!(parse("1/1/@1/signature").unwrap().completeness, Completeness::Signature);
        // Unknown values are ignored rather than rejected
        assert_eq!(parse("1/1/@1/bogus").unwrap().completeness, Completeness::Raw);
    }

    #[test]
    fn test_parse_decimal_beats() {
        let expr = parse("1/2/@1-1.5/cut").unwrap();
        assert_eq!(expr.beat_ranges[0][0], vec![Range::between(beat("1"), beat("1.5"))]);
    }

    #[test]
    fn test_sentinel_ranges() {
        let expr = parse("start-end/start-3/@2-end").unwrap();
        assert_eq!(expr.measure_ranges, vec![Range::all()]);
        assert_eq!(expr.staff_ranges[0][0].start, Token::Start);
        assert_eq!(expr.staff_ranges[0][0].end, Token::Value(3));
        assert_eq!(expr.beat_ranges[0][0][0].end, Token::End);
    }

    #[test]
    fn test_reject_wrong_field_count() {
        assert!(matches!(parse("1/2"), Err(EmaError::MalformedSelector(_))));
        assert!(matches!(parse("1/2/@1/cut/extra"), Err(EmaError::MalformedSelector(_))));
    }

    #[test]
    fn test_reject_invalid_sentinel_order() {
        assert!(matches!(parse("end-3/1/@all"), Err(EmaError::MalformedSelector(_))));
        assert!(matches!(parse("3-start/1/@all"), Err(EmaError::MalformedSelector(_))));
        assert!(matches!(parse("1/1/@end-2"), Err(EmaError::MalformedSelector(_))));
    }

    #[test]
    fn test_reject_bad_tokens() {
        assert!(matches!(parse("1.5/1/@all"), Err(EmaError::MalformedSelector(_))));
        assert!(matches!(parse("1/x/@all"), Err(EmaError::MalformedSelector(_))));
        assert!(matches!(parse("1/1/@one"), Err(EmaError::MalformedSelector(_))));
        assert!(matches!(parse("1-2-3/1/@all"), Err(EmaError::MalformedSelector(_))));
        assert!(matches!(parse("all-3/1/@all"), Err(EmaError::MalformedSelector(_))));
        assert!(matches!(parse("/1/@all"), Err(EmaError::MalformedSelector(_))));
    }

    #[test]
    fn test_reject_beat_term_without_at() {
        let err = parse("1/1/1-2").unwrap_err();
        assert!(err.to_string().contains("must start with '@'"));
    }

    #[test]
    fn test_canonical_round_trip() {
        let canonical = "1-3,5/1+2,start-end/@1-1.5@3+@start-end,@2.25-end/cut";
        assert_eq!(parse(canonical).unwrap().to_string(), canonical);

        // `all` prints as the start-end pair, not back as `all`
        let expr = parse("all/all/@all").unwrap();
        assert_eq!(expr.to_string(), "start-end/start-end/@start-end/raw");
        assert_eq!(parse(&expr.to_string()).unwrap(), expr);
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let expr = parse("2,2/1,1/@1,@1").unwrap();
        assert_eq!(expr.measure_ranges, vec![Range::point(2), Range::point(2)]);
    }

    #[test]
    fn test_merge_is_opt_in() {
        let options = ParseOptions {
            merge_measure_ranges: true,
        };
        let merged = parse_with("1-2,3,4-6,9/1/@all", options).unwrap();
        assert_eq!(merged.measure_ranges, vec![Range::between(1, 6), Range::point(9)]);

        let unmerged = parse("1-2,3,4-6,9/1/@all").unwrap();
        assert_eq!(unmerged.measure_ranges.len(), 4);
    }

    #[test]
    fn test_merge_skipped_when_groups_align_per_measure() {
        let options = ParseOptions {
            merge_measure_ranges: true,
        };
        let expr = parse_with("1,2/1,2/@all", options).unwrap();
        assert_eq!(expr.measure_ranges, vec![Range::point(1), Range::point(2)]);
    }
}
