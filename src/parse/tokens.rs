//! Selector tokens and ranges
//!
//! A token is a number or one of the sentinels `start` / `end`. The literal
//! `all` never survives parsing: it becomes the range `start-end`.

use num_rational::Ratio;
use serde::{Serialize, Serializer};
use std::fmt;

/// Which axis of the selector a token belongs to (used for parsing and messages)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeUnit {
    Measure,
    Staff,
    Beat,
}

impl RangeUnit {
    pub fn name(&self) -> &'static str {
        match self {
            RangeUnit::Measure => "measure",
            RangeUnit::Staff => "staff",
            RangeUnit::Beat => "beat",
        }
    }
}

/// A single selector token
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Token<T> {
    Start,
    End,
    Value(T),
}

impl<T: fmt::Display> fmt::Display for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Start => f.write_str("start"),
            Token::End => f.write_str("end"),
            Token::Value(value) => value.fmt(f),
        }
    }
}

/// Values a numeric token can hold
pub trait TokenValue: Copy + PartialEq + fmt::Display {
    fn parse_token_value(text: &str) -> Option<Self>;
}

impl TokenValue for u32 {
    fn parse_token_value(text: &str) -> Option<Self> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse().ok()
    }
}

/// Beat position written as a decimal literal, held as an exact fraction
///
/// `1` is the downbeat; `1.5` is halfway through the first quarter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BeatPosition(Ratio<i64>);

/// Longest digit string accepted for a beat literal (keeps the fraction in i64)
const MAX_BEAT_DIGITS: usize = 18;

impl BeatPosition {
    pub const DOWNBEAT: BeatPosition = BeatPosition(Ratio::new_raw(1, 1));

    pub fn from_integer(beat: i64) -> Self {
        BeatPosition(Ratio::from_integer(beat))
    }

    pub fn from_ratio(ratio: Ratio<i64>) -> Self {
        BeatPosition(ratio)
    }

    /// Parse `digits[.digits]`
    pub fn parse_decimal(text: &str) -> Option<Self> {
        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !digits_only(whole) || !digits_only(fraction) {
            return None;
        }
        if whole.len() + fraction.len() > MAX_BEAT_DIGITS {
            return None;
        }

        let numer: i64 = format!("{}{}", whole, fraction).parse().ok()?;
        let denom = 10i64.checked_pow(fraction.len() as u32)?;
        Some(BeatPosition(Ratio::new(numer, denom)))
    }

    pub fn as_ratio(&self) -> Ratio<i64> {
        self.0
    }

    /// Tick offset of this beat from the start of the measure
    ///
    /// `(beat - 1) * divisions`, rounded to the nearest tick with halves
    /// rounding away from zero. `None` when the tick count does not fit an `i64`.
    pub fn to_ticks(&self, divisions: u32) -> Option<i64> {
        let numer = i128::from(*self.0.numer());
        let denom = i128::from(*self.0.denom());
        let offset = Ratio::new(numer - denom, denom) * i128::from(divisions);
        i64::try_from(offset.round().to_integer()).ok()
    }
}

impl fmt::Display for BeatPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numer = *self.0.numer();
        let denom = *self.0.denom();
        write!(f, "{}", numer / denom)?;

        let mut remainder = numer % denom;
        if remainder == 0 {
            return Ok(());
        }
        f.write_str(".")?;
        // Parsed beats have power-of-ten denominators, so this terminates
        let mut digits = 0;
        while remainder != 0 && digits < MAX_BEAT_DIGITS {
            remainder *= 10;
            write!(f, "{}", remainder / denom)?;
            remainder %= denom;
            digits += 1;
        }
        Ok(())
    }
}

impl Serialize for BeatPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl TokenValue for BeatPosition {
    fn parse_token_value(text: &str) -> Option<Self> {
        // Beat 0 would lie before the downbeat of every measure
        BeatPosition::parse_decimal(text).filter(|beat| *beat.as_ratio().numer() > 0)
    }
}

/// An ordered `(start, end)` pair of tokens
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Range<T> {
    pub start: Token<T>,
    pub end: Token<T>,
}

impl<T: Copy + PartialEq> Range<T> {
    /// Build a range, rejecting `end-x` (x != end) and `x-start` (x != start)
    pub fn new(start: Token<T>, end: Token<T>) -> Option<Self> {
        if start == Token::End && end != Token::End {
            return None;
        }
        if end == Token::Start && start != Token::Start {
            return None;
        }
        Some(Range { start, end })
    }

    pub fn all() -> Self {
        Range {
            start: Token::Start,
            end: Token::End,
        }
    }

    pub fn point(value: T) -> Self {
        Range {
            start: Token::Value(value),
            end: Token::Value(value),
        }
    }

    pub fn between(start: T, end: T) -> Self {
        Range {
            start: Token::Value(start),
            end: Token::Value(end),
        }
    }
}

impl<T: fmt::Display + PartialEq> fmt::Display for Range<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_beat() {
        let beat = BeatPosition::parse_decimal("3").unwrap();
        assert_eq!(beat, BeatPosition::from_integer(3));
        assert_eq!(beat.to_string(), "3");
    }

    #[test]
    fn test_parse_fractional_beat() {
        let beat = BeatPosition::parse_decimal("1.5").unwrap();
        assert_eq!(beat.as_ratio(), Ratio::new(3, 2));
        assert_eq!(beat.to_string(), "1.5");
        assert_eq!(BeatPosition::parse_decimal("2.125").unwrap().to_string(), "2.125");
        assert_eq!(BeatPosition::parse_decimal("2.50").unwrap().to_string(), "2.5");
        assert_eq!(BeatPosition::parse_decimal(".5").unwrap().to_string(), "0.5");
    }

    #[test]
    fn test_reject_bad_beats() {
        assert!(BeatPosition::parse_decimal("").is_none());
        assert!(BeatPosition::parse_decimal(".").is_none());
        assert!(BeatPosition::parse_decimal("1.2.3").is_none());
        assert!(BeatPosition::parse_decimal("x").is_none());
        assert!(BeatPosition::parse_decimal("1e3").is_none());
        assert!(BeatPosition::parse_decimal("+2").is_none());
        assert!(BeatPosition::parse_token_value("0").is_none());
        assert!(BeatPosition::parse_token_value("0.0").is_none());
        assert!(BeatPosition::parse_token_value("0.5").is_some());
    }

    #[test]
    fn test_beat_to_ticks_rounds_to_grid() {
        let divisions = 4;
        assert_eq!(BeatPosition::DOWNBEAT.to_ticks(divisions), Some(0));
        assert_eq!(BeatPosition::parse_decimal("1.5").unwrap().to_ticks(divisions), Some(2));
        assert_eq!(BeatPosition::parse_decimal("3").unwrap().to_ticks(divisions), Some(8));
        // 0.125 * 4 = 0.5 ticks, halves round away from zero
        assert_eq!(BeatPosition::parse_decimal("1.125").unwrap().to_ticks(divisions), Some(1));
        // 0.1 * 4 = 0.4 ticks
        assert_eq!(BeatPosition::parse_decimal("1.1").unwrap().to_ticks(divisions), Some(0));
    }

    #[test]
    fn test_huge_beat_has_no_tick() {
        let beat = BeatPosition::parse_decimal("999999999999999999").unwrap();
        assert_eq!(beat.to_ticks(480), None);
        assert_eq!(beat.to_ticks(1), Some(999_999_999_999_999_998));
        let fine = BeatPosition::parse_decimal("1.00000000000000001").unwrap();
        assert_eq!(fine.to_ticks(u32::MAX), Some(0));
    }

    #[test]
    fn test_integer_tokens() {
        assert_eq!(u32::parse_token_value("18"), Some(18));
        assert_eq!(u32::parse_token_value("0"), Some(0));
        assert_eq!(u32::parse_token_value("1.5"), None);
        assert_eq!(u32::parse_token_value("+3"), None);
        assert_eq!(u32::parse_token_value(""), None);
    }

    #[test]
    fn test_range_rejects_misplaced_sentinels() {
        assert!(Range::<u32>::new(Token::End, Token::Value(3)).is_none());
        assert!(Range::<u32>::new(Token::Value(3), Token::Start).is_none());
        assert!(Range::<u32>::new(Token::End, Token::End).is_some());
        assert!(Range::<u32>::new(Token::Start, Token::Start).is_some());
        assert!(Range::<u32>::new(Token::Value(2), Token::End).is_some());
    }

    #[test]
    fn test_range_display() {
        assert_eq!(Range::point(18u32).to_string(), "18");
        assert_eq!(Range::between(1u32, 3).to_string(), "1-3");
        assert_eq!(Range::<u32>::all().to_string(), "start-end");
        let tail = Range::<u32>::new(Token::Value(4), Token::End).unwrap();
        assert_eq!(tail.to_string(), "4-end");
    }
}
