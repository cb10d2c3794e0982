//! Raw (unresolved) EMA expression
//!
//! Mirrors the selector string exactly. Nothing here looks at a score: the
//! sentinels `start`/`end` are still symbolic and ranges are not expanded.

use super::tokens::{BeatPosition, Range};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Boundary policy requested by the fourth selector field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Completeness {
    #[default]
    Raw,
    Signature,
    NoSpace,
    Cut,
}

impl Completeness {
    /// Recognize a completeness keyword; anything else is `None`
    pub fn from_token(text: &str) -> Option<Self> {
        match text {
            "raw" => Some(Completeness::Raw),
            "signature" => Some(Completeness::Signature),
            "nospace" => Some(Completeness::NoSpace),
            "cut" => Some(Completeness::Cut),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Completeness::Raw => "raw",
            Completeness::Signature => "signature",
            Completeness::NoSpace => "nospace",
            Completeness::Cut => "cut",
        }
    }
}

impl fmt::Display for Completeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Beat ranges for one staff of one measure group (`@1-2@3`)
pub type BeatTerm = Vec<Range<BeatPosition>>;

/// A selector as written by the user
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RawExpression {
    /// Comma-separated measure ranges
    pub measure_ranges: Vec<Range<u32>>,
    /// One plus-combination of staff ranges per measure group
    pub staff_ranges: Vec<Vec<Range<u32>>>,
    /// Per measure group, per staff: the `@`-separated beat ranges
    pub beat_ranges: Vec<Vec<BeatTerm>>,
    pub completeness: Completeness,
}

fn join<T: fmt::Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

impl fmt::Display for RawExpression {
    /// Canonical form: `all` prints as `start-end`, completeness is always present
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let measures = join(&self.measure_ranges, ",");
        let staves = self
            .staff_ranges
            .iter()
            .map(|group| join(group, "+"))
            .collect::<Vec<_>>()
            .join(",");
        let beats = self
            .beat_ranges
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|term| {
                        term.iter()
                            .map(|range| format!("@{}", range))
                            .collect::<String>()
                    })
                    .collect::<Vec<_>>()
                    .join("+")
            })
            .collect::<Vec<_>>()
            .join(",");

        write!(f, "{}/{}/{}/{}", measures, staves, beats, self.completeness)
    }
}

/// Opt-in parser behaviour
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Coalesce adjacent numeric measure ranges (`1-2,3` becomes `1-3`)
    pub merge_measure_ranges: bool,
}
