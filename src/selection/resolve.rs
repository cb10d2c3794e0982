//! Selection resolver
//!
//! Expands a [`RawExpression`] against [`DocumentBounds`] into concrete
//! measure → staff → beat ranges. Beat `end` stays symbolic: it depends on
//! the time signature in force, which only the slicer knows.

use super::bounds::DocumentBounds;
use super::broadcast::broadcast_index;
use crate::errors::{EmaError, Result};
use crate::parse::{BeatPosition, Completeness, Range, RangeUnit, RawExpression, Token};
use crate::settings::BoundsPolicy;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::RangeInclusive;

/// Upper end of a resolved beat range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BeatBound {
    Beat(BeatPosition),
    /// End of the measure, whatever its length
    End,
}

/// A beat range with `start` substituted (always numeric)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BeatRange {
    pub start: BeatPosition,
    pub end: BeatBound,
}

impl BeatRange {
    pub fn new(start: BeatPosition, end: BeatBound) -> Self {
        BeatRange { start, end }
    }

    /// `@start-end`
    pub fn whole_measure() -> Self {
        BeatRange::new(BeatPosition::DOWNBEAT, BeatBound::End)
    }
}

impl fmt::Display for BeatRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            BeatBound::Beat(end) => write!(f, "@{}-{}", self.start, end),
            BeatBound::End => write!(f, "@{}-end", self.start),
        }
    }
}

/// Staff → beat ranges for one measure
pub type MeasureSelection = BTreeMap<u32, Vec<BeatRange>>;

/// A selector resolved against one document
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedSelection {
    measures: BTreeMap<u32, MeasureSelection>,
    selected_staves: BTreeSet<u32>,
    completeness: Completeness,
}

impl ResolvedSelection {
    pub fn new(completeness: Completeness) -> Self {
        ResolvedSelection {
            completeness,
            ..ResolvedSelection::default()
        }
    }

    /// Add beat ranges for a (measure, staff) pair; repeats are appended
    pub(crate) fn append(&mut self, measure: u32, staff: u32, ranges: impl IntoIterator<Item = BeatRange>) {
        self.measures
            .entry(measure)
            .or_default()
            .entry(staff)
            .or_default()
            .extend(ranges);
        self.selected_staves.insert(staff);
    }

    pub fn measure(&self, number: u32) -> Option<&MeasureSelection> {
        self.measures.get(&number)
    }

    pub fn measures(&self) -> impl Iterator<Item = (u32, &MeasureSelection)> {
        self.measures.iter().map(|(number, staves)| (*number, staves))
    }

    pub fn beat_ranges(&self, measure: u32, staff: u32) -> &[BeatRange] {
        self.measures
            .get(&measure)
            .and_then(|staves| staves.get(&staff))
            .map_or(&[], Vec::as_slice)
    }

    pub fn selected_staves(&self) -> &BTreeSet<u32> {
        &self.selected_staves
    }

    pub fn completeness(&self) -> Completeness {
        self.completeness
    }

    pub fn with_completeness(mut self, completeness: Completeness) -> Self {
        self.completeness = completeness;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }
}

/// Resolve with the default policy (fail on out-of-range endpoints)
pub fn resolve(bounds: &DocumentBounds, raw: &RawExpression) -> Result<ResolvedSelection> {
    resolve_with(bounds, raw, BoundsPolicy::default())
}

pub fn resolve_with(bounds: &DocumentBounds, raw: &RawExpression, policy: BoundsPolicy) -> Result<ResolvedSelection> {
    let measure_axis = Axis {
        unit: RangeUnit::Measure,
        first: bounds.measure_start,
        last: bounds.measure_end,
    };
    let staff_axis = Axis {
        unit: RangeUnit::Staff,
        first: 1,
        last: bounds.staff_count,
    };

    let mut measures = Vec::new();
    for range in &raw.measure_ranges {
        if let Some(span) = measure_axis.expand(range, policy)? {
            // Numbering gaps select nothing
            measures.extend(bounds.measure_ids.range(span).copied());
        }
    }

    let mut selection = ResolvedSelection::new(raw.completeness);

    for (i, measure) in measures.iter().copied().enumerate() {
        let staff_group = broadcast_index(raw.staff_ranges.len(), i)
            .and_then(|index| raw.staff_ranges.get(index))
            .ok_or_else(|| missing_group("staff", raw.staff_ranges.len(), measures.len(), measure))?;
        let beat_group = broadcast_index(raw.beat_ranges.len(), i)
            .and_then(|index| raw.beat_ranges.get(index))
            .ok_or_else(|| missing_group("beat", raw.beat_ranges.len(), measures.len(), measure))?;

        let mut staves = Vec::new();
        for range in staff_group {
            staves.extend(staff_axis.expand(range, policy)?.into_iter().flatten());
        }

        for (j, staff) in staves.iter().copied().enumerate() {
            let term = broadcast_index(beat_group.len(), j)
                .and_then(|index| beat_group.get(index))
                .ok_or_else(|| {
                    EmaError::MalformedSelector(format!(
                        "measure {} selects {} staves but its beat group has {} terms",
                        measure,
                        staves.len(),
                        beat_group.len()
                    ))
                })?;

            let mut ranges = Vec::with_capacity(term.len());
            for range in term {
                if let Some(resolved) = resolve_beats(range, policy)? {
                    ranges.push(resolved);
                }
            }
            selection.append(measure, staff, ranges);
        }
    }

    log::debug!(
        "resolved {} measure(s), staves {:?}",
        selection.measures.len(),
        selection.selected_staves
    );
    Ok(selection)
}

fn missing_group(what: &str, groups: usize, measures: usize, measure: u32) -> EmaError {
    EmaError::MalformedSelector(format!(
        "{} {} groups cannot cover {} selected measures (no group for measure {})",
        groups, what, measures, measure
    ))
}

/// Integer axis with document bounds
struct Axis {
    unit: RangeUnit,
    first: u32,
    last: u32,
}

impl Axis {
    fn substitute(&self, token: Token<u32>) -> u32 {
        match token {
            Token::Start => self.first,
            Token::End => self.last,
            Token::Value(value) => value,
        }
    }

    /// Concrete values covered by `range`
    fn expand(&self, range: &Range<u32>, policy: BoundsPolicy) -> Result<Option<RangeInclusive<u32>>> {
        let start = self.substitute(range.start);
        let end = self.substitute(range.end);
        if start > end {
            return Err(EmaError::MalformedSelector(format!(
                "{} range '{}' runs backwards ({} > {})",
                self.unit.name(),
                range,
                start,
                end
            )));
        }

        match policy {
            BoundsPolicy::Fail => {
                if start < self.first || end > self.last {
                    return Err(EmaError::OutOfBounds(format!(
                        "{} range '{}' is outside {}-{}",
                        self.unit.name(),
                        range,
                        self.first,
                        self.last
                    )));
                }
                Ok(Some(start..=end))
            }
            BoundsPolicy::Clamp => {
                if end < self.first || start > self.last {
                    log::debug!("dropping {} range '{}' outside {}-{}", self.unit.name(), range, self.first, self.last);
                    return Ok(None);
                }
                Ok(Some(start.max(self.first)..=end.min(self.last)))
            }
        }
    }
}

fn resolve_beats(range: &Range<BeatPosition>, policy: BoundsPolicy) -> Result<Option<BeatRange>> {
    let start = match range.start {
        Token::Start => BeatPosition::DOWNBEAT,
        Token::Value(beat) => beat,
        // `end-end`: nothing after the end of the measure
        Token::End => return Ok(None),
    };
    let end = match range.end {
        Token::Start => BeatBound::Beat(BeatPosition::DOWNBEAT),
        Token::Value(beat) => BeatBound::Beat(beat),
        Token::End => BeatBound::End,
    };

    if let BeatBound::Beat(end) = end {
        if end < start {
            return Err(EmaError::MalformedSelector(format!(
                "beat range '{}' runs backwards",
                range
            )));
        }
    }

    if start >= BeatPosition::DOWNBEAT {
        return Ok(Some(BeatRange::new(start, end)));
    }
    match policy {
        BoundsPolicy::Fail => Err(EmaError::OutOfBounds(format!(
            "beat range '{}' starts before beat 1",
            range
        ))),
        BoundsPolicy::Clamp => match end {
            BeatBound::Beat(end) if end < BeatPosition::DOWNBEAT => Ok(None),
            _ => Ok(Some(BeatRange::new(BeatPosition::DOWNBEAT, end))),
        },
    }
}
