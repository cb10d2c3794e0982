//! Beat ranges in tick (division) units

use crate::errors::{EmaError, Result};
use crate::parse::BeatPosition;
use crate::selection::{BeatBound, BeatRange};

/// Half-open `[start, end)` tick interval; `end: None` runs to the end of the measure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickRange {
    pub start: i64,
    pub end: Option<i64>,
}

fn beat_ticks(beat: BeatPosition, divisions: Option<u32>, measure: u32) -> Result<i64> {
    if beat == BeatPosition::DOWNBEAT {
        return Ok(0);
    }
    let divisions = divisions.ok_or_else(|| {
        EmaError::MalformedDocument(format!(
            "measure {}: beat {} needs <divisions>, but none has been declared",
            measure, beat
        ))
    })?;
    beat.to_ticks(divisions).ok_or_else(|| {
        EmaError::OutOfBounds(format!(
            "measure {}: beat {} is too far past the downbeat at {} divisions",
            measure, beat, divisions
        ))
    })
}

impl TickRange {
    pub fn from_beats(range: &BeatRange, divisions: Option<u32>, measure: u32) -> Result<Self> {
        let start = beat_ticks(range.start, divisions, measure)?;
        let end = match range.end {
            // Rounding can pull a short range below its start
            BeatBound::Beat(end) => Some(beat_ticks(end, divisions, measure)?.max(start)),
            BeatBound::End => None,
        };
        Ok(TickRange { start, end })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.end, Some(end) if end <= self.start)
    }

    /// `note_start < range_end && range_start < note_end`, for a note of non-zero length
    ///
    /// A point range (`@2`) still selects the note sounding across it.
    pub fn overlaps(&self, note_start: i64, note_end: i64) -> bool {
        if note_end <= note_start {
            return false;
        }
        self.end.map_or(true, |end| note_start < end) && self.start < note_end
    }

    /// Whether a zero-length event at `tick` falls inside the range
    pub fn contains_point(&self, tick: i64) -> bool {
        !self.is_empty() && self.start <= tick && self.end.map_or(true, |end| tick < end)
    }
}
