//! Document bounds used to resolve `start` / `end`

use crate::errors::{EmaError, Result};
use crate::musicxml::{MeasureNumbering, ScoreDocument};
use serde::Serialize;
use std::collections::BTreeSet;

/// First/last measure of the first part and the total staff count
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentBounds {
    pub measure_start: u32,
    pub measure_end: u32,
    /// Every measure number the first part has; a range selects only these
    pub measure_ids: BTreeSet<u32>,
    /// Sum over parts of the last `<staves>` declared in each (1 if none)
    pub staff_count: u32,
}

impl DocumentBounds {
    /// Bounds of a score numbered `measure_start..=measure_end` without gaps
    pub fn contiguous(measure_start: u32, measure_end: u32, staff_count: u32) -> Self {
        DocumentBounds {
            measure_start,
            measure_end,
            measure_ids: (measure_start..=measure_end).collect(),
            staff_count,
        }
    }

    pub fn scan(document: &ScoreDocument) -> Result<Self> {
        let first_part = document
            .parts()
            .next()
            .ok_or_else(|| EmaError::MalformedDocument("score has no <part>".to_string()))?;

        let mut numbering = MeasureNumbering::default();
        let numbers: Vec<u32> = first_part
            .elements_named("measure")
            .map(|measure| numbering.next(measure))
            .collect();
        let (Some(&measure_start), Some(&measure_end)) = (numbers.first(), numbers.last()) else {
            return Err(EmaError::MalformedDocument(format!(
                "first part '{}' has no measures",
                first_part.attribute("id").unwrap_or_default()
            )));
        };

        let staff_count = document.parts().map(declared_staves).sum();

        log::debug!(
            "document bounds: measures {}-{}, {} staves",
            measure_start,
            measure_end,
            staff_count
        );
        Ok(DocumentBounds {
            measure_start,
            measure_end,
            measure_ids: numbers.into_iter().collect(),
            staff_count,
        })
    }
}

fn declared_staves(part: &crate::musicxml::XmlElement) -> u32 {
    part.elements_named("measure")
        .filter_map(|measure| measure.child("attributes"))
        .filter_map(|attributes| attributes.child("staves"))
        .filter_map(|staves| staves.parse_text::<u32>())
        .filter(|staves| *staves > 0)
        .last()
        .unwrap_or(1)
}
