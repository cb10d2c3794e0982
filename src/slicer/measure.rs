//! Beat selection inside one kept measure

use super::notes::{blank_chord_group, trim_chord_group, ChordGroup};
use super::ticks::TickRange;
use super::SliceReport;
use crate::errors::{EmaError, Result};
use crate::musicxml::attributes::{MeasureAttributeState, TimeSignature};
use crate::musicxml::XmlElement;
use crate::parse::Completeness;
use crate::selection::{BeatRange, MeasureSelection};
use crate::settings::BoundsPolicy;
use std::collections::BTreeMap;

/// What the walk over one measure needs to know
#[derive(Clone, Debug)]
pub struct MeasureContext {
    /// Measure identifier (for messages)
    pub number: u32,
    /// Global index of the part's first staff
    pub starting_staff: u32,
    pub staves: u32,
    pub divisions: Option<u32>,
    pub time: Option<TimeSignature>,
    pub completeness: Completeness,
    pub policy: BoundsPolicy,
}

impl MeasureContext {
    pub fn new(
        number: u32,
        starting_staff: u32,
        state: &MeasureAttributeState,
        completeness: Completeness,
        policy: BoundsPolicy,
    ) -> Self {
        MeasureContext {
            number,
            starting_staff,
            staves: state.staves(),
            divisions: state.divisions,
            time: state.time,
            completeness,
            policy,
        }
    }

    /// Whether `range` starts inside the nominal measure length
    fn starts_inside(&self, range: &BeatRange) -> Result<bool> {
        let Some(time) = self.time else {
            return Ok(true);
        };
        if range.start.as_ratio() - 1 < time.quarters() {
            return Ok(true);
        }
        match self.policy {
            BoundsPolicy::Fail => Err(EmaError::OutOfBounds(format!(
                "beat {} is past the end of measure {} ({}/{})",
                range.start, self.number, time.beats, time.beat_type
            ))),
            BoundsPolicy::Clamp => {
                log::debug!("measure {}: beat {} matches nothing", self.number, range.start);
                Ok(false)
            }
        }
    }

    /// Tick ranges for each of this part's staves that the measure selects
    fn tick_ranges(&self, selection: &MeasureSelection) -> Result<BTreeMap<u32, Vec<TickRange>>> {
        let mut ranges = BTreeMap::new();
        for staff in self.starting_staff..self.starting_staff + self.staves {
            let Some(beats) = selection.get(&staff) else {
                continue;
            };
            let mut ticks = Vec::with_capacity(beats.len());
            for beat_range in beats {
                if self.starts_inside(beat_range)? {
                    ticks.push(TickRange::from_beats(beat_range, self.divisions, self.number)?);
                }
            }
            ranges.insert(staff, ticks);
        }
        Ok(ranges)
    }

    fn last_staff(&self) -> u32 {
        self.starting_staff + self.staves.max(1) - 1
    }

    /// Global staff of a note: its `<staff>` child when that names one of
    /// the part's staves, otherwise the staff reached by counting backups
    fn staff_of(&self, note: &XmlElement, counted: u32) -> u32 {
        match note.child("staff").and_then(|s| s.parse_text::<u32>()) {
            Some(local) if (1..=self.staves).contains(&local) => self.starting_staff + local - 1,
            _ => counted,
        }
    }
}

fn duration_of(element: &XmlElement) -> i64 {
    element
        .child("duration")
        .and_then(|d| d.parse_text::<i64>())
        .unwrap_or(0)
}

/// Walk a measure, silencing notes outside the selection and, in cut mode,
/// trimming notes that straddle a range boundary
///
/// `<backup>` rewinds the cursor and moves to the next staff of the part,
/// stopping at the part's last staff (a second voice on a one-staff part
/// stays on that staff); `<forward>` advances it. A note's own `<staff>`
/// child wins over the counted staff.
pub fn select_beats(
    measure: &mut XmlElement,
    selection: &MeasureSelection,
    context: &MeasureContext,
    report: &mut SliceReport,
) -> Result<()> {
    let ranges = context.tick_ranges(selection)?;
    let unselected: Vec<TickRange> = Vec::new();

    let mut staff = context.starting_staff;
    let mut cursor: i64 = 0;
    let mut index = 0;

    while index < measure.children.len() {
        let Some(element) = measure.element_at(index) else {
            index += 1;
            continue;
        };

        match element.name.as_str() {
            "backup" => {
                cursor -= duration_of(element);
                staff = (staff + 1).min(context.last_staff());
                index += 1;
            }
            "forward" => {
                cursor += duration_of(element);
                index += 1;
            }
            "note" => {
                let Some(group) = ChordGroup::at(measure, index) else {
                    index += 1;
                    continue;
                };
                let note_staff = measure
                    .element_at(group.head)
                    .map_or(staff, |note| context.staff_of(note, staff));
                let active = ranges.get(&note_staff).unwrap_or(&unselected);
                index = select_group(measure, &group, cursor, active, context, report)?;
                cursor += group.duration;
            }
            _ => index += 1,
        }
    }
    Ok(())
}

fn select_group(
    measure: &mut XmlElement,
    group: &ChordGroup,
    start: i64,
    ranges: &[TickRange],
    context: &MeasureContext,
    report: &mut SliceReport,
) -> Result<usize> {
    if group.is_rest {
        return Ok(group.last() + 1);
    }

    if group.is_zero_length() {
        if ranges.iter().any(|range| range.contains_point(start)) {
            return Ok(group.last() + 1);
        }
        return Ok(blank_chord_group(measure, group, report));
    }

    let end = start + group.duration;
    match ranges.iter().find(|range| range.overlaps(start, end)) {
        None => Ok(blank_chord_group(measure, group, report)),
        Some(range) if context.completeness == Completeness::Cut => trim_chord_group(
            measure,
            group,
            start,
            range,
            context.divisions,
            context.number,
            report,
        ),
        Some(_) => Ok(group.last() + 1),
    }
}
