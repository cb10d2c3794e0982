//! Note rewrites: rest conversion, trimming and filler rests

use super::ticks::TickRange;
use super::SliceReport;
use crate::errors::{EmaError, Result};
use crate::musicxml::duration::{note_type_for_duration, TupletRatio};
use crate::musicxml::{XmlElement, XmlNode};

/// Children that make a note sound or attach to its pitch
const SOUNDING_CHILDREN: &[&str] = &[
    "accidental",
    "stem",
    "notehead",
    "beam",
    "tie",
    "lyric",
    "notations",
];

/// Children that precede the pitch/rest slot of a `<note>`
const LEADING_CHILDREN: &[&str] = &["grace", "cue", "chord"];

/// Turn a note into a rest in place, keeping duration, voice, type, dots,
/// time-modification and staff
pub fn convert_to_rest(note: &mut XmlElement) {
    note.remove_children_named(SOUNDING_CHILDREN);

    let pitch_slot = note
        .children
        .iter()
        .position(|node| node.as_element().is_some_and(|e| e.is("pitch") || e.is("unpitched")));
    match pitch_slot {
        Some(index) => {
            note.children[index] = XmlNode::Element(XmlElement::new("rest"));
            note.remove_children_named(&["pitch", "unpitched"]);
        }
        None if note.has_child("rest") => {}
        None => {
            let index = note
                .children
                .iter()
                .position(|node| {
                    node.as_element()
                        .is_some_and(|e| !LEADING_CHILDREN.contains(&e.name.as_str()))
                })
                .unwrap_or(note.children.len());
            note.insert_element_before(index, XmlElement::new("rest"));
        }
    }
}

/// Give a note a new duration and recompute its displayed type
///
/// Notes without `<type>` only get the new duration. Tuplet notes lacking
/// `<normal-type>` get one holding their display type before it changes.
pub fn set_note_duration(note: &mut XmlElement, duration: u32, divisions: u32) -> Result<()> {
    let tuplet = TupletRatio::from_note(note);
    let current_type = note.child("type").and_then(XmlElement::text);

    let note_type = match current_type {
        Some(_) => Some(note_type_for_duration(duration, divisions, tuplet).ok_or_else(|| {
            let ratio = tuplet
                .map(|t| format!(" in a {}:{} tuplet", t.actual, t.normal))
                .unwrap_or_default();
            EmaError::TrimArithmeticFailure(format!(
                "{} ticks at {} divisions per quarter{} is neither a plain nor a dotted note value",
                duration, divisions, ratio
            ))
        })?),
        None => None,
    };

    if let Some(element) = note.child_mut("duration") {
        element.set_text(&duration.to_string());
    }

    if let (Some(_), Some(current)) = (tuplet, current_type.as_deref()) {
        if let Some(modification) = note.child_mut("time-modification") {
            if !modification.has_child("normal-type") {
                let normal_type = XmlElement::with_text("normal-type", current.trim());
                match modification.position_of("normal-notes") {
                    Some(index) => {
                        modification.insert_element_after(index, normal_type);
                    }
                    None => modification.push_element(normal_type),
                }
            }
        }
    }

    if let Some(note_type) = note_type {
        note.remove_children_named(&["dot"]);
        if let Some(element) = note.child_mut("type") {
            element.set_text(note_type.name);
        }
        if note_type.dotted {
            if let Some(index) = note.position_of("type") {
                note.insert_element_after(index, XmlElement::new("dot"));
            }
        }
    }
    Ok(())
}

/// A rest standing in for the trimmed-off part of `note`
///
/// Copied from the note so voice, staff and tuplet data carry over.
pub fn filler_rest(note: &XmlElement, duration: u32, divisions: u32) -> Result<XmlElement> {
    let mut filler = note.clone();
    filler.remove_children_named(&["chord"]);
    convert_to_rest(&mut filler);
    set_note_duration(&mut filler, duration, divisions)?;
    Ok(filler)
}

/// A note and the `<chord/>` notes sounding with it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChordGroup {
    /// `children` index of the first note
    pub head: usize,
    /// `children` indices of the following chord notes
    pub members: Vec<usize>,
    /// Ticks the group advances the cursor by (0 for grace notes)
    pub duration: i64,
    pub is_rest: bool,
}

impl ChordGroup {
    /// Collect the group starting at `head`; `None` if `head` is not a note
    pub fn at(measure: &XmlElement, head: usize) -> Option<Self> {
        let note = measure.element_at(head).filter(|e| e.is("note"))?;
        let duration = if note.has_child("grace") {
            0
        } else {
            note.child("duration")
                .and_then(|d| d.parse_text::<i64>())
                .unwrap_or(0)
        };

        let mut members = Vec::new();
        for (index, node) in measure.children.iter().enumerate().skip(head + 1) {
            match node {
                XmlNode::Element(element) if element.is("note") && element.has_child("chord") => {
                    members.push(index)
                }
                XmlNode::Element(_) => break,
                _ => {}
            }
        }

        Some(ChordGroup {
            head,
            members,
            duration,
            is_rest: note.has_child("rest"),
        })
    }

    /// Index of the last note in the group
    pub fn last(&self) -> usize {
        self.members.last().copied().unwrap_or(self.head)
    }

    pub fn len(&self) -> usize {
        1 + self.members.len()
    }

    pub fn is_zero_length(&self) -> bool {
        self.duration <= 0
    }
}

/// Silence a group: chord notes go, the head becomes a rest.
/// Returns the index after the group.
pub fn blank_chord_group(measure: &mut XmlElement, group: &ChordGroup, report: &mut SliceReport) -> usize {
    for &member in group.members.iter().rev() {
        measure.remove_element_at(member);
    }
    if let Some(head) = measure.element_at_mut(group.head) {
        convert_to_rest(head);
    }
    report.notes_blanked += group.len();
    group.head + 1
}

/// Cut a group down to `range`, filling the trimmed ticks with rests.
/// Returns the index after the group and its fillers.
pub fn trim_chord_group(
    measure: &mut XmlElement,
    group: &ChordGroup,
    note_start: i64,
    range: &TickRange,
    divisions: Option<u32>,
    measure_number: u32,
    report: &mut SliceReport,
) -> Result<usize> {
    let note_end = note_start + group.duration;
    let keep_start = note_start.max(range.start);
    let keep_end = range.end.map_or(note_end, |end| end.min(note_end));
    if keep_end <= keep_start {
        // Point range: nothing to cut down to, the note stays whole
        return Ok(group.last() + 1);
    }
    let left = keep_start - note_start;
    let right = note_end - keep_end;
    if left <= 0 && right <= 0 {
        return Ok(group.last() + 1);
    }

    let in_measure = |e: EmaError| match e {
        EmaError::TrimArithmeticFailure(message) => {
            EmaError::TrimArithmeticFailure(format!("measure {}: {}", measure_number, message))
        }
        other => other,
    };
    let divisions = divisions.ok_or_else(|| {
        EmaError::MalformedDocument(format!(
            "measure {}: cannot trim notes before <divisions> is declared",
            measure_number
        ))
    })?;
    let ticks = |value: i64| {
        u32::try_from(value).map_err(|_| {
            EmaError::TrimArithmeticFailure(format!("measure {}: {} ticks is not a duration", measure_number, value))
        })
    };

    let Some(head) = measure.element_at(group.head).cloned() else {
        return Ok(group.last() + 1);
    };
    let left_filler = if left > 0 {
        Some(filler_rest(&head, ticks(left)?, divisions).map_err(in_measure)?)
    } else {
        None
    };
    let right_filler = if right > 0 {
        Some(filler_rest(&head, ticks(right)?, divisions).map_err(in_measure)?)
    } else {
        None
    };

    let kept = ticks(keep_end - keep_start)?;
    for index in std::iter::once(group.head).chain(group.members.iter().copied()) {
        if let Some(note) = measure.element_at_mut(index) {
            set_note_duration(note, kept, divisions).map_err(in_measure)?;
        }
    }
    report.notes_trimmed += group.len();

    let mut next = group.last() + 1;
    if let Some(filler) = right_filler {
        next += measure.insert_element_after(group.last(), filler);
        report.fillers_inserted += 1;
    }
    if let Some(filler) = left_filler {
        next += measure.insert_element_before(group.head, filler);
        report.fillers_inserted += 1;
    }
    log::debug!(
        "measure {}: trimmed note at tick {} to {}..{} ({} left, {} right)",
        measure_number,
        note_start,
        keep_start,
        keep_end,
        left,
        right
    );
    Ok(next)
}
