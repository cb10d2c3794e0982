//! Score slicer
//!
//! Applies a [`ResolvedSelection`] to a [`ScoreDocument`] in a single pass:
//!
//! 1. Each part drops unselected measures, carrying their attribute changes forward
//! 2. Kept measures silence unselected notes (and trim boundary notes in cut mode)
//! 3. Parts with no selected staff or no kept measure go, with their `<score-part>`

pub mod measure;
pub mod notes;
pub mod part;
pub mod ticks;

use crate::errors::Result;
use crate::musicxml::{ScoreDocument, XmlElement};
use crate::selection::ResolvedSelection;
use crate::settings::BoundsPolicy;
use part::process_part;
use serde::Serialize;

/// What a slice changed
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SliceReport {
    pub parts_kept: usize,
    pub parts_removed: usize,
    /// Measures left across kept parts
    pub measures_kept: usize,
    /// Notes turned into rests (or dropped from a silenced chord)
    pub notes_blanked: usize,
    /// Notes whose duration was cut to the selection
    pub notes_trimmed: usize,
    pub fillers_inserted: usize,
}

/// Slice with the default bounds policy
pub fn slice_score(document: &mut ScoreDocument, selection: &ResolvedSelection) -> Result<SliceReport> {
    slice_score_with(document, selection, BoundsPolicy::default())
}

pub fn slice_score_with(
    document: &mut ScoreDocument,
    selection: &ResolvedSelection,
    policy: BoundsPolicy,
) -> Result<SliceReport> {
    let mut report = SliceReport::default();
    // (ordinal among parts, id) of every removed part
    let mut removed: Vec<(usize, Option<String>)> = Vec::new();

    let root = document.root_mut();
    let mut starting_staff = 1;
    let mut ordinal = 0;
    let mut index = 0;

    while index < root.children.len() {
        let Some(part) = root.element_at_mut(index).filter(|e| e.is("part")) else {
            index += 1;
            continue;
        };

        let outcome = process_part(part, selection, starting_staff, policy, &mut report)?;
        let staves = starting_staff..starting_staff + outcome.staves;
        starting_staff += outcome.staves;

        let selected = staves
            .clone()
            .any(|staff| selection.selected_staves().contains(&staff));
        if outcome.measures_kept > 0 && selected {
            report.parts_kept += 1;
            report.measures_kept += outcome.measures_kept;
            index += 1;
        } else {
            let id = part.attribute("id").map(str::to_string);
            log::info!("removing part {:?} (staves {:?})", id, staves);
            removed.push((ordinal, id));
            report.parts_removed += 1;
            index = root.remove_element_at(index);
        }
        ordinal += 1;
    }

    if !removed.is_empty() {
        if let Some(list) = root.child_mut("part-list") {
            remove_roster_entries(list, &removed);
        }
    }

    log::info!(
        "slice done: {} part(s) kept, {} removed, {} measure(s), {} blanked, {} trimmed",
        report.parts_kept,
        report.parts_removed,
        report.measures_kept,
        report.notes_blanked,
        report.notes_trimmed
    );
    Ok(report)
}

/// Drop the `<score-part>` of each removed part: by id, else by position
fn remove_roster_entries(list: &mut XmlElement, removed: &[(usize, Option<String>)]) {
    let entries: Vec<(usize, Option<&str>)> = list
        .children
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            node.as_element()
                .filter(|e| e.is("score-part"))
                .map(|e| (index, e.attribute("id")))
        })
        .collect();

    let mut doomed: Vec<usize> = removed
        .iter()
        .filter_map(|(ordinal, id)| {
            id.as_deref()
                .and_then(|id| entries.iter().find(|(_, entry)| *entry == Some(id)))
                .or_else(|| entries.get(*ordinal))
                .map(|(index, _)| *index)
        })
        .collect();
    doomed.sort_unstable();
    doomed.dedup();

    for index in doomed.into_iter().rev() {
        list.remove_element_at(index);
    }
}
