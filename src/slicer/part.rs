//! One `<part>`: drop unselected measures, carry attributes, select beats

use super::measure::{select_beats, MeasureContext};
use super::SliceReport;
use crate::errors::Result;
use crate::musicxml::attributes::{AttributeBlock, MeasureAttributeState, PendingAttributes};
use crate::musicxml::{MeasureNumbering, XmlElement};
use crate::selection::ResolvedSelection;
use crate::settings::BoundsPolicy;

/// What a part pass leaves behind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartOutcome {
    /// Staves the part declares (last `<staves>` seen, 1 by default)
    pub staves: u32,
    pub measures_kept: usize,
}

/// Slice one part in place
///
/// Attribute changes in deleted measures are re-emitted in the next kept
/// measure so it still has the right divisions, key, time and clefs.
pub fn process_part(
    part: &mut XmlElement,
    selection: &ResolvedSelection,
    starting_staff: u32,
    policy: BoundsPolicy,
    report: &mut SliceReport,
) -> Result<PartOutcome> {
    let mut state = MeasureAttributeState::default();
    let mut pending = PendingAttributes::default();
    let mut numbering = MeasureNumbering::default();
    let mut measures_kept = 0;

    let mut index = 0;
    while index < part.children.len() {
        let Some(measure) = part.element_at(index).filter(|e| e.is("measure")) else {
            index += 1;
            continue;
        };
        let number = numbering.next(measure);
        // Mid-measure changes (a clef switch after some notes) are blocks too
        let blocks: Vec<AttributeBlock> = measure
            .elements_named("attributes")
            .map(AttributeBlock::from_element)
            .collect();
        for block in &blocks {
            state = state.absorb(block);
        }

        let Some(staves) = selection.measure(number) else {
            for block in &blocks {
                pending.record(block);
            }
            index = part.remove_element_at(index);
            continue;
        };

        if let Some(measure) = part.element_at_mut(index) {
            pending.splice_into(measure);
            let context = MeasureContext::new(number, starting_staff, &state, selection.completeness(), policy);
            select_beats(measure, staves, &context, report)?;
        }
        measures_kept += 1;
        index += 1;
    }

    log::debug!(
        "part {:?}: kept {} measure(s), staves {}..{}",
        part.attribute("id"),
        measures_kept,
        starting_staff,
        starting_staff + state.staves()
    );
    Ok(PartOutcome {
        staves: state.staves(),
        measures_kept,
    })
}
