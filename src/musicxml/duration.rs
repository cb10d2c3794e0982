// Duration helpers for trimmed notes

use super::tree::XmlElement;
use num_rational::Ratio;

/// Note types by the denominator of their length as a fraction of a whole note
pub const NOTE_TYPES: &[(i64, &str)] = &[
    (1, "whole"),
    (2, "half"),
    (4, "quarter"),
    (8, "eighth"),
    (16, "16th"),
    (32, "32nd"),
    (64, "64th"),
    (128, "128th"),
];

fn note_type_name(denominator: Ratio<i64>) -> Option<&'static str> {
    if !denominator.is_integer() {
        return None;
    }
    let denominator = denominator.to_integer();
    NOTE_TYPES
        .iter()
        .find(|(denom, _)| *denom == denominator)
        .map(|(_, name)| *name)
}

/// `<time-modification>` ratio: `actual` notes in the time of `normal`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TupletRatio {
    pub actual: u32,
    pub normal: u32,
}

impl TupletRatio {
    /// Read the note's `<time-modification>`, if it has a usable one
    pub fn from_note(note: &XmlElement) -> Option<Self> {
        let modification = note.child("time-modification")?;
        let actual = modification.child("actual-notes")?.parse_text::<u32>()?;
        let normal = modification.child("normal-notes")?.parse_text::<u32>()?;
        if actual == 0 || normal == 0 {
            return None;
        }
        Some(TupletRatio { actual, normal })
    }
}

/// A displayable note type, possibly single-dotted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteType {
    pub name: &'static str,
    pub dotted: bool,
}

/// Find the note type that displays `duration` ticks
///
/// The note's length as a fraction of a whole note gives a denominator
/// (`4 * divisions / duration`), scaled by `normal / actual` inside a tuplet.
/// A plain type must match it exactly; otherwise a single-dotted type is
/// tried (`denominator * 3/2`).
///
/// # Examples
/// ```
/// use ema_wasm::musicxml::duration::{note_type_for_duration, NoteType};
///
/// assert_eq!(note_type_for_duration(2, 4, None), Some(NoteType { name: "eighth", dotted: false }));
/// assert_eq!(note_type_for_duration(6, 4, None), Some(NoteType { name: "quarter", dotted: true }));
/// assert_eq!(note_type_for_duration(5, 4, None), None);
/// ```
pub fn note_type_for_duration(duration: u32, divisions: u32, tuplet: Option<TupletRatio>) -> Option<NoteType> {
    if duration == 0 || divisions == 0 {
        return None;
    }
    let mut denominator = Ratio::new(4 * i64::from(divisions), i64::from(duration));
    if let Some(tuplet) = tuplet {
        denominator = denominator * Ratio::new(i64::from(tuplet.normal), i64::from(tuplet.actual));
    }

    if let Some(name) = note_type_name(denominator) {
        return Some(NoteType { name, dotted: false });
    }
    note_type_name(denominator * Ratio::new(3, 2)).map(|name| NoteType { name, dotted: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::musicxml::tree::XmlDocument;

    #[test]
    fn test_whole_note() {
        assert_eq!(note_type_for_duration(16, 4, None), Some(NoteType { name: "whole", dotted: false }));
    }

    #[test]
    fn test_dotted_half() {
        assert_eq!(note_type_for_duration(12, 4, None), Some(NoteType { name: "half", dotted: true }));
    }

    #[test]
    fn test_quarter_note() {
        assert_eq!(note_type_for_duration(1, 1, None), Some(NoteType { name: "quarter", dotted: false }));
        assert_eq!(note_type_for_duration(480, 480, None), Some(NoteType { name: "quarter", dotted: false }));
    }

    #[test]
    fn test_dotted_eighth() {
        assert_eq!(note_type_for_duration(3, 4, None), Some(NoteType { name: "eighth", dotted: true }));
    }

    #[test]
    fn test_smallest_types() {
        assert_eq!(note_type_for_duration(1, 32, None), Some(NoteType { name: "128th", dotted: false }));
        assert_eq!(note_type_for_duration(1, 64, None), None);
    }

    #[test]
    fn test_triplet_eighth() {
        let triplet = TupletRatio { actual: 3, normal: 2 };
        // Divisions 6: a triplet eighth lasts 2 ticks
        assert_eq!(note_type_for_duration(2, 6, Some(triplet)), Some(NoteType { name: "eighth", dotted: false }));
        // Two triplet eighths tied as one value display as a triplet quarter
        assert_eq!(note_type_for_duration(4, 6, Some(triplet)), Some(NoteType { name: "quarter", dotted: false }));
    }

    #[test]
    fn test_no_type_for_irregular_lengths() {
        assert_eq!(note_type_for_duration(5, 4, None), None);
        assert_eq!(note_type_for_duration(7, 8, None), None);
        assert_eq!(note_type_for_duration(0, 4, None), None);
    }

    #[test]
    fn test_tuplet_ratio_from_note() {
        let doc = XmlDocument::parse(
            "<note><time-modification><actual-notes>5</actual-notes><normal-notes>4</normal-notes></time-modification></note>",
        )
        .unwrap();
        assert_eq!(TupletRatio::from_note(&doc.root), Some(TupletRatio { actual: 5, normal: 4 }));

        let plain = XmlDocument::parse("<note><duration>1</duration></note>").unwrap();
        assert_eq!(TupletRatio::from_note(&plain.root), None);
    }
}
