//! Measure attributes
//!
//! MusicXML only writes an `<attributes>` block when something changes, so the
//! slicer carries the last seen values forward measure by measure. Only the
//! children the slicer reads are interpreted; everything else is passed
//! through untouched as an opaque element.

use super::tree::XmlElement;
use num_rational::Ratio;

/// A `<time>` signature (`beats` may be additive, e.g. `3+2`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeSignature {
    pub beats: u32,
    pub beat_type: u32,
}

impl TimeSignature {
    /// Read `<time><beats/><beat-type/></time>`; `None` for senza-misura or junk
    pub fn from_element(time: &XmlElement) -> Option<Self> {
        let beats = time
            .child("beats")?
            .text()?
            .split('+')
            .map(|part| part.trim().parse::<u32>().ok())
            .sum::<Option<u32>>()?;
        let beat_type = time.child("beat-type")?.parse_text::<u32>()?;
        if beats == 0 || beat_type == 0 {
            return None;
        }
        Some(TimeSignature { beats, beat_type })
    }

    /// Nominal measure length in quarter notes
    pub fn quarters(&self) -> Ratio<i64> {
        Ratio::new(i64::from(self.beats) * 4, i64::from(self.beat_type))
    }
}

/// The interpreted kinds of `<attributes>` children
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeKind {
    Divisions(u32),
    Time(TimeSignature),
    Staves(u32),
    /// Anything else (key, clef, transpose, unreadable values...)
    Opaque,
}

/// One child of an `<attributes>` block with its interpretation
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeEntry {
    pub kind: AttributeKind,
    pub element: XmlElement,
}

impl AttributeEntry {
    fn classify(element: &XmlElement) -> Self {
        let kind = match element.name.as_str() {
            "divisions" => element
                .parse_text::<u32>()
                .filter(|d| *d > 0)
                .map(AttributeKind::Divisions),
            "time" => TimeSignature::from_element(element).map(AttributeKind::Time),
            "staves" => element
                .parse_text::<u32>()
                .filter(|s| *s > 0)
                .map(AttributeKind::Staves),
            _ => None,
        };

        AttributeEntry {
            kind: kind.unwrap_or(AttributeKind::Opaque),
            element: element.clone(),
        }
    }
}

/// Tagged view of one `<attributes>` element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeBlock {
    pub entries: Vec<AttributeEntry>,
}

impl AttributeBlock {
    pub fn from_element(attributes: &XmlElement) -> Self {
        AttributeBlock {
            entries: attributes.elements().map(AttributeEntry::classify).collect(),
        }
    }

    pub fn divisions(&self) -> Option<u32> {
        self.entries.iter().find_map(|entry| match entry.kind {
            AttributeKind::Divisions(divisions) => Some(divisions),
            _ => None,
        })
    }

    pub fn time(&self) -> Option<TimeSignature> {
        self.entries.iter().find_map(|entry| match entry.kind {
            AttributeKind::Time(time) => Some(time),
            _ => None,
        })
    }

    pub fn staves(&self) -> Option<u32> {
        self.entries.iter().find_map(|entry| match entry.kind {
            AttributeKind::Staves(staves) => Some(staves),
            _ => None,
        })
    }
}

/// Running attribute values for one part, threaded through its measures
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MeasureAttributeState {
    pub divisions: Option<u32>,
    pub time: Option<TimeSignature>,
    staves: Option<u32>,
}

impl MeasureAttributeState {
    /// State after a measure declaring `block`
    pub fn absorb(self, block: &AttributeBlock) -> Self {
        MeasureAttributeState {
            divisions: block.divisions().or(self.divisions),
            time: block.time().or(self.time),
            staves: block.staves().or(self.staves),
        }
    }

    /// Staves in the part so far (1 unless declared)
    pub fn staves(&self) -> u32 {
        self.staves.unwrap_or(1)
    }

    /// Nominal measure length in ticks, when both divisions and time are known
    pub fn measure_ticks(&self) -> Option<Ratio<i64>> {
        let divisions = self.divisions?;
        Some(self.time?.quarters() * i64::from(divisions))
    }
}

/// MusicXML schema order of `<attributes>` children
const ATTRIBUTE_ORDER: &[&str] = &[
    "footnote",
    "level",
    "divisions",
    "key",
    "time",
    "staves",
    "part-symbol",
    "instruments",
    "clef",
    "staff-details",
    "transpose",
    "for-part",
    "directive",
    "measure-style",
];

fn schema_rank(name: &str) -> usize {
    ATTRIBUTE_ORDER
        .iter()
        .position(|known| *known == name)
        .unwrap_or(ATTRIBUTE_ORDER.len())
}

/// Attribute changes seen in deleted measures, waiting for the next kept one
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PendingAttributes {
    /// Element name → every element of that name from the latest block declaring it
    groups: Vec<(String, Vec<XmlElement>)>,
}

impl PendingAttributes {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Remember the children of a deleted measure's attributes block
    pub fn record(&mut self, block: &AttributeBlock) {
        let mut names: Vec<&str> = Vec::new();
        for entry in &block.entries {
            if !names.contains(&entry.element.name.as_str()) {
                names.push(entry.element.name.as_str());
            }
        }

        for name in names {
            let elements: Vec<XmlElement> = block
                .entries
                .iter()
                .filter(|entry| entry.element.name == name)
                .map(|entry| entry.element.clone())
                .collect();
            match self.groups.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, group)) => *group = elements,
                None => self.groups.push((name.to_string(), elements)),
            }
        }
    }

    /// Merge the pending changes into `measure`'s attributes block and clear them.
    /// Keys the measure declares itself win.
    pub fn splice_into(&mut self, measure: &mut XmlElement) {
        if self.groups.is_empty() {
            return;
        }
        let groups = std::mem::take(&mut self.groups);

        if !measure.has_child("attributes") {
            // After any leading <print>, before the music
            let index = measure
                .children
                .iter()
                .position(|node| node.as_element().is_some_and(|element| !element.is("print")))
                .unwrap_or(measure.children.len());
            measure.insert_element_before(index, XmlElement::new("attributes"));
        }
        let Some(attributes) = measure.child_mut("attributes") else {
            return;
        };

        for (name, elements) in groups {
            if attributes.has_child(&name) {
                continue;
            }
            let rank = schema_rank(&name);
            for element in elements {
                let index = attributes
                    .children
                    .iter()
                    .position(|node| node.as_element().is_some_and(|existing| schema_rank(&existing.name) > rank));
                match index {
                    Some(index) => {
                        attributes.insert_element_before(index, element);
                    }
                    None => attributes.push_element(element),
                }
            }
        }
        log::debug!("re-emitted carried attributes into measure {:?}", measure.attribute("number"));
    }
}
