//! `score-partwise` documents
//!
//! Thin wrapper over [`XmlDocument`] that checks the root element and gives
//! the part/measure views the resolver and slicer share.

use super::tree::{XmlDocument, XmlElement};
use crate::errors::{EmaError, Result};

/// A parsed MusicXML `score-partwise` document
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreDocument {
    xml: XmlDocument,
}

impl ScoreDocument {
    /// Parse MusicXML text
    pub fn parse(musicxml: &str) -> Result<Self> {
        let xml = XmlDocument::parse(musicxml)?;
        match xml.root.name.as_str() {
            "score-partwise" => Ok(ScoreDocument { xml }),
            "score-timewise" => Err(EmaError::MalformedDocument(
                "score-timewise is not supported (convert to score-partwise)".to_string(),
            )),
            other => Err(EmaError::MalformedDocument(format!(
                "expected <score-partwise> root, found <{}>",
                other
            ))),
        }
    }

    pub fn to_xml_string(&self) -> Result<String> {
        self.xml.to_xml_string()
    }

    pub fn root(&self) -> &XmlElement {
        &self.xml.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.xml.root
    }

    /// `<part>` elements in document order
    pub fn parts(&self) -> impl Iterator<Item = &XmlElement> {
        self.xml.root.elements_named("part")
    }

    pub fn part_count(&self) -> usize {
        self.parts().count()
    }

    /// `<score-part>` roster entries in document order
    pub fn roster(&self) -> impl Iterator<Item = &XmlElement> {
        self.xml
            .root
            .child("part-list")
            .into_iter()
            .flat_map(|list| list.elements_named("score-part"))
    }
}

/// Numeric measure identifiers, assigned in document order within a part
///
/// The `number` attribute is used when it is an integer; otherwise (missing,
/// or something like `7a`) the measure takes the previous identifier plus one.
#[derive(Debug, Default, Clone)]
pub struct MeasureNumbering {
    previous: Option<u32>,
}

impl MeasureNumbering {
    pub fn next(&mut self, measure: &XmlElement) -> u32 {
        let number = measure
            .attribute("number")
            .and_then(|n| n.trim().parse::<u32>().ok())
            .unwrap_or_else(|| self.previous.map_or(1, |previous| previous + 1));
        self.previous = Some(number);
        number
    }
}
