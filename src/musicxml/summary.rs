//! Read-only score summary
//!
//! Walks a MusicXML document with roxmltree (zero-copy) and reports what a
//! caller needs to write a selector: parts, their staves and measure numbers,
//! and how many pitched notes and rests each part holds.

use crate::errors::{EmaError, Result};
use roxmltree::{Document, Node, ParsingOptions};
use serde::Serialize;

/// One `<part>` of the score
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PartSummary {
    pub id: String,
    /// `<part-name>` from the matching `<score-part>`, when present
    pub name: Option<String>,
    /// Last `<staves>` value declared in the part (1 if never declared)
    pub staves: u32,
    /// `number` attributes of the measures, in order
    pub measures: Vec<String>,
    /// Pitched or unpitched notes, chord members included
    pub notes: usize,
    pub rests: usize,
}

/// Parts of a `score-partwise` document, in document order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScoreSummary {
    pub parts: Vec<PartSummary>,
    /// `<score-part>` ids listed in `<part-list>`
    pub roster: Vec<String>,
}

impl ScoreSummary {
    /// Total staves across all parts
    pub fn staff_count(&self) -> u32 {
        self.parts.iter().map(|part| part.staves).sum()
    }

    pub fn notes(&self) -> usize {
        self.parts.iter().map(|part| part.notes).sum()
    }

    pub fn rests(&self) -> usize {
        self.parts.iter().map(|part| part.rests).sum()
    }

    pub fn part(&self, id: &str) -> Option<&PartSummary> {
        self.parts.iter().find(|part| part.id == id)
    }
}

fn children_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| n.tag_name().name() == name)
}

/// Summarize a MusicXML document
pub fn summarize(musicxml: &str) -> Result<ScoreSummary> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(musicxml, options)
        .map_err(|e| EmaError::MalformedDocument(format!("XML parse error: {}", e)))?;

    let root = doc.root_element();
    if root.tag_name().name() != "score-partwise" {
        return Err(EmaError::MalformedDocument(format!(
            "expected <score-partwise> root, found <{}>",
            root.tag_name().name()
        )));
    }

    let score_parts: Vec<Node> = children_named(root, "part-list")
        .flat_map(|list| children_named(list, "score-part"))
        .collect();
    let roster = score_parts
        .iter()
        .filter_map(|sp| sp.attribute("id"))
        .map(str::to_string)
        .collect();

    let parts = children_named(root, "part")
        .map(|part| {
            let id = part.attribute("id").unwrap_or_default().to_string();
            let name = score_parts
                .iter()
                .find(|sp| sp.attribute("id") == Some(id.as_str()))
                .and_then(|sp| children_named(*sp, "part-name").next())
                .and_then(|n| n.text())
                .map(str::to_string);
            summarize_part(part, id, name)
        })
        .collect();

    Ok(ScoreSummary { parts, roster })
}

fn summarize_part(part: Node, id: String, name: Option<String>) -> PartSummary {
    let mut summary = PartSummary {
        id,
        name,
        staves: 1,
        measures: Vec::new(),
        notes: 0,
        rests: 0,
    };

    for measure in children_named(part, "measure") {
        summary
            .measures
            .push(measure.attribute("number").unwrap_or_default().to_string());

        for staves in children_named(measure, "attributes").flat_map(|a| children_named(a, "staves")) {
            if let Some(count) = staves.text().and_then(|t| t.trim().parse::<u32>().ok()) {
                summary.staves = count;
            }
        }

        for note in children_named(measure, "note") {
            if children_named(note, "rest").next().is_some() {
                summary.rests += 1;
            } else {
                summary.notes += 1;
            }
        }
    }

    summary
}
