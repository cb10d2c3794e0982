//! MusicXML document handling
//!
//! - `tree`: owned element tree with a verbatim quick-xml round trip
//! - `document`: the `score-partwise` wrapper the slicer edits
//! - `attributes`: divisions / time / staves carried between measures
//! - `duration`: note-type lookup for trimmed durations
//! - `summary`: read-only inspection with roxmltree

pub mod attributes;
pub mod document;
pub mod duration;
pub mod summary;
pub mod tree;

pub use document::{MeasureNumbering, ScoreDocument};
pub use summary::{summarize, PartSummary, ScoreSummary};
pub use tree::{XmlDocument, XmlElement, XmlNode};
