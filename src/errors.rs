//! Error types for EMA selection and score slicing
//!
//! Every failure is terminal for the slice in progress: the caller gets the
//! kind plus a message naming the offending token, measure or note.

use thiserror::Error;

/// Top-level error type shared by the parser, resolver and slicer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmaError {
    /// Selector grammar violation or an invalid start/end combination
    #[error("Malformed selector: {0}")]
    MalformedSelector(String),

    /// A resolved measure, staff or beat lies outside the document
    #[error("Selection out of bounds: {0}")]
    OutOfBounds(String),

    /// The score lacks an element the slicer needs (divisions, parts, ...)
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// A trimmed duration has no plain or dotted note type
    #[error("Trim failed: {0}")]
    TrimArithmeticFailure(String),

    /// Writing the sliced tree (or a JSON result) failed
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, EmaError>;

impl EmaError {
    /// Short machine-readable name, used by the WASM layer
    pub fn kind(&self) -> &'static str {
        match self {
            EmaError::MalformedSelector(_) => "malformed_selector",
            EmaError::OutOfBounds(_) => "out_of_bounds",
            EmaError::MalformedDocument(_) => "malformed_document",
            EmaError::TrimArithmeticFailure(_) => "trim_arithmetic_failure",
            EmaError::Serialization(_) => "serialization",
        }
    }
}
