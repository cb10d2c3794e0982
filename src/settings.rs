//! Slice settings
//!
//! Passed as optional JSON across the WASM boundary; every field has a
//! default, so `{}` (or no settings at all) means plain selector semantics.

use crate::parse::{Completeness, ParseOptions};
use serde::{Deserialize, Serialize};

/// What to do with selector endpoints that fall outside the document
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsPolicy {
    /// Report `OutOfBounds`
    #[default]
    Fail,
    /// Clamp endpoints into the document; ranges entirely outside select nothing
    Clamp,
}

/// Options for [`crate::slice_musicxml`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceSettings {
    pub bounds_policy: BoundsPolicy,
    /// Coalesce adjacent measure ranges (`1-2,3-4` → `1-4`) while parsing
    pub merge_measure_ranges: bool,
    /// Replace the selector's completeness field
    pub completeness_override: Option<Completeness>,
}

impl SliceSettings {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            merge_measure_ranges: self.merge_measure_ranges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let settings: SliceSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, SliceSettings::default());
        assert_eq!(settings.bounds_policy, BoundsPolicy::Fail);
    }

    #[test]
    fn test_partial_json() {
        let settings: SliceSettings =
            serde_json::from_str(r#"{"bounds_policy":"clamp","completeness_override":"cut"}"#).unwrap();
        assert_eq!(settings.bounds_policy, BoundsPolicy::Clamp);
        assert_eq!(settings.completeness_override, Some(Completeness::Cut));
        assert!(!settings.parse_options().merge_measure_ranges);
    }

    #[test]
    fn test_rejects_unknown_policy() {
        assert!(serde_json::from_str::<SliceSettings>(r#"{"bounds_policy":"wrap"}"#).is_err());
    }
}
