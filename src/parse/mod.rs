//! Selector parsing
//!
//! Turns an EMA selector string such as `1-3/1+2/@1-2.5/cut` into a
//! [`RawExpression`] without consulting any score.

pub mod expression;
pub mod grammar;
pub mod tokens;

pub use expression::{BeatTerm, Completeness, ParseOptions, RawExpression};
pub use grammar::{parse, parse_with};
pub use tokens::{BeatPosition, Range, RangeUnit, Token, TokenValue};
