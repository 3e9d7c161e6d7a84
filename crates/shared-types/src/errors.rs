//! # Error Types
//!
//! Parsing errors for the shared value types.

use thiserror::Error;

/// Errors produced when parsing a [`crate::Weight`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeightParseError {
    /// Input was empty or only a sign.
    #[error("Empty weight literal")]
    Empty,

    /// Input contained something other than digits, one dot and a sign.
    #[error("Invalid weight literal: {0}")]
    Invalid(String),

    /// More than three fractional digits.
    #[error("Weight {0} exceeds 3-decimal precision")]
    TooPrecise(String),

    /// Value does not fit in the milli-ton range.
    #[error("Weight {0} out of range")]
    OutOfRange(String),
}
