//! Error types for extraction and mode parsing.

use thiserror::Error;

/// Errors produced while extracting metadata from a whole document.
///
/// Single-field extraction never fails: a field without a match is simply
/// absent. Only document-level validation can reject the input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Document text is not usable for pattern matching.
    #[error("malformed document text: {reason}")]
    MalformedText { reason: &'static str },
}

/// Errors produced when a wire value does not name a known mode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModeError {
    /// The value is outside the fixed enumeration.
    #[error("invalid mode '{given}': expected one of {allowed}")]
    Unknown {
        given: String,
        allowed: &'static str,
    },
}
