//! Error types for data parsing in gpxport-types.

use thiserror::Error;

/// Errors that can occur when parsing workout data from text inputs.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The input named a stream kind that is not one of the recognized kinds.
    #[error("Unknown stream kind: {0}")]
    UnknownStreamKind(String),

    /// The input named an activity that is not one of the recognized kinds.
    #[error("Unknown activity kind: {0}")]
    UnknownActivityKind(String),
}

/// Result type alias using gpxport-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
