//! Error types for gpxport-core.
//!
//! Failures are isolated at the smallest scope that preserves forward
//! progress:
//!
//! | Scope | Handling |
//! |-------|----------|
//! | Single stream fetch | Degrades to an empty stream, logged, never surfaced |
//! | Single workout | Workout is skipped, run continues |
//! | Whole run (availability, authorization, archive) | Surfaced as [`Error`] |
//!
//! Only run-level failures reach the caller. There is no automatic retry; a
//! failed run must be re-initiated from scratch.

use thiserror::Error;

/// Errors that can fail a whole export run.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The health-data source is unusable on this device.
    #[error("Health data is not available on this device")]
    Unavailable,

    /// Authorization was denied or the request itself errored.
    #[error("Health data authorization failed: {0}")]
    Authorization(String),

    /// The source failed while listing workouts.
    #[error("Failed to fetch workouts: {0}")]
    Fetch(String),

    /// Archive creation failed after per-workout processing completed.
    #[error("Failed to create archive: {0}")]
    Archive(String),

    /// Filesystem error outside the archive step.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Timestamp formatting failed while serializing a document.
    #[error("Time formatting error: {0}")]
    TimeFormat(#[from] time::error::Format),
}

/// Result type alias using gpxport-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors a [`crate::source::HealthSource`] call can produce.
///
/// Kept separate from [`Error`] so that per-stream and per-workout failures
/// can be absorbed without ever becoming run-level errors.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum SourceError {
    /// The underlying store rejected or failed the query.
    #[error("Source query failed: {0}")]
    Query(String),

    /// The caller is not authorized for this data type.
    #[error("Not authorized: {0}")]
    Denied(String),
}

/// Result type alias for source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
