//! Platform-agnostic types for workout-to-GPX export.
//!
//! This crate provides the shared data model used by the export pipeline in
//! `gpxport-core` and by source adapters such as the CLI's JSON snapshot
//! source.
//!
//! # Contents
//!
//! - Workout-side inputs: [`Workout`], [`LocationPoint`], [`TimedSample`],
//!   [`WorkoutEvent`], and the 27 recognized [`StreamKind`]s
//! - Document-side outputs: [`TrackDocument`], [`TrackSegment`],
//!   [`TrackPoint`], [`Waypoint`] and the per-point extension groups
//! - Parse errors for text inputs
//!
//! # Example
//!
//! ```
//! use gpxport_types::StreamKind;
//!
//! assert_eq!(StreamKind::ALL.len(), 27);
//! assert_eq!(StreamKind::HeartRate.unit(), "count/min");
//! ```

pub mod document;
pub mod error;
pub mod types;

pub use document::{
    CustomExtensions, EnergyExt, EnvironmentExt, Metadata, MovementExt, PhysiologyExt,
    PointExtensions, RunningDynamics, TrackDocument, TrackPoint, TrackSegment,
    WalkingDynamicsExt, Waypoint,
};
pub use error::{ParseError, ParseResult};
pub use types::{
    ActivityKind, EventKind, LocationPoint, StreamKind, TimedSample, Workout, WorkoutEvent,
    ELEVATION_SENTINEL_FLOOR,
};
