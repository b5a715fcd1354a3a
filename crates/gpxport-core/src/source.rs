//! Trait abstraction over the health-data source.
//!
//! This module provides the [`HealthSource`] trait that abstracts over the
//! platform health store and mock sources for testing. The export pipeline
//! only ever talks to this trait, so it carries no platform dependency.

use async_trait::async_trait;

use gpxport_types::{LocationPoint, StreamKind, TimedSample, Workout, WorkoutEvent};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::SourceResult;

/// Opaque handle to a workout's route.
///
/// Routes are fetched in two steps (route object, then its points) because
/// the underlying store exposes them that way; a workout may have no route
/// at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRef {
    /// Identifier of the owning workout.
    pub workout_id: Uuid,
}

/// Trait abstracting the health-data source.
///
/// All operations are potentially failing and potentially empty-returning.
/// The pipeline decides per call site whether a failure is fatal (listing
/// workouts), skips a workout (route fetch), or degrades to empty data
/// (single stream fetch).
///
/// # Example
///
/// ```ignore
/// use gpxport_core::{HealthSource, SourceResult};
///
/// async fn count_workouts<S: HealthSource>(source: &S) -> SourceResult<usize> {
///     Ok(source.workouts().await?.len())
/// }
/// ```
#[async_trait]
pub trait HealthSource: Send + Sync {
    /// Check whether health data exists on this device at all.
    async fn is_available(&self) -> bool;

    /// Request read authorization for workouts, routes, and all stream kinds.
    async fn request_authorization(&self) -> SourceResult<()>;

    /// List all workouts, most recent first.
    async fn workouts(&self) -> SourceResult<Vec<Workout>>;

    /// Get the route for a workout, if one was recorded.
    async fn route(&self, workout: &Workout) -> SourceResult<Option<RouteRef>>;

    /// Get all location points for a route, ordered by timestamp.
    async fn route_points(&self, route: &RouteRef) -> SourceResult<Vec<LocationPoint>>;

    /// Get all samples of one stream kind within `[start, end]`, ordered by
    /// timestamp ascending. An empty window is an empty list, not an error.
    async fn samples(
        &self,
        workout_id: Uuid,
        kind: StreamKind,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> SourceResult<Vec<TimedSample>>;

    /// Get the lap/pause/resume events for a workout, ordered by start time.
    async fn events(&self, workout: &Workout) -> SourceResult<Vec<WorkoutEvent>>;
}
