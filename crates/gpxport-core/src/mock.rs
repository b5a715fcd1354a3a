//! Mock health-data source for testing.
//!
//! This module provides a mock source that can be used for unit testing
//! without a platform health store.
//!
//! The [`MockSource`] implements the [`HealthSource`] trait, allowing it to
//! be used interchangeably with real sources in generic code.
//!
//! # Features
//!
//! - **Failure injection**: fail the availability check, authorization, the
//!   workout list, a single route fetch, or individual stream kinds
//! - **Fixtures**: routes, events, and per-stream samples keyed by workout

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use gpxport_types::{LocationPoint, StreamKind, TimedSample, Workout, WorkoutEvent};

use crate::error::{SourceError, SourceResult};
use crate::source::{HealthSource, RouteRef};

/// A mock health-data source for testing.
///
/// Built up with chainable `with_*` methods before use; immutable afterwards.
///
/// # Example
///
/// ```
/// use gpxport_core::MockSource;
///
/// let source = MockSource::new().unavailable();
/// ```
#[derive(Debug, Default)]
pub struct MockSource {
    unavailable: bool,
    deny_authorization: bool,
    fail_workout_list: bool,
    workouts: Vec<Workout>,
    routes: HashMap<Uuid, Vec<LocationPoint>>,
    events: HashMap<Uuid, Vec<WorkoutEvent>>,
    samples: HashMap<(Uuid, StreamKind), Vec<TimedSample>>,
    failing_streams: HashSet<StreamKind>,
    failing_routes: HashSet<Uuid>,
}

impl MockSource {
    /// Create an empty, available, authorized source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a workout. Order of insertion is the order returned by
    /// [`HealthSource::workouts`], so insert most recent first.
    #[must_use]
    pub fn with_workout(mut self, workout: Workout) -> Self {
        self.workouts.push(workout);
        self
    }

    /// Attach a route to a workout. An empty point list still counts as a
    /// present route.
    #[must_use]
    pub fn with_route(mut self, workout_id: Uuid, points: Vec<LocationPoint>) -> Self {
        self.routes.insert(workout_id, points);
        self
    }

    /// Attach events to a workout.
    #[must_use]
    pub fn with_events(mut self, workout_id: Uuid, events: Vec<WorkoutEvent>) -> Self {
        self.events.insert(workout_id, events);
        self
    }

    /// Attach samples of one stream kind to a workout.
    #[must_use]
    pub fn with_samples(
        mut self,
        workout_id: Uuid,
        kind: StreamKind,
        samples: Vec<TimedSample>,
    ) -> Self {
        self.samples.insert((workout_id, kind), samples);
        self
    }

    /// Make the availability check report no health data on this device.
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Make the authorization request fail.
    #[must_use]
    pub fn deny_authorization(mut self) -> Self {
        self.deny_authorization = true;
        self
    }

    /// Make the workout listing fail.
    #[must_use]
    pub fn failing_workout_list(mut self) -> Self {
        self.fail_workout_list = true;
        self
    }

    /// Make every fetch of one stream kind fail.
    #[must_use]
    pub fn failing_stream(mut self, kind: StreamKind) -> Self {
        self.failing_streams.insert(kind);
        self
    }

    /// Make the route-point fetch for one workout fail.
    #[must_use]
    pub fn failing_route(mut self, workout_id: Uuid) -> Self {
        self.failing_routes.insert(workout_id);
        self
    }
}

#[async_trait]
impl HealthSource for MockSource {
    async fn is_available(&self) -> bool {
        !self.unavailable
    }

    async fn request_authorization(&self) -> SourceResult<()> {
        if self.deny_authorization {
            Err(SourceError::Denied("mock authorization denied".into()))
        } else {
            Ok(())
        }
    }

    async fn workouts(&self) -> SourceResult<Vec<Workout>> {
        if self.fail_workout_list {
            return Err(SourceError::Query("mock workout list failure".into()));
        }
        Ok(self.workouts.clone())
    }

    async fn route(&self, workout: &Workout) -> SourceResult<Option<RouteRef>> {
        Ok(self.routes.contains_key(&workout.id).then(|| RouteRef {
            workout_id: workout.id,
        }))
    }

    async fn route_points(&self, route: &RouteRef) -> SourceResult<Vec<LocationPoint>> {
        if self.failing_routes.contains(&route.workout_id) {
            return Err(SourceError::Query("mock route failure".into()));
        }
        Ok(self.routes.get(&route.workout_id).cloned().unwrap_or_default())
    }

    async fn samples(
        &self,
        workout_id: Uuid,
        kind: StreamKind,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> SourceResult<Vec<TimedSample>> {
        if self.failing_streams.contains(&kind) {
            return Err(SourceError::Query(format!("mock failure for {kind}")));
        }
        let samples = self
            .samples
            .get(&(workout_id, kind))
            .map(|list| {
                list.iter()
                    .filter(|s| s.timestamp >= start && s.timestamp <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        Ok(samples)
    }

    async fn events(&self, workout: &Workout) -> SourceResult<Vec<WorkoutEvent>> {
        Ok(self.events.get(&workout.id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use gpxport_types::ActivityKind;

    use super::*;

    fn workout() -> Workout {
        Workout::new(
            Uuid::new_v4(),
            ActivityKind::Running,
            datetime!(2024-06-01 08:00 UTC),
            datetime!(2024-06-01 08:30 UTC),
        )
    }

    #[tokio::test]
    async fn test_samples_filtered_to_window() {
        let w = workout();
        let source = MockSource::new().with_samples(
            w.id,
            StreamKind::HeartRate,
            vec![
                TimedSample::new(datetime!(2024-06-01 07:59 UTC), 140.0, StreamKind::HeartRate),
                TimedSample::new(datetime!(2024-06-01 08:10 UTC), 150.0, StreamKind::HeartRate),
            ],
        );

        let inside = source
            .samples(w.id, StreamKind::HeartRate, w.start, w.end)
            .await
            .unwrap();
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].value, 150.0);
    }

    #[tokio::test]
    async fn test_failing_stream_only_affects_that_kind() {
        let w = workout();
        let source = MockSource::new().failing_stream(StreamKind::HeartRate);

        assert!(source
            .samples(w.id, StreamKind::HeartRate, w.start, w.end)
            .await
            .is_err());
        assert!(source
            .samples(w.id, StreamKind::StepCount, w.start, w.end)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_absent_route_is_none() {
        let w = workout();
        let source = MockSource::new().with_workout(w.clone());
        assert!(source.route(&w).await.unwrap().is_none());
    }
}
