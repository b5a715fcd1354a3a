//! JSON snapshot health source.
//!
//! Reads a whole health-data snapshot from one JSON file and serves it
//! through the [`HealthSource`] trait. This is the CLI's stand-in for a
//! platform health store: useful for exports from data dumps and for
//! exercising the pipeline end to end.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use gpxport_core::{HealthSource, RouteRef, SourceResult};
use gpxport_types::{LocationPoint, StreamKind, TimedSample, Workout, WorkoutEvent};

/// One sample as stored in the snapshot; the kind comes from the map key.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SnapshotSample {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub value: f64,
}

/// One workout with its route, events, and streams.
#[derive(Debug, Deserialize)]
pub struct SnapshotWorkout {
    #[serde(flatten)]
    pub workout: Workout,
    /// `None` means no route was recorded; an empty list is a present but
    /// empty route.
    #[serde(default)]
    pub route: Option<Vec<LocationPoint>>,
    #[serde(default)]
    pub events: Vec<WorkoutEvent>,
    #[serde(default)]
    pub samples: HashMap<StreamKind, Vec<SnapshotSample>>,
}

/// A full snapshot file.
#[derive(Debug, Deserialize)]
pub struct Snapshot {
    pub workouts: Vec<SnapshotWorkout>,
}

/// [`HealthSource`] backed by an in-memory snapshot.
#[derive(Debug)]
pub struct SnapshotSource {
    workouts: Vec<SnapshotWorkout>,
}

impl SnapshotSource {
    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        debug!(
            "Loaded {} workout(s) from {}",
            snapshot.workouts.len(),
            path.display()
        );
        Ok(Self::new(snapshot))
    }

    /// Wrap an already-parsed snapshot, sorting workouts most recent first.
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        let mut workouts = snapshot.workouts;
        workouts.sort_by(|a, b| b.workout.start.cmp(&a.workout.start));
        Self { workouts }
    }

    fn find(&self, id: Uuid) -> Option<&SnapshotWorkout> {
        self.workouts.iter().find(|w| w.workout.id == id)
    }
}

#[async_trait]
impl HealthSource for SnapshotSource {
    async fn is_available(&self) -> bool {
        true
    }

    async fn request_authorization(&self) -> SourceResult<()> {
        Ok(())
    }

    async fn workouts(&self) -> SourceResult<Vec<Workout>> {
        Ok(self.workouts.iter().map(|w| w.workout.clone()).collect())
    }

    async fn route(&self, workout: &Workout) -> SourceResult<Option<RouteRef>> {
        Ok(self
            .find(workout.id)
            .and_then(|w| w.route.as_ref())
            .map(|_| RouteRef {
                workout_id: workout.id,
            }))
    }

    async fn route_points(&self, route: &RouteRef) -> SourceResult<Vec<LocationPoint>> {
        Ok(self
            .find(route.workout_id)
            .and_then(|w| w.route.clone())
            .unwrap_or_default())
    }

    async fn samples(
        &self,
        workout_id: Uuid,
        kind: StreamKind,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> SourceResult<Vec<TimedSample>> {
        let samples = self
            .find(workout_id)
            .and_then(|w| w.samples.get(&kind))
            .map(|list| {
                list.iter()
                    .filter(|s| s.timestamp >= start && s.timestamp <= end)
                    .map(|s| TimedSample::new(s.timestamp, s.value, kind))
                    .collect()
            })
            .unwrap_or_default();
        Ok(samples)
    }

    async fn events(&self, workout: &Workout) -> SourceResult<Vec<WorkoutEvent>> {
        Ok(self
            .find(workout.id)
            .map(|w| w.events.clone())
            .unwrap_or_default())
    }
}
