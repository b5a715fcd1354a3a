//! Track document model.
//!
//! A [`TrackDocument`] is the fully assembled, serialization-ready form of one
//! workout: metadata, lap/pause-aware segments of enriched points, and derived
//! summary waypoints. Documents are built once and never mutated afterwards.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::LocationPoint;

/// Running-form metrics attached to one track point.
///
/// Only emitted when stride length is present; the remaining fields ride
/// along when available.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunningDynamics {
    /// Stride length, m.
    pub stride_length: Option<f64>,
    /// Vertical oscillation, cm.
    pub vertical_oscillation: Option<f64>,
    /// Ground contact time, ms.
    pub ground_contact_time: Option<f64>,
}

/// Energy expenditure sub-block.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergyExt {
    /// Active energy, kcal.
    pub active: Option<f64>,
    /// Basal energy, kcal.
    pub basal: Option<f64>,
}

/// Physiological measurement sub-block.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysiologyExt {
    /// Respiratory rate, count/min.
    pub respiratory_rate: Option<f64>,
}

/// Gait metric sub-block.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WalkingDynamicsExt {
    /// Walking asymmetry, %.
    pub asymmetry: Option<f64>,
    /// Double support, %.
    pub double_support: Option<f64>,
    /// Step length, m.
    pub step_length: Option<f64>,
}

/// Ambient conditions sub-block.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvironmentExt {
    /// Water temperature, °C.
    pub water_temperature: Option<f64>,
}

/// Vertical movement sub-block.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MovementExt {
    /// Flights climbed, count.
    pub flights_climbed: Option<f64>,
    /// Stair ascent speed, m/s.
    pub stair_ascent_speed: Option<f64>,
    /// Stair descent speed, m/s.
    pub stair_descent_speed: Option<f64>,
}

/// The custom extensions group on one track point.
///
/// Each sub-block is only present when at least one of its members resolved,
/// so absent data never yields empty tags.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomExtensions {
    pub energy: Option<EnergyExt>,
    pub physiology: Option<PhysiologyExt>,
    pub walking_dynamics: Option<WalkingDynamicsExt>,
    pub environment: Option<EnvironmentExt>,
    pub movement: Option<MovementExt>,
}

impl CustomExtensions {
    /// True when no sub-block resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.energy.is_none()
            && self.physiology.is_none()
            && self.walking_dynamics.is_none()
            && self.environment.is_none()
            && self.movement.is_none()
    }
}

/// Sensor values attached to one track point, each independently optional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointExtensions {
    /// Heart rate, count/min.
    pub heart_rate: Option<f64>,
    /// Cadence from the dedicated cadence stream, rev/min.
    pub cadence: Option<f64>,
    /// Cadence derived from step-count density, steps/min.
    ///
    /// Independent of [`PointExtensions::cadence`]; both may be present.
    pub step_cadence: Option<f64>,
    /// Speed merged across activity-specific speed streams, m/s.
    pub speed: Option<f64>,
    /// Power merged across activity-specific power streams, W.
    pub power: Option<f64>,
    /// Air/body temperature, °C.
    pub temperature: Option<f64>,
    /// Running-form metrics; present only when stride length resolved.
    pub running_dynamics: Option<RunningDynamics>,
    /// Custom extensions group; present only when non-empty.
    pub custom: Option<CustomExtensions>,
}

impl PointExtensions {
    /// True when nothing at all was attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heart_rate.is_none()
            && self.cadence.is_none()
            && self.step_cadence.is_none()
            && self.speed.is_none()
            && self.power.is_none()
            && self.temperature.is_none()
            && self.running_dynamics.is_none()
            && self.custom.is_none()
    }
}

/// One route point plus the sensor values matched to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// The underlying GPS fix.
    pub location: LocationPoint,
    /// Matched sensor values; `None` when nothing resolved within tolerance.
    pub extensions: Option<PointExtensions>,
}

/// A contiguous run of track points treated as one recording interval.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackSegment {
    pub points: Vec<TrackPoint>,
}

/// A standalone annotated marker, not necessarily tied to a route coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// `(latitude, longitude)`; `None` means a placeholder position is
    /// emitted, marking the waypoint as a time-anchored annotation.
    pub position: Option<(f64, f64)>,
    /// Anchor time.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Short label.
    pub name: String,
    /// Longer description.
    pub description: String,
}

impl Waypoint {
    /// Create a placeholder-position waypoint.
    #[must_use]
    pub fn summary(timestamp: OffsetDateTime, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            position: None,
            timestamp,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Activity display name.
    pub name: String,
    /// Workout start.
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    /// Description carrying the workout id.
    pub description: String,
    /// Keyword string combining duration/distance/calories when available.
    pub keywords: String,
}

/// One workout's serialization-ready track document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDocument {
    pub metadata: Metadata,
    pub segments: Vec<TrackSegment>,
    pub waypoints: Vec<Waypoint>,
}

impl TrackDocument {
    /// Total number of track points across all segments.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|s| s.points.len()).sum()
    }
}
