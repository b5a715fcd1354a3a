//! Core types for workout data.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::error::ParseError;

/// Elevation readings below this are treated as "no elevation recorded".
pub const ELEVATION_SENTINEL_FLOOR: f64 = -1000.0;

/// A quantity stream recognized by the export pipeline.
///
/// Each workout carries up to one time series per kind. The discriminant
/// doubles as a dense index into per-kind storage, so variants must stay
/// numbered 0..N without gaps.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new stream kinds
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
#[repr(u8)]
pub enum StreamKind {
    /// Heart rate, count/min.
    HeartRate = 0,
    /// Active energy burned, kcal.
    ActiveEnergy = 1,
    /// Basal energy burned, kcal.
    BasalEnergy = 2,
    /// Walking/running distance, m.
    DistanceWalkingRunning = 3,
    /// Cycling distance, m.
    DistanceCycling = 4,
    /// Swimming distance, m.
    DistanceSwimming = 5,
    /// Step count, count.
    StepCount = 6,
    /// Cycling cadence, rev/min.
    CyclingCadence = 7,
    /// Cycling power, W.
    CyclingPower = 8,
    /// Cycling speed, m/s.
    CyclingSpeed = 9,
    /// Running speed, m/s.
    RunningSpeed = 10,
    /// Running power, W.
    RunningPower = 11,
    /// Walking speed, m/s.
    WalkingSpeed = 12,
    /// Running stride length, m.
    RunningStrideLength = 13,
    /// Running vertical oscillation, m.
    RunningVerticalOscillation = 14,
    /// Running ground contact time, s.
    RunningGroundContactTime = 15,
    /// Respiratory rate, count/min.
    RespiratoryRate = 16,
    /// Body temperature, °C.
    BodyTemperature = 17,
    /// VO₂ max, mL/kg/min.
    Vo2Max = 18,
    /// Flights of stairs climbed, count.
    FlightsClimbed = 19,
    /// Stair ascent speed, m/s.
    StairAscentSpeed = 20,
    /// Stair descent speed, m/s.
    StairDescentSpeed = 21,
    /// Walking asymmetry, %.
    WalkingAsymmetry = 22,
    /// Walking double support, %.
    WalkingDoubleSupport = 23,
    /// Walking step length, m.
    WalkingStepLength = 24,
    /// Water temperature, °C.
    WaterTemperature = 25,
    /// Swimming stroke count, count.
    SwimmingStrokeCount = 26,
}

impl StreamKind {
    /// Every recognized stream kind, in discriminant order.
    pub const ALL: [StreamKind; 27] = [
        StreamKind::HeartRate,
        StreamKind::ActiveEnergy,
        StreamKind::BasalEnergy,
        StreamKind::DistanceWalkingRunning,
        StreamKind::DistanceCycling,
        StreamKind::DistanceSwimming,
        StreamKind::StepCount,
        StreamKind::CyclingCadence,
        StreamKind::CyclingPower,
        StreamKind::CyclingSpeed,
        StreamKind::RunningSpeed,
        StreamKind::RunningPower,
        StreamKind::WalkingSpeed,
        StreamKind::RunningStrideLength,
        StreamKind::RunningVerticalOscillation,
        StreamKind::RunningGroundContactTime,
        StreamKind::RespiratoryRate,
        StreamKind::BodyTemperature,
        StreamKind::Vo2Max,
        StreamKind::FlightsClimbed,
        StreamKind::StairAscentSpeed,
        StreamKind::StairDescentSpeed,
        StreamKind::WalkingAsymmetry,
        StreamKind::WalkingDoubleSupport,
        StreamKind::WalkingStepLength,
        StreamKind::WaterTemperature,
        StreamKind::SwimmingStrokeCount,
    ];

    /// Dense index of this kind, suitable for per-kind array storage.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Snake-case identifier for this kind, matching the serde form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StreamKind::HeartRate => "heart_rate",
            StreamKind::ActiveEnergy => "active_energy",
            StreamKind::BasalEnergy => "basal_energy",
            StreamKind::DistanceWalkingRunning => "distance_walking_running",
            StreamKind::DistanceCycling => "distance_cycling",
            StreamKind::DistanceSwimming => "distance_swimming",
            StreamKind::StepCount => "step_count",
            StreamKind::CyclingCadence => "cycling_cadence",
            StreamKind::CyclingPower => "cycling_power",
            StreamKind::CyclingSpeed => "cycling_speed",
            StreamKind::RunningSpeed => "running_speed",
            StreamKind::RunningPower => "running_power",
            StreamKind::WalkingSpeed => "walking_speed",
            StreamKind::RunningStrideLength => "running_stride_length",
            StreamKind::RunningVerticalOscillation => "running_vertical_oscillation",
            StreamKind::RunningGroundContactTime => "running_ground_contact_time",
            StreamKind::RespiratoryRate => "respiratory_rate",
            StreamKind::BodyTemperature => "body_temperature",
            StreamKind::Vo2Max => "vo2_max",
            StreamKind::FlightsClimbed => "flights_climbed",
            StreamKind::StairAscentSpeed => "stair_ascent_speed",
            StreamKind::StairDescentSpeed => "stair_descent_speed",
            StreamKind::WalkingAsymmetry => "walking_asymmetry",
            StreamKind::WalkingDoubleSupport => "walking_double_support",
            StreamKind::WalkingStepLength => "walking_step_length",
            StreamKind::WaterTemperature => "water_temperature",
            StreamKind::SwimmingStrokeCount => "swimming_stroke_count",
        }
    }

    /// Unit string for values in this stream.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            StreamKind::HeartRate | StreamKind::RespiratoryRate => "count/min",
            StreamKind::ActiveEnergy | StreamKind::BasalEnergy => "kcal",
            StreamKind::DistanceWalkingRunning
            | StreamKind::DistanceCycling
            | StreamKind::DistanceSwimming
            | StreamKind::RunningStrideLength
            | StreamKind::RunningVerticalOscillation
            | StreamKind::WalkingStepLength => "m",
            StreamKind::StepCount
            | StreamKind::FlightsClimbed
            | StreamKind::SwimmingStrokeCount => "count",
            StreamKind::CyclingCadence => "rev/min",
            StreamKind::CyclingPower | StreamKind::RunningPower => "W",
            StreamKind::CyclingSpeed
            | StreamKind::RunningSpeed
            | StreamKind::WalkingSpeed
            | StreamKind::StairAscentSpeed
            | StreamKind::StairDescentSpeed => "m/s",
            StreamKind::RunningGroundContactTime => "s",
            StreamKind::BodyTemperature | StreamKind::WaterTemperature => "°C",
            StreamKind::Vo2Max => "mL/kg/min",
            StreamKind::WalkingAsymmetry | StreamKind::WalkingDoubleSupport => "%",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StreamKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseError::UnknownStreamKind(s.to_string()))
    }
}

/// One measured value at one instant, belonging to a single stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedSample {
    /// When the sample was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Numeric value in the stream's unit.
    pub value: f64,
    /// Which stream this sample belongs to.
    pub kind: StreamKind,
}

impl TimedSample {
    /// Create a sample.
    #[must_use]
    pub fn new(timestamp: OffsetDateTime, value: f64, kind: StreamKind) -> Self {
        Self {
            timestamp,
            value,
            kind,
        }
    }
}

/// One GPS fix along a workout route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    /// When the fix was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Elevation in meters, if the fix carried a usable one.
    #[serde(default)]
    pub elevation: Option<f64>,
}

impl LocationPoint {
    /// Create a point from a raw fix, normalizing the elevation sentinel.
    ///
    /// Sources that lack altitude report either a large negative placeholder
    /// (below −1000 m) or exactly −1; both map to `None`.
    #[must_use]
    pub fn new(timestamp: OffsetDateTime, latitude: f64, longitude: f64, elevation: f64) -> Self {
        let elevation = if elevation < ELEVATION_SENTINEL_FLOOR || elevation == -1.0 {
            None
        } else {
            Some(elevation)
        };
        Self {
            timestamp,
            latitude,
            longitude,
            elevation,
        }
    }
}

/// Kind of a workout event.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new event kinds
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum EventKind {
    /// Lap marker.
    Lap,
    /// Recording paused.
    Pause,
    /// Recording resumed.
    Resume,
    /// Any other event; ignored by segmentation.
    Other,
}

/// A sparse event within a workout, ordered by start time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEvent {
    /// When the event started.
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    /// What happened.
    pub kind: EventKind,
}

impl WorkoutEvent {
    /// Create an event.
    #[must_use]
    pub fn new(start: OffsetDateTime, kind: EventKind) -> Self {
        Self { start, kind }
    }
}

/// Activity performed during a workout.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new activity kinds
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ActivityKind {
    Running,
    Cycling,
    Walking,
    Hiking,
    Swimming,
    Other,
}

impl ActivityKind {
    /// Human-readable name, also used in output filenames.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            ActivityKind::Running => "Running",
            ActivityKind::Cycling => "Cycling",
            ActivityKind::Walking => "Walking",
            ActivityKind::Hiking => "Hiking",
            ActivityKind::Swimming => "Swimming",
            ActivityKind::Other => "Workout",
        }
    }

    /// Whether the average-pace summary applies to this activity.
    #[must_use]
    pub const fn is_footborne(self) -> bool {
        matches!(self, ActivityKind::Running | ActivityKind::Walking)
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.display_name())
    }
}

impl FromStr for ActivityKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(ActivityKind::Running),
            "cycling" => Ok(ActivityKind::Cycling),
            "walking" => Ok(ActivityKind::Walking),
            "hiking" => Ok(ActivityKind::Hiking),
            "swimming" => Ok(ActivityKind::Swimming),
            "other" => Ok(ActivityKind::Other),
            _ => Err(ParseError::UnknownActivityKind(s.to_string())),
        }
    }
}

/// One recorded exercise session.
///
/// Constructed once per export run from the health-data source and treated
/// as read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Stable identifier assigned by the source.
    pub id: Uuid,
    /// Activity performed.
    pub activity: ActivityKind,
    /// Session start.
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    /// Session end.
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
    /// Total distance in meters, if the source recorded one.
    #[serde(default)]
    pub total_distance: Option<f64>,
    /// Total active energy in kcal, if the source recorded one.
    #[serde(default)]
    pub total_energy: Option<f64>,
}

impl Workout {
    /// Create a workout covering `[start, end]`.
    #[must_use]
    pub fn new(id: Uuid, activity: ActivityKind, start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self {
            id,
            activity,
            start,
            end,
            total_distance: None,
            total_energy: None,
        }
    }

    /// Session duration.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
