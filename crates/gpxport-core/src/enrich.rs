//! Per-point enrichment.
//!
//! For each route point, looks up the temporally nearest sample in every
//! relevant stream, accepting matches only within a fixed tolerance window,
//! and assembles the point's extension groups. Absent data never produces an
//! empty group: each group, and the extension block itself, is only emitted
//! when at least one member resolved.

use time::Duration;

use gpxport_types::{
    CustomExtensions, EnergyExt, EnvironmentExt, LocationPoint, MovementExt, PhysiologyExt,
    PointExtensions, RunningDynamics, StreamKind, TimedSample, TrackPoint, WalkingDynamicsExt,
};

use crate::index::{nearest_in, SampleIndex};

/// Maximum time distance for a sample to count as co-occurring with a route
/// point. Boundary-inclusive.
pub const SAMPLE_TOLERANCE: Duration = Duration::seconds(5);

/// Half-width of the synthetic window used to derive cadence from step
/// counts.
pub const STEP_WINDOW_HALF: Duration = Duration::seconds(30);

/// Streams merged into the single output speed value.
pub const SPEED_STREAMS: [StreamKind; 3] = [
    StreamKind::CyclingSpeed,
    StreamKind::RunningSpeed,
    StreamKind::WalkingSpeed,
];

/// Streams merged into the single output power value.
pub const POWER_STREAMS: [StreamKind; 2] = [StreamKind::CyclingPower, StreamKind::RunningPower];

/// Attaches nearest-in-time sample values to route points.
///
/// Holds the merged speed and power streams so they are built once per
/// workout rather than once per point.
#[derive(Debug)]
pub struct Enricher<'a> {
    index: &'a SampleIndex,
    speed: Vec<TimedSample>,
    power: Vec<TimedSample>,
}

impl<'a> Enricher<'a> {
    /// Create an enricher over one workout's sample index.
    #[must_use]
    pub fn new(index: &'a SampleIndex) -> Self {
        Self {
            index,
            speed: index.merged(&SPEED_STREAMS),
            power: index.merged(&POWER_STREAMS),
        }
    }

    /// Enrich one route point.
    #[must_use]
    pub fn enrich(&self, location: &LocationPoint) -> TrackPoint {
        let t = location.timestamp;
        let near = |kind| {
            self.index
                .nearest(kind, t, SAMPLE_TOLERANCE)
                .map(|s: &TimedSample| s.value)
        };

        let running_dynamics = near(StreamKind::RunningStrideLength).map(|stride| RunningDynamics {
            stride_length: Some(stride),
            vertical_oscillation: near(StreamKind::RunningVerticalOscillation).map(|m| m * 100.0),
            ground_contact_time: near(StreamKind::RunningGroundContactTime).map(|s| s * 1000.0),
        });

        let custom = self.custom_extensions(&near);

        let extensions = PointExtensions {
            heart_rate: near(StreamKind::HeartRate),
            cadence: near(StreamKind::CyclingCadence),
            step_cadence: self.step_cadence(t),
            speed: nearest_in(&self.speed, t, SAMPLE_TOLERANCE).map(|s| s.value),
            power: nearest_in(&self.power, t, SAMPLE_TOLERANCE).map(|s| s.value),
            temperature: near(StreamKind::BodyTemperature),
            running_dynamics,
            custom,
        };

        TrackPoint {
            location: *location,
            extensions: (!extensions.is_empty()).then_some(extensions),
        }
    }

    fn custom_extensions(
        &self,
        near: &impl Fn(StreamKind) -> Option<f64>,
    ) -> Option<CustomExtensions> {
        let energy = EnergyExt {
            active: near(StreamKind::ActiveEnergy),
            basal: near(StreamKind::BasalEnergy),
        };
        let physiology = PhysiologyExt {
            respiratory_rate: near(StreamKind::RespiratoryRate),
        };
        let walking = WalkingDynamicsExt {
            asymmetry: near(StreamKind::WalkingAsymmetry),
            double_support: near(StreamKind::WalkingDoubleSupport),
            step_length: near(StreamKind::WalkingStepLength),
        };
        let environment = EnvironmentExt {
            water_temperature: near(StreamKind::WaterTemperature),
        };
        let movement = MovementExt {
            flights_climbed: near(StreamKind::FlightsClimbed),
            stair_ascent_speed: near(StreamKind::StairAscentSpeed),
            stair_descent_speed: near(StreamKind::StairDescentSpeed),
        };

        let custom = CustomExtensions {
            energy: (energy.active.is_some() || energy.basal.is_some()).then_some(energy),
            physiology: physiology.respiratory_rate.is_some().then_some(physiology),
            walking_dynamics: (walking.asymmetry.is_some()
                || walking.double_support.is_some()
                || walking.step_length.is_some())
            .then_some(walking),
            environment: environment.water_temperature.is_some().then_some(environment),
            movement: (movement.flights_climbed.is_some()
                || movement.stair_ascent_speed.is_some()
                || movement.stair_descent_speed.is_some())
            .then_some(movement),
        };
        (!custom.is_empty()).then_some(custom)
    }

    /// Cadence in steps/min derived from step-count density around `t`.
    ///
    /// Sums the step-count samples inside a ±[`STEP_WINDOW_HALF`] window; the
    /// window spans one minute, so the sum is already a per-minute rate.
    fn step_cadence(&self, t: time::OffsetDateTime) -> Option<f64> {
        let window = self
            .index
            .window(StreamKind::StepCount, t - STEP_WINDOW_HALF, t + STEP_WINDOW_HALF);
        if window.is_empty() {
            return None;
        }
        Some(window.iter().map(|s| s.value).sum())
    }
}
