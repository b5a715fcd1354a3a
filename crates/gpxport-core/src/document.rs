//! Track document assembly.
//!
//! Combines the segmenter, the enricher, and the sample index's aggregates
//! into one serialization-ready [`TrackDocument`] per workout: a metadata
//! block, lap/pause-aware segments of enriched points, and derived summary
//! waypoints (maxima, averages, totals).
//!
//! Elevation comes only from the route's own per-point readings; no sample
//! stream is consulted for altitude.

use time::format_description::well_known::Rfc3339;

use gpxport_types::{
    EventKind, LocationPoint, Metadata, StreamKind, TimedSample, TrackDocument, TrackSegment,
    Waypoint, Workout, WorkoutEvent,
};

use crate::enrich::{Enricher, POWER_STREAMS, SPEED_STREAMS};
use crate::index::SampleIndex;
use crate::segment::segment_route;

/// Convert a speed in m/s to pace in min/km. `None` at zero speed.
#[must_use]
pub fn pace_min_per_km(speed: f64) -> Option<f64> {
    (speed > 0.0).then(|| 1000.0 / 60.0 / speed)
}

/// Build the document for one workout.
///
/// Returns `None` when the route is empty: such a workout contributes no
/// output file (but still participates in archive date-range naming).
#[must_use]
pub fn build_document(
    workout: &Workout,
    route: &[LocationPoint],
    events: &[WorkoutEvent],
    index: &SampleIndex,
) -> Option<TrackDocument> {
    if route.is_empty() {
        return None;
    }

    let enricher = Enricher::new(index);
    let segments = segment_route(route, events)
        .into_iter()
        .map(|points| TrackSegment {
            points: points.iter().map(|p| enricher.enrich(p)).collect(),
        })
        .collect();

    Some(TrackDocument {
        metadata: metadata(workout),
        segments,
        waypoints: waypoints(workout, events, index),
    })
}

fn metadata(workout: &Workout) -> Metadata {
    let mut keywords = vec![format!("{} min", workout.duration().whole_minutes())];
    if let Some(distance) = workout.total_distance {
        keywords.push(format!("{:.2} km", distance / 1000.0));
    }
    if let Some(energy) = workout.total_energy {
        keywords.push(format!("{energy:.0} kcal"));
    }

    Metadata {
        name: workout.activity.display_name().to_string(),
        time: workout.start,
        description: format!("{} workout {}", workout.activity, workout.id),
        keywords: keywords.join(", "),
    }
}

fn waypoints(workout: &Workout, events: &[WorkoutEvent], index: &SampleIndex) -> Vec<Waypoint> {
    let mut waypoints = vec![start_waypoint(workout)];

    for (n, lap) in events
        .iter()
        .filter(|e| e.kind == EventKind::Lap)
        .enumerate()
    {
        let when = lap
            .start
            .format(&Rfc3339)
            .unwrap_or_else(|_| lap.start.to_string());
        waypoints.push(Waypoint::summary(
            lap.start,
            format!("Lap {}", n + 1),
            format!("Lap {} at {}", n + 1, when),
        ));
    }

    if let Some(peak) = max_by_value(&index.merged(&POWER_STREAMS)) {
        waypoints.push(Waypoint::summary(
            peak.timestamp,
            "Max Power",
            format!("{:.0} W", peak.value),
        ));
    }

    if let Some(peak) = index.max_by_value(StreamKind::HeartRate) {
        waypoints.push(Waypoint::summary(
            peak.timestamp,
            "Max Heart Rate",
            format!("{:.0} count/min", peak.value),
        ));
    }

    if let Some(peak) = max_by_value(&index.merged(&SPEED_STREAMS)) {
        let description = match pace_min_per_km(peak.value) {
            Some(pace) => format!("{:.2} m/s ({:.2} min/km)", peak.value, pace),
            None => format!("{:.2} m/s", peak.value),
        };
        waypoints.push(Waypoint::summary(peak.timestamp, "Max Speed", description));
    }

    // First available sample, deliberately not a maximum: VO2 max is already
    // an aggregate estimate on the source side.
    if let Some(first) = index.first(StreamKind::Vo2Max) {
        waypoints.push(Waypoint::summary(
            first.timestamp,
            "VO2 Max",
            format!("{:.1} mL/kg/min", first.value),
        ));
    }

    if let Some(peak) = index.max_by_value(StreamKind::RespiratoryRate) {
        waypoints.push(Waypoint::summary(
            peak.timestamp,
            "Max Respiratory Rate",
            format!("{:.1} count/min", peak.value),
        ));
    }

    let flights = index.sum(StreamKind::FlightsClimbed);
    if flights > 0.0 {
        waypoints.push(Waypoint::summary(
            workout.start,
            "Flights Climbed",
            format!("{flights:.0} flights"),
        ));
    }

    if workout.activity.is_footborne() {
        if let Some(mean) = index.mean(StreamKind::RunningSpeed) {
            if let Some(pace) = pace_min_per_km(mean) {
                waypoints.push(Waypoint::summary(
                    workout.start,
                    "Average Pace",
                    format!("{pace:.2} min/km"),
                ));
            }
        }
    }

    waypoints
}

fn start_waypoint(workout: &Workout) -> Waypoint {
    let mut parts = vec![
        workout.activity.display_name().to_string(),
        format!("{} min", workout.duration().whole_minutes()),
    ];
    if let Some(distance) = workout.total_distance {
        parts.push(format!("{:.2} km", distance / 1000.0));
    }
    if let Some(energy) = workout.total_energy {
        parts.push(format!("{energy:.0} kcal"));
    }
    Waypoint::summary(workout.start, "Workout Start", parts.join(", "))
}

fn max_by_value(samples: &[TimedSample]) -> Option<&TimedSample> {
    samples.iter().max_by(|a, b| a.value.total_cmp(&b.value))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    use gpxport_types::ActivityKind;

    use super::*;

    fn at(seconds: i64) -> OffsetDateTime {
        datetime!(2024-06-01 08:00 UTC) + Duration::seconds(seconds)
    }

    fn workout(activity: ActivityKind) -> Workout {
        let mut w = Workout::new(Uuid::new_v4(), activity, at(0), at(1800));
        w.total_distance = Some(5200.0);
        w.total_energy = Some(250.0);
        w
    }

    fn route() -> Vec<LocationPoint> {
        (0..6)
            .map(|i| LocationPoint::new(at(i * 10), 10.0 + i as f64 * 1e-4, 20.0, 100.0))
            .collect()
    }

    fn sample(seconds: i64, value: f64, kind: StreamKind) -> TimedSample {
        TimedSample::new(at(seconds), value, kind)
    }

    #[test]
    fn test_empty_route_produces_no_document() {
        let index = SampleIndex::default();
        assert!(build_document(&workout(ActivityKind::Running), &[], &[], &index).is_none());
    }

    #[test]
    fn test_metadata_keywords() {
        let index = SampleIndex::default();
        let doc = build_document(&workout(ActivityKind::Running), &route(), &[], &index).unwrap();
        assert_eq!(doc.metadata.name, "Running");
        assert_eq!(doc.metadata.keywords, "30 min, 5.20 km, 250 kcal");
        assert!(doc.metadata.description.contains("Running"));
    }

    #[test]
    fn test_start_waypoint_always_present() {
        let index = SampleIndex::default();
        let doc = build_document(&workout(ActivityKind::Cycling), &route(), &[], &index).unwrap();
        assert_eq!(doc.waypoints.len(), 1);
        assert_eq!(doc.waypoints[0].name, "Workout Start");
    }

    #[test]
    fn test_lap_waypoints_numbered_from_one() {
        let index = SampleIndex::default();
        let events = vec![
            WorkoutEvent::new(at(15), EventKind::Lap),
            WorkoutEvent::new(at(35), EventKind::Lap),
        ];
        let doc = build_document(&workout(ActivityKind::Running), &route(), &events, &index).unwrap();
        let names: Vec<&str> = doc.waypoints.iter().map(|w| w.name.as_str()).collect();
        assert!(names.contains(&"Lap 1"));
        assert!(names.contains(&"Lap 2"));
    }

    #[test]
    fn test_peak_waypoints_only_for_non_empty_streams() {
        let index = SampleIndex::from_samples([
            sample(10, 172.0, StreamKind::HeartRate),
            sample(20, 168.0, StreamKind::HeartRate),
            sample(10, 240.0, StreamKind::RunningPower),
        ]);
        let doc = build_document(&workout(ActivityKind::Running), &route(), &[], &index).unwrap();
        let find = |name: &str| doc.waypoints.iter().find(|w| w.name == name);
        assert_eq!(find("Max Heart Rate").unwrap().description, "172 count/min");
        assert_eq!(find("Max Power").unwrap().description, "240 W");
        assert!(find("Max Speed").is_none());
        assert!(find("VO2 Max").is_none());
    }

    #[test]
    fn test_max_speed_reports_pace_guarded_at_zero() {
        let index = SampleIndex::from_samples([sample(10, 0.0, StreamKind::CyclingSpeed)]);
        let doc = build_document(&workout(ActivityKind::Cycling), &route(), &[], &index).unwrap();
        let wpt = doc.waypoints.iter().find(|w| w.name == "Max Speed").unwrap();
        assert_eq!(wpt.description, "0.00 m/s");
    }

    #[test]
    fn test_vo2_uses_first_sample_not_maximum() {
        let index = SampleIndex::from_samples([
            sample(10, 41.0, StreamKind::Vo2Max),
            sample(20, 44.0, StreamKind::Vo2Max),
        ]);
        let doc = build_document(&workout(ActivityKind::Running), &route(), &[], &index).unwrap();
        let wpt = doc.waypoints.iter().find(|w| w.name == "VO2 Max").unwrap();
        assert_eq!(wpt.description, "41.0 mL/kg/min");
    }

    #[test]
    fn test_flights_summary_requires_positive_sum() {
        let index = SampleIndex::from_samples([sample(10, 0.0, StreamKind::FlightsClimbed)]);
        let doc = build_document(&workout(ActivityKind::Walking), &route(), &[], &index).unwrap();
        assert!(!doc.waypoints.iter().any(|w| w.name == "Flights Climbed"));

        let index = SampleIndex::from_samples([
            sample(10, 2.0, StreamKind::FlightsClimbed),
            sample(20, 3.0, StreamKind::FlightsClimbed),
        ]);
        let doc = build_document(&workout(ActivityKind::Walking), &route(), &[], &index).unwrap();
        let wpt = doc.waypoints.iter().find(|w| w.name == "Flights Climbed").unwrap();
        assert_eq!(wpt.description, "5 flights");
    }

    #[test]
    fn test_average_pace_gated_on_activity_and_stream() {
        let samples = [sample(10, 2.5, StreamKind::RunningSpeed)];

        let index = SampleIndex::from_samples(samples);
        let doc = build_document(&workout(ActivityKind::Cycling), &route(), &[], &index).unwrap();
        assert!(!doc.waypoints.iter().any(|w| w.name == "Average Pace"));

        let doc = build_document(&workout(ActivityKind::Running), &route(), &[], &index).unwrap();
        let wpt = doc.waypoints.iter().find(|w| w.name == "Average Pace").unwrap();
        // 2.5 m/s -> 6.67 min/km
        assert_eq!(wpt.description, "6.67 min/km");
    }

    #[test]
    fn test_summary_waypoints_have_placeholder_positions() {
        let index = SampleIndex::from_samples([sample(10, 172.0, StreamKind::HeartRate)]);
        let doc = build_document(&workout(ActivityKind::Running), &route(), &[], &index).unwrap();
        assert!(doc.waypoints.iter().all(|w| w.position.is_none()));
    }

    #[test]
    fn test_segments_carry_enriched_points() {
        let index = SampleIndex::from_samples([sample(0, 150.0, StreamKind::HeartRate)]);
        let doc = build_document(&workout(ActivityKind::Running), &route(), &[], &index).unwrap();
        assert_eq!(doc.segments.len(), 1);
        let first = &doc.segments[0].points[0];
        assert_eq!(first.extensions.as_ref().unwrap().heart_rate, Some(150.0));
    }
}
