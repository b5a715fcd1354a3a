//! End-to-end pipeline tests against the mock health source.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use gpxport_core::{ExportEvent, ExportOutcome, Exporter, MockSource};
use gpxport_types::{ActivityKind, LocationPoint, StreamKind, TimedSample, Workout};

fn at(seconds: i64) -> OffsetDateTime {
    datetime!(2024-06-01 08:00 UTC) + Duration::seconds(seconds)
}

fn running_workout() -> Workout {
    Workout::new(Uuid::new_v4(), ActivityKind::Running, at(0), at(1800))
}

fn read_archive(path: &Path) -> Vec<(String, String)> {
    let mut archive = tar::Archive::new(GzDecoder::new(File::open(path).unwrap()));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().display().to_string();
            let mut content = String::new();
            entry.read_to_string(&mut content).unwrap();
            (name, content)
        })
        .collect()
}

#[tokio::test]
async fn test_gap_split_and_tolerance_boundary() {
    // Two route points 40 s apart (> 30 s gap threshold) and one heart-rate
    // sample 5 s after the first point (exactly at tolerance).
    let workout = running_workout();
    let source = MockSource::new()
        .with_workout(workout.clone())
        .with_route(
            workout.id,
            vec![
                LocationPoint::new(at(0), 10.0, 20.0, -1.0),
                LocationPoint::new(at(40), 10.001, 20.0, -1.0),
            ],
        )
        .with_samples(
            workout.id,
            StreamKind::HeartRate,
            vec![TimedSample::new(at(5), 150.0, StreamKind::HeartRate)],
        );

    let out = tempfile::tempdir().unwrap();
    let outcome = Exporter::new().run(&source, out.path()).await.unwrap();
    let ExportOutcome::Completed { archive, documents } = outcome else {
        panic!("expected an archive");
    };
    assert_eq!(documents, 1);

    let entries = read_archive(&archive);
    assert_eq!(entries.len(), 1);
    let gpx = &entries[0].1;

    assert_eq!(gpx.matches("<trkseg>").count(), 2);
    assert_eq!(gpx.matches("<gpxtpx:hr>150</gpxtpx:hr>").count(), 1);
    // The second point is 35 s from the sample: no extension block at all.
    let second = gpx.split("<trkpt").nth(2).unwrap();
    assert!(!second.contains("<extensions>"));
}

#[tokio::test]
async fn test_zero_workouts_is_nothing_to_do() {
    let out = tempfile::tempdir().unwrap();
    let exporter = Exporter::new();
    let mut rx = exporter.subscribe();

    let outcome = exporter.run(&MockSource::new(), out.path()).await.unwrap();
    assert_eq!(outcome, ExportOutcome::NothingToDo);
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);

    let mut saw_nothing_to_do = false;
    while let Ok(event) = rx.try_recv() {
        if let ExportEvent::NothingToDo { status } = event {
            assert_eq!(status, "No workouts found");
            saw_nothing_to_do = true;
        }
    }
    assert!(saw_nothing_to_do);
}

#[tokio::test]
async fn test_routeless_workout_skipped_but_counts_for_date_range() {
    let recent = Workout::new(
        Uuid::new_v4(),
        ActivityKind::Cycling,
        datetime!(2024-06-03 09:00 UTC),
        datetime!(2024-06-03 10:00 UTC),
    );
    let older = Workout::new(
        Uuid::new_v4(),
        ActivityKind::Running,
        datetime!(2024-06-01 08:00 UTC),
        datetime!(2024-06-01 08:30 UTC),
    );
    // Most recent first; only the older one has a route.
    let source = MockSource::new()
        .with_workout(recent.clone())
        .with_workout(older.clone())
        .with_route(
            older.id,
            vec![LocationPoint::new(at(0), 10.0, 20.0, 100.0)],
        );

    let out = tempfile::tempdir().unwrap();
    let outcome = Exporter::new().run(&source, out.path()).await.unwrap();
    let ExportOutcome::Completed { archive, documents } = outcome else {
        panic!("expected an archive");
    };

    assert_eq!(documents, 1);
    assert_eq!(
        archive.file_name().unwrap().to_str().unwrap(),
        "activities-2024-06-01-to-2024-06-03.tar.gz"
    );
    let entries = read_archive(&archive);
    assert!(entries[0].0.starts_with("Running-2024-06-01-0800-"));
}

#[tokio::test]
async fn test_all_streams_empty_still_produces_document() {
    let workout = running_workout();
    let source = MockSource::new().with_workout(workout.clone()).with_route(
        workout.id,
        vec![
            LocationPoint::new(at(0), 10.0, 20.0, 100.0),
            LocationPoint::new(at(10), 10.001, 20.0, 101.0),
        ],
    );

    let out = tempfile::tempdir().unwrap();
    let outcome = Exporter::new().run(&source, out.path()).await.unwrap();
    let ExportOutcome::Completed { archive, .. } = outcome else {
        panic!("expected an archive");
    };

    let gpx = &read_archive(&archive)[0].1;
    assert_eq!(gpx.matches("<trkpt").count(), 2);
    assert!(!gpx.contains("<extensions>"));
    // The start waypoint is still present.
    assert!(gpx.contains("<name>Workout Start</name>"));
}

#[tokio::test]
async fn test_failed_stream_degrades_to_empty() {
    let workout = running_workout();
    let source = MockSource::new()
        .with_workout(workout.clone())
        .with_route(
            workout.id,
            vec![LocationPoint::new(at(0), 10.0, 20.0, 100.0)],
        )
        .with_samples(
            workout.id,
            StreamKind::CyclingCadence,
            vec![TimedSample::new(at(0), 85.0, StreamKind::CyclingCadence)],
        )
        .failing_stream(StreamKind::HeartRate);

    let out = tempfile::tempdir().unwrap();
    let outcome = Exporter::new().run(&source, out.path()).await.unwrap();
    let ExportOutcome::Completed { archive, documents } = outcome else {
        panic!("expected an archive");
    };
    assert_eq!(documents, 1);

    let gpx = &read_archive(&archive)[0].1;
    assert!(!gpx.contains("<gpxtpx:hr>"));
    assert!(gpx.contains("<gpxtpx:cad>85</gpxtpx:cad>"));
}

#[tokio::test]
async fn test_failed_workout_is_skipped_and_run_continues() {
    let bad = Workout::new(
        Uuid::new_v4(),
        ActivityKind::Cycling,
        datetime!(2024-06-02 09:00 UTC),
        datetime!(2024-06-02 10:00 UTC),
    );
    let good = running_workout();
    let source = MockSource::new()
        .with_workout(bad.clone())
        .with_workout(good.clone())
        .with_route(bad.id, vec![LocationPoint::new(at(0), 1.0, 2.0, 3.0)])
        .failing_route(bad.id)
        .with_route(
            good.id,
            vec![LocationPoint::new(at(0), 10.0, 20.0, 100.0)],
        );

    let out = tempfile::tempdir().unwrap();
    let exporter = Exporter::new();
    let mut rx = exporter.subscribe();
    let outcome = exporter.run(&source, out.path()).await.unwrap();
    let ExportOutcome::Completed { documents, .. } = outcome else {
        panic!("expected an archive");
    };
    assert_eq!(documents, 1);

    let mut skipped = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let ExportEvent::WorkoutSkipped { workout_id, .. } = event {
            skipped.push(workout_id);
        }
    }
    assert_eq!(skipped, vec![bad.id]);
}

#[tokio::test]
async fn test_unavailable_source_fails_before_fetch() {
    let out = tempfile::tempdir().unwrap();
    let err = Exporter::new()
        .run(&MockSource::new().unavailable(), out.path())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not available"));
}

#[tokio::test]
async fn test_denied_authorization_fails_run() {
    let out = tempfile::tempdir().unwrap();
    let err = Exporter::new()
        .run(&MockSource::new().deny_authorization(), out.path())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("authorization"));
}

#[tokio::test]
async fn test_progress_fractions_are_monotonic() {
    let workout = running_workout();
    let source = MockSource::new().with_workout(workout.clone()).with_route(
        workout.id,
        vec![LocationPoint::new(at(0), 10.0, 20.0, 100.0)],
    );

    let out = tempfile::tempdir().unwrap();
    let exporter = Exporter::new();
    let mut rx = exporter.subscribe();
    exporter.run(&source, out.path()).await.unwrap();

    let mut last = 0.0f32;
    let mut saw_completed = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            ExportEvent::Progress { fraction, .. } => {
                assert!(fraction >= last, "progress went backwards");
                last = fraction;
            }
            ExportEvent::Completed { .. } => saw_completed = true,
            _ => {}
        }
    }
    assert!(saw_completed);
    assert_eq!(last, 1.0);
}
