//! Time-indexed sample storage.
//!
//! The [`SampleIndex`] normalizes a workout's heterogeneous time series into
//! one queryable-by-time structure. Construction fans out one fetch per
//! recognized stream kind, all concurrent, and joins at a single barrier; a
//! failed stream degrades to an empty list so the other 26 are unaffected.
//!
//! Each stream is kept sorted by timestamp, so nearest-in-time lookups are a
//! binary search rather than a linear scan. With many points and many
//! streams this lookup is the dominant cost of enrichment.

use futures::future::join_all;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use gpxport_types::{StreamKind, TimedSample, Workout};

use crate::source::HealthSource;

/// Find the sample nearest in time to `t`, accepting it only within
/// `tolerance` (boundary-inclusive).
///
/// `samples` must be sorted by timestamp ascending. On an exact tie in time
/// distance the earlier sample wins; callers must not rely on that choice.
#[must_use]
pub fn nearest_in(
    samples: &[TimedSample],
    t: OffsetDateTime,
    tolerance: Duration,
) -> Option<&TimedSample> {
    if samples.is_empty() {
        return None;
    }
    let idx = samples.partition_point(|s| s.timestamp < t);
    let before = idx.checked_sub(1).map(|i| &samples[i]);
    let after = samples.get(idx);

    let best = match (before, after) {
        (Some(b), Some(a)) => {
            if t - b.timestamp <= a.timestamp - t {
                b
            } else {
                a
            }
        }
        (Some(b), None) => b,
        (None, Some(a)) => a,
        (None, None) => return None,
    };

    ((best.timestamp - t).abs() <= tolerance).then_some(best)
}

/// All of one workout's sample streams, each sorted by timestamp.
#[derive(Debug, Clone, Default)]
pub struct SampleIndex {
    streams: Vec<Vec<TimedSample>>,
}

impl SampleIndex {
    /// Fetch every recognized stream for `workout` from `source`.
    ///
    /// The 27 queries run concurrently and all complete before this returns
    /// (fan-out/fan-in, not fail-fast). A per-stream failure is logged and
    /// that stream resolves to empty; this function itself cannot fail.
    pub async fn fetch<S: HealthSource>(source: &S, workout: &Workout) -> Self {
        let fetches = StreamKind::ALL.map(|kind| async move {
            match source
                .samples(workout.id, kind, workout.start, workout.end)
                .await
            {
                Ok(mut samples) => {
                    samples.sort_by_key(|s| s.timestamp);
                    samples
                }
                Err(e) => {
                    warn!("Stream {kind} failed for workout {}: {e}", workout.id);
                    Vec::new()
                }
            }
        });
        let streams = join_all(fetches).await;
        let total: usize = streams.iter().map(Vec::len).sum();
        debug!("Indexed {total} samples for workout {}", workout.id);
        Self { streams }
    }

    /// Build an index directly from per-kind sample lists. Lists are sorted
    /// here, so callers may pass them in any order.
    #[must_use]
    pub fn from_streams(streams: impl IntoIterator<Item = Vec<TimedSample>>) -> Self {
        let mut streams: Vec<Vec<TimedSample>> = streams.into_iter().collect();
        streams.resize(StreamKind::ALL.len(), Vec::new());
        for stream in &mut streams {
            stream.sort_by_key(|s| s.timestamp);
        }
        Self { streams }
    }

    /// Build an index from a flat list of samples, routed by their kind tag.
    #[must_use]
    pub fn from_samples(samples: impl IntoIterator<Item = TimedSample>) -> Self {
        let mut streams = vec![Vec::new(); StreamKind::ALL.len()];
        for sample in samples {
            streams[sample.kind.index()].push(sample);
        }
        Self::from_streams(streams)
    }

    /// All samples of one kind, sorted by timestamp ascending.
    #[must_use]
    pub fn samples(&self, kind: StreamKind) -> &[TimedSample] {
        self.streams
            .get(kind.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All samples of one kind within `[start, end]`, sorted ascending.
    #[must_use]
    pub fn window(&self, kind: StreamKind, start: OffsetDateTime, end: OffsetDateTime) -> &[TimedSample] {
        let samples = self.samples(kind);
        let lo = samples.partition_point(|s| s.timestamp < start);
        let hi = samples.partition_point(|s| s.timestamp <= end);
        &samples[lo..hi]
    }

    /// Whether a stream has no samples.
    #[must_use]
    pub fn is_empty(&self, kind: StreamKind) -> bool {
        self.samples(kind).is_empty()
    }

    /// Nearest sample of one kind to `t` within `tolerance`.
    #[must_use]
    pub fn nearest(
        &self,
        kind: StreamKind,
        t: OffsetDateTime,
        tolerance: Duration,
    ) -> Option<&TimedSample> {
        nearest_in(self.samples(kind), t, tolerance)
    }

    /// Merge several streams into one timestamp-sorted list.
    ///
    /// Used for quantities recorded under activity-specific kinds (speed,
    /// power) that the output treats as one stream.
    #[must_use]
    pub fn merged(&self, kinds: &[StreamKind]) -> Vec<TimedSample> {
        let mut merged: Vec<TimedSample> = kinds
            .iter()
            .flat_map(|&kind| self.samples(kind).iter().copied())
            .collect();
        merged.sort_by_key(|s| s.timestamp);
        merged
    }

    /// Sample with the greatest value in one stream.
    #[must_use]
    pub fn max_by_value(&self, kind: StreamKind) -> Option<&TimedSample> {
        self.samples(kind)
            .iter()
            .max_by(|a, b| a.value.total_cmp(&b.value))
    }

    /// First (earliest) sample in one stream.
    #[must_use]
    pub fn first(&self, kind: StreamKind) -> Option<&TimedSample> {
        self.samples(kind).first()
    }

    /// Sum of all values in one stream.
    #[must_use]
    pub fn sum(&self, kind: StreamKind) -> f64 {
        self.samples(kind).iter().map(|s| s.value).sum()
    }

    /// Mean of all values in one stream, `None` when empty.
    #[must_use]
    pub fn mean(&self, kind: StreamKind) -> Option<f64> {
        let samples = self.samples(kind);
        if samples.is_empty() {
            return None;
        }
        Some(self.sum(kind) / samples.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    const TOLERANCE: Duration = Duration::seconds(5);

    fn hr(minute: u8, second: u8, value: f64) -> TimedSample {
        let ts = datetime!(2024-06-01 08:00 UTC) + Duration::minutes(i64::from(minute))
            + Duration::seconds(i64::from(second));
        TimedSample::new(ts, value, StreamKind::HeartRate)
    }

    // --- nearest_in tests ---

    #[test]
    fn test_empty_stream_never_matches() {
        let index = SampleIndex::default();
        for offset in [0i64, 1, 60, 3600] {
            let t = datetime!(2024-06-01 08:00 UTC) + Duration::seconds(offset);
            assert!(index.nearest(StreamKind::HeartRate, t, TOLERANCE).is_none());
        }
    }

    #[test]
    fn test_nearest_picks_smaller_distance() {
        let index = SampleIndex::from_samples([hr(0, 0, 140.0), hr(0, 8, 150.0)]);
        let t = datetime!(2024-06-01 08:00:05 UTC);
        // 5 s to the first, 3 s to the second.
        let found = index.nearest(StreamKind::HeartRate, t, TOLERANCE).unwrap();
        assert_eq!(found.value, 150.0);
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        let index = SampleIndex::from_samples([hr(0, 5, 150.0)]);
        let t = datetime!(2024-06-01 08:00 UTC);
        assert!(index.nearest(StreamKind::HeartRate, t, TOLERANCE).is_some());
    }

    #[test]
    fn test_globally_nearest_beyond_tolerance_is_rejected() {
        let index = SampleIndex::from_samples([hr(0, 40, 150.0)]);
        let t = datetime!(2024-06-01 08:00 UTC);
        assert!(index.nearest(StreamKind::HeartRate, t, TOLERANCE).is_none());
    }

    #[test]
    fn test_nearest_before_and_after_candidates() {
        let index = SampleIndex::from_samples([hr(0, 0, 140.0), hr(0, 10, 150.0), hr(0, 20, 160.0)]);
        let t = datetime!(2024-06-01 08:00:12 UTC);
        let found = index.nearest(StreamKind::HeartRate, t, TOLERANCE).unwrap();
        assert_eq!(found.value, 150.0);
    }

    // --- index query tests ---

    #[test]
    fn test_window_is_boundary_inclusive_and_sorted() {
        let index = SampleIndex::from_samples([hr(2, 0, 3.0), hr(0, 0, 1.0), hr(1, 0, 2.0)]);
        let window = index.window(
            StreamKind::HeartRate,
            datetime!(2024-06-01 08:00 UTC),
            datetime!(2024-06-01 08:01 UTC),
        );
        let values: Vec<f64> = window.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_merged_streams_are_sorted() {
        let run = TimedSample::new(datetime!(2024-06-01 08:00:30 UTC), 3.0, StreamKind::RunningSpeed);
        let walk = TimedSample::new(datetime!(2024-06-01 08:00:10 UTC), 1.5, StreamKind::WalkingSpeed);
        let index = SampleIndex::from_samples([run, walk]);
        let merged = index.merged(&[StreamKind::RunningSpeed, StreamKind::WalkingSpeed]);
        assert_eq!(merged.len(), 2);
        assert!(merged[0].timestamp <= merged[1].timestamp);
        assert_eq!(merged[0].value, 1.5);
    }

    #[test]
    fn test_aggregates() {
        let index = SampleIndex::from_samples([hr(0, 0, 140.0), hr(1, 0, 160.0)]);
        assert_eq!(index.sum(StreamKind::HeartRate), 300.0);
        assert_eq!(index.mean(StreamKind::HeartRate), Some(150.0));
        assert_eq!(index.max_by_value(StreamKind::HeartRate).unwrap().value, 160.0);
        assert_eq!(index.first(StreamKind::HeartRate).unwrap().value, 140.0);
        assert_eq!(index.mean(StreamKind::StepCount), None);
    }
}
