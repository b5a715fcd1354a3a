//! Route segmentation.
//!
//! Partitions one ordered route into logical track segments, driven by
//! lap/pause/resume events and by gaps in the GPS trace. This is a
//! single-pass state machine: the state is the currently open segment plus a
//! monotonic event cursor, and every route point and event is consumed
//! exactly once.

use time::Duration;
use tracing::debug;

use gpxport_types::{EventKind, LocationPoint, WorkoutEvent};

/// A silence in the GPS trace longer than this closes the current segment.
pub const GAP_THRESHOLD: Duration = Duration::seconds(30);

/// Split a route into segments using the workout's events and the gap rule.
///
/// Rules, applied per point in timestamp order:
///
/// - Events whose start is at or before the point fire first, oldest first:
///   `lap` closes a non-empty segment and reopens at the point, `pause`
///   closes a non-empty segment into a fresh empty one, `resume` seeds an
///   empty segment with the point.
/// - Otherwise the point opens an empty segment, splits off a new segment
///   when the gap since the previous point exceeds [`GAP_THRESHOLD`], or is
///   appended normally.
///
/// If the rules produce no segments at all, the whole route becomes a single
/// segment (or nothing, when the route itself is empty).
#[must_use]
pub fn segment_route(route: &[LocationPoint], events: &[WorkoutEvent]) -> Vec<Vec<LocationPoint>> {
    let mut segments: Vec<Vec<LocationPoint>> = Vec::new();
    let mut current: Vec<LocationPoint> = Vec::new();
    let mut cursor = 0;
    let mut prev: Option<&LocationPoint> = None;

    for point in route {
        // A lap or resume may place the point itself; the fall-through rules
        // below must then leave it alone.
        let mut placed = false;

        while cursor < events.len() && events[cursor].start <= point.timestamp {
            match events[cursor].kind {
                EventKind::Lap => {
                    // Once the point is placed, further events for the same
                    // point must not re-place it.
                    if !placed {
                        if !current.is_empty() {
                            segments.push(std::mem::take(&mut current));
                        }
                        current.push(*point);
                        placed = true;
                    }
                }
                EventKind::Pause => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                }
                EventKind::Resume => {
                    if current.is_empty() && !placed {
                        current.push(*point);
                        placed = true;
                    }
                }
                EventKind::Other | _ => {}
            }
            cursor += 1;
        }

        if !placed {
            match prev {
                _ if current.is_empty() => current.push(*point),
                Some(prev) if point.timestamp - prev.timestamp > GAP_THRESHOLD => {
                    segments.push(std::mem::take(&mut current));
                    current.push(*point);
                }
                _ => current.push(*point),
            }
        }
        prev = Some(point);
    }

    if !current.is_empty() {
        segments.push(current);
    }

    if segments.is_empty() && !route.is_empty() {
        debug!("Segmentation produced no segments; falling back to whole route");
        segments.push(route.to_vec());
    }

    segments
}
