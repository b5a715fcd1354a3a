//! Export progress event system.
//!
//! The pipeline does not publish mutable progress state; it emits events
//! into a broadcast channel that any number of observers (CLI progress bar,
//! share sheet, logs) can subscribe to. Events are only ever sent from the
//! single coordinating task.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Phases of one export run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPhase {
    /// Listing workouts from the source.
    Fetching,
    /// Per-workout processing (fan-out fetch, segment, enrich, write).
    Processing,
    /// Bundling per-workout files into the archive.
    Archiving,
}

/// Events emitted during an export run.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new event types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ExportEvent {
    /// Forward progress within a phase.
    Progress {
        phase: ExportPhase,
        /// Fraction complete, 0.0–1.0.
        fraction: f32,
        /// Human-readable status, e.g. "Processing workout 3 of 12".
        status: String,
    },
    /// One workout was skipped; the run continues.
    WorkoutSkipped { workout_id: uuid::Uuid, reason: String },
    /// The run finished with an archive.
    Completed { archive: PathBuf },
    /// The run finished with nothing to do.
    NothingToDo { status: String },
    /// The run failed.
    Failed { error: String },
}

/// Sender for export events.
pub type EventSender = broadcast::Sender<ExportEvent>;

/// Receiver for export events.
pub type EventReceiver = broadcast::Receiver<ExportEvent>;

/// Event dispatcher for fanning events out to multiple receivers.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    sender: EventSender,
}

impl EventDispatcher {
    /// Create a new event dispatcher.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events.
    #[must_use]
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Send an event.
    pub fn send(&self, event: ExportEvent) {
        // Ignore error if no receivers
        let _ = self.sender.send(event);
    }

    /// Convenience for a progress event.
    pub fn progress(&self, phase: ExportPhase, fraction: f32, status: impl Into<String>) {
        self.send(ExportEvent::Progress {
            phase,
            fraction,
            status: status.into(),
        });
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_reach_subscriber() {
        let dispatcher = EventDispatcher::default();
        let mut rx = dispatcher.subscribe();
        dispatcher.progress(ExportPhase::Fetching, 0.0, "Fetching workouts");

        match rx.recv().await.unwrap() {
            ExportEvent::Progress { phase, fraction, status } => {
                assert_eq!(phase, ExportPhase::Fetching);
                assert_eq!(fraction, 0.0);
                assert_eq!(status, "Fetching workouts");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_send_without_subscribers_is_fine() {
        let dispatcher = EventDispatcher::new(8);
        dispatcher.send(ExportEvent::NothingToDo {
            status: "No workouts found".into(),
        });
    }
}
