//! Export run coordination.
//!
//! One [`Exporter`] run drives the whole pipeline: availability and
//! authorization checks, workout listing, sequential per-workout processing
//! (each with its own 27-way concurrent sample fetch), and the terminal
//! archive step. Workouts are processed one at a time so progress can be
//! reported as "workout i of N" and temp-file usage stays bounded.
//!
//! Per-workout documents are written into a per-run temporary directory that
//! is removed when the run ends, on both success and failure paths.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use gpxport_types::Workout;

use crate::archive::{archive_name, create_archive, document_filename};
use crate::document::build_document;
use crate::error::{Error, Result};
use crate::events::{EventDispatcher, ExportEvent, ExportPhase};
use crate::gpx::write_gpx;
use crate::index::SampleIndex;
use crate::source::HealthSource;

/// Terminal state of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// An archive was produced.
    Completed {
        /// Path of the archive within the output directory.
        archive: PathBuf,
        /// Number of GPX documents inside.
        documents: usize,
    },
    /// The source returned zero workouts; not an error.
    NothingToDo,
}

/// Coordinates one export run at a time.
///
/// # Example
///
/// ```ignore
/// use gpxport_core::{Exporter, MockSource};
///
/// let exporter = Exporter::new();
/// let mut progress = exporter.subscribe();
/// let outcome = exporter.run(&MockSource::new(), "/tmp/exports".as_ref()).await?;
/// ```
#[derive(Debug, Default)]
pub struct Exporter {
    events: EventDispatcher,
}

impl Exporter {
    /// Create an exporter with a fresh event channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to progress events for runs of this exporter.
    #[must_use]
    pub fn subscribe(&self) -> crate::events::EventReceiver {
        self.events.subscribe()
    }

    /// Run one export, writing the archive into `output_dir`.
    ///
    /// Failure isolation: a failed stream fetch degrades to empty data for
    /// that stream; a failed workout is skipped; only availability,
    /// authorization, workout listing, and archive creation fail the run.
    pub async fn run<S: HealthSource>(&self, source: &S, output_dir: &Path) -> Result<ExportOutcome> {
        match self.run_inner(source, output_dir).await {
            Ok(outcome) => {
                match &outcome {
                    ExportOutcome::Completed { archive, .. } => {
                        self.events.send(ExportEvent::Completed {
                            archive: archive.clone(),
                        });
                    }
                    ExportOutcome::NothingToDo => {
                        self.events.send(ExportEvent::NothingToDo {
                            status: "No workouts found".into(),
                        });
                    }
                }
                Ok(outcome)
            }
            Err(e) => {
                self.events.send(ExportEvent::Failed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_inner<S: HealthSource>(
        &self,
        source: &S,
        output_dir: &Path,
    ) -> Result<ExportOutcome> {
        if !source.is_available().await {
            return Err(Error::Unavailable);
        }
        source
            .request_authorization()
            .await
            .map_err(|e| Error::Authorization(e.to_string()))?;

        self.events
            .progress(ExportPhase::Fetching, 0.0, "Fetching workouts");
        let workouts = source
            .workouts()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;

        if workouts.is_empty() {
            info!("No workouts found; nothing to export");
            return Ok(ExportOutcome::NothingToDo);
        }
        info!("Fetched {} workout(s)", workouts.len());

        // Scoped per-run directory; dropped (and removed) on every exit path.
        let scratch = tempfile::tempdir()?;
        let mut files: Vec<PathBuf> = Vec::new();

        let total = workouts.len();
        for (i, workout) in workouts.iter().enumerate() {
            self.events.progress(
                ExportPhase::Processing,
                0.1 + 0.8 * (i as f32 / total as f32),
                format!("Processing workout {} of {}", i + 1, total),
            );
            match self.process_workout(source, workout, scratch.path()).await {
                Ok(Some(path)) => files.push(path),
                Ok(None) => debug!("Workout {} has no route; skipped", workout.id),
                Err(e) => {
                    warn!("Workout {} failed: {e}; skipped", workout.id);
                    self.events.send(ExportEvent::WorkoutSkipped {
                        workout_id: workout.id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.events
            .progress(ExportPhase::Archiving, 0.95, "Creating archive");
        // Date range spans all fetched workouts, including skipped ones.
        let archive = output_dir.join(archive_name(&workouts));
        create_archive(&archive, &files)?;

        self.events.progress(ExportPhase::Archiving, 1.0, "Done");
        Ok(ExportOutcome::Completed {
            archive,
            documents: files.len(),
        })
    }

    /// Process one workout into a GPX file in `scratch`.
    ///
    /// `Ok(None)` means the workout legitimately contributes no document
    /// (no route, or an empty one).
    async fn process_workout<S: HealthSource>(
        &self,
        source: &S,
        workout: &Workout,
        scratch: &Path,
    ) -> Result<Option<PathBuf>> {
        let Some(route_ref) = source
            .route(workout)
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?
        else {
            return Ok(None);
        };
        let route = source
            .route_points(&route_ref)
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;
        if route.is_empty() {
            return Ok(None);
        }

        let index = SampleIndex::fetch(source, workout).await;
        let events = source
            .events(workout)
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let Some(document) = build_document(workout, &route, &events, &index) else {
            return Ok(None);
        };

        let path = scratch.join(document_filename(workout)?);
        fs::write(&path, write_gpx(&document)?)?;
        debug!(
            "Wrote {} ({} points, {} waypoints)",
            path.display(),
            document.point_count(),
            document.waypoints.len()
        );
        Ok(Some(path))
    }
}
