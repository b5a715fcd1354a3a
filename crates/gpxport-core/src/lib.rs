//! Workout-to-GPX synthesis pipeline.
//!
//! This crate turns workouts from a health-data source into enriched GPX
//! documents and bundles them into a single compressed archive.
//!
//! # Pipeline
//!
//! | Stage | Module | Responsibility |
//! |-------|--------|----------------|
//! | Sample index | [`index`] | Concurrent per-stream fetch, queryable by time |
//! | Segmenter | [`segment`] | Lap/pause/gap-aware route partitioning |
//! | Enricher | [`enrich`] | Nearest-in-time sample attachment per point |
//! | Document builder | [`document`] | Metadata, segments, summary waypoints |
//! | GPX serializer | [`gpx`] | Well-formed GPX 1.1 output |
//! | Archive packager | [`archive`] | One `.tar.gz` per export run |
//! | Coordinator | [`exporter`] | Phases, progress events, failure isolation |
//!
//! # Quick Start
//!
//! ```no_run
//! use gpxport_core::{Exporter, MockSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = MockSource::new();
//!     let exporter = Exporter::new();
//!     let outcome = exporter.run(&source, "exports".as_ref()).await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod document;
pub mod enrich;
pub mod error;
pub mod events;
pub mod exporter;
pub mod gpx;
pub mod index;
pub mod mock;
pub mod segment;
pub mod source;

// Core exports
pub use archive::{archive_name, create_archive, document_filename};
pub use document::{build_document, pace_min_per_km};
pub use enrich::{Enricher, POWER_STREAMS, SAMPLE_TOLERANCE, SPEED_STREAMS};
pub use error::{Error, Result, SourceError, SourceResult};
pub use events::{EventDispatcher, EventReceiver, EventSender, ExportEvent, ExportPhase};
pub use exporter::{ExportOutcome, Exporter};
pub use gpx::write_gpx;
pub use index::{nearest_in, SampleIndex};
pub use mock::MockSource;
pub use segment::{segment_route, GAP_THRESHOLD};
pub use source::{HealthSource, RouteRef};

// Re-export the data model for downstream convenience
pub use gpxport_types as types;
