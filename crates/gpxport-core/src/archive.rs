//! Archive packaging.
//!
//! Names per-workout GPX files, and bundles them into a single
//! gzip-compressed tar archive. Entries are appended in workout-processing
//! order (most recent first, matching the source's descending sort), not
//! alphabetically.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use time::macros::format_description;
use tracing::{debug, info};

use gpxport_types::Workout;

use crate::error::{Error, Result};

/// Extension of per-workout document files.
pub const DOCUMENT_EXT: &str = "gpx";

/// Filename for one workout's document:
/// `<ActivityDisplayName>-<yyyy-MM-dd-HHmm>-<8-char-id-prefix>.gpx`.
///
/// Two workouts of the same type starting in the same minute can only
/// collide if their id prefixes also collide; that residual risk is accepted
/// rather than resolved.
pub fn document_filename(workout: &Workout) -> Result<String> {
    let stamp_format = format_description!("[year]-[month]-[day]-[hour][minute]");
    let stamp = workout.start.format(&stamp_format)?;
    let id = workout.id.simple().to_string();
    Ok(format!(
        "{}-{}-{}.{}",
        workout.activity.display_name(),
        stamp,
        &id[..8],
        DOCUMENT_EXT
    ))
}

/// Container name: `activities-<date-range>.tar.gz`.
///
/// A single date when every workout started on the same day, otherwise
/// `<earliest>-to-<latest>` over ALL fetched workouts — including those
/// that were skipped for having no route.
pub fn archive_name(workouts: &[Workout]) -> String {
    let mut starts: Vec<_> = workouts.iter().map(|w| w.start.date()).collect();
    starts.sort();
    match (starts.first(), starts.last()) {
        (Some(first), Some(last)) if first == last => format!("activities-{first}.tar.gz"),
        (Some(first), Some(last)) => format!("activities-{first}-to-{last}.tar.gz"),
        _ => "activities.tar.gz".to_string(),
    }
}

/// Bundle `files` into a gzip-compressed tar at `output`, in the given
/// order. An existing file at `output` is removed first.
pub fn create_archive(output: &Path, files: &[PathBuf]) -> Result<()> {
    if output.exists() {
        debug!("Removing existing archive at {}", output.display());
        fs::remove_file(output).map_err(|e| Error::Archive(e.to_string()))?;
    }

    let file = File::create(output).map_err(|e| Error::Archive(e.to_string()))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for path in files {
        let name = path
            .file_name()
            .ok_or_else(|| Error::Archive(format!("No file name in {}", path.display())))?;
        builder
            .append_path_with_name(path, name)
            .map_err(|e| Error::Archive(e.to_string()))?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| Error::Archive(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| Error::Archive(e.to_string()))?;

    info!("Created archive {} with {} file(s)", output.display(), files.len());
    Ok(())
}
