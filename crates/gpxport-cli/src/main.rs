//! `gpxport` — export workouts from a health-data snapshot to GPX.

mod snapshot;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use gpxport_core::{ExportEvent, ExportOutcome, Exporter};

use crate::snapshot::SnapshotSource;

#[derive(Parser)]
#[command(name = "gpxport")]
#[command(author, version, about = "Export workouts to enriched GPX archives", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an export and produce one .tar.gz archive
    Export {
        /// Path to the JSON health-data snapshot
        #[arg(short, long)]
        input: PathBuf,

        /// Directory to write the archive into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// List the workouts in a snapshot
    List {
        /// Path to the JSON health-data snapshot
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Export { input, output } => export(&input, &output, cli.quiet).await,
        Commands::List { input } => list(&input).await,
    }
}

async fn export(input: &std::path::Path, output: &std::path::Path, quiet: bool) -> Result<()> {
    let source = SnapshotSource::load(input)?;
    let exporter = Exporter::new();

    let progress = if quiet {
        None
    } else {
        let bar = ProgressBar::new(100);
        if let Ok(style) = ProgressStyle::with_template("{bar:30} {percent:>3}% {msg}") {
            bar.set_style(style);
        }
        let mut rx = exporter.subscribe();
        let task_bar = bar.clone();
        let handle = tokio::spawn(async move {
            while let Ok(event) = rx.recv().await {
                match event {
                    ExportEvent::Progress { fraction, status, .. } => {
                        task_bar.set_position((fraction * 100.0) as u64);
                        task_bar.set_message(status);
                    }
                    ExportEvent::WorkoutSkipped { workout_id, reason } => {
                        task_bar.println(format!("skipped {workout_id}: {reason}"));
                    }
                    ExportEvent::Completed { .. }
                    | ExportEvent::NothingToDo { .. }
                    | ExportEvent::Failed { .. } => break,
                    _ => {}
                }
            }
        });
        Some((bar, handle))
    };

    let outcome = exporter.run(&source, output).await;

    if let Some((bar, handle)) = progress {
        handle.await?;
        bar.finish_and_clear();
    }

    match outcome? {
        ExportOutcome::Completed { archive, documents } => {
            println!("Exported {documents} workout(s) to {}", archive.display());
        }
        ExportOutcome::NothingToDo => {
            println!("No workouts found");
        }
    }
    Ok(())
}

async fn list(input: &std::path::Path) -> Result<()> {
    use gpxport_core::HealthSource;

    let source = SnapshotSource::load(input)?;
    let workouts = source.workouts().await?;
    if workouts.is_empty() {
        println!("No workouts found");
        return Ok(());
    }

    for workout in workouts {
        let distance = workout
            .total_distance
            .map(|d| format!(", {:.2} km", d / 1000.0))
            .unwrap_or_default();
        println!(
            "{}  {:<10} {:>4} min{}  {}",
            workout.start.date(),
            workout.activity,
            workout.duration().whole_minutes(),
            distance,
            workout.id
        );
    }
    Ok(())
}
