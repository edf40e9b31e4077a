use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing::span::EnteredSpan;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

/// Event targets emitted by this workspace.
const TARGET_ROOTS: [&str; 2] = ["mixer_core", "team_mixer"];

/// Keeps the background writer flushing and the run span entered.
pub struct LoggingGuard {
    _run_span: EnteredSpan,
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Directory that receives `telemetry.jsonl`: next to the summary markdown.
pub fn telemetry_dir(outputs: &ResolvedOutputs) -> PathBuf {
    outputs
        .summary_md
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Filter used when `RUST_LOG` is unset: the configured level, scoped to the
/// mixer's own targets so dependency noise stays out of the telemetry.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    TARGET_ROOTS
        .iter()
        .map(|root| format!("{root}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the JSON telemetry subscriber when structured logging is on.
///
/// Every event is recorded inside a `run` span carrying `run_id`, so lines from
/// different runs can be told apart after the files are merged.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let dir = telemetry_dir(outputs);
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;

    let telemetry_path = dir.join("telemetry.jsonl");
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let directives = default_directives(logging.level().unwrap_or(Level::INFO));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // A global subscriber may already be installed (tests).
    let _ = tracing::subscriber::set_global_default(subscriber);

    let run_span = tracing::info_span!(target: "team_mixer::run", "run", run_id = %run_id).entered();
    tracing::info!(target: "team_mixer::run", path = %telemetry_path.display(), "structured logging enabled");

    Ok(Some(LoggingGuard {
        _run_span: run_span,
        _guard: guard,
        telemetry_path,
    }))
}
