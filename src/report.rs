//! End-to-end report pipeline.
//!
//! Observation stream -> per-portal histories -> per-portal stats ->
//! leaderboards. The leaderboard step only runs once every portal has been
//! computed; any failure aborts the whole run.

use std::path::Path;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::calculate::{self, StatsError};
use crate::config::{ReportConfig, SourceKind};
use crate::models::{Leaderboards, Observation, PortalId, PortalStats};
use crate::storage::{self, SqliteSource, StorageError};

/// Errors from a full report run.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// How the per-portal step is scheduled.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub parallel: bool,
    pub parallel_threshold: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions::from(&ReportConfig::default())
    }
}

impl From<&ReportConfig> for ReportOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            parallel: config.parallel,
            parallel_threshold: config.parallel_threshold,
        }
    }
}

impl ReportOptions {
    fn use_parallel(&self, portals: usize) -> bool {
        self.parallel && portals >= self.parallel_threshold
    }
}

/// Result of a report run.
#[derive(Debug)]
pub struct Report {
    pub observation_count: usize,
    pub stats: Vec<PortalStats>,
    pub leaderboards: Leaderboards,
    pub elapsed: Duration,
}

/// Compute stats and leaderboards for a complete observation stream.
pub fn run_report(
    observations: &[Observation],
    options: &ReportOptions,
) -> Result<Report, StatsError> {
    let started = Instant::now();

    let histories = calculate::group_histories(observations)?;
    info!(
        "Grouped {} observations into {} portals",
        observations.len(),
        histories.len()
    );

    let parallel = options.use_parallel(histories.len());
    let stats = calculate::compute_all(&histories, parallel)?;
    info!(
        "Per-portal stats finished in {:?} ({})",
        started.elapsed(),
        if parallel { "parallel" } else { "sequential" }
    );

    let leaderboards = calculate::build_leaderboards(&stats);
    let elapsed = started.elapsed();
    info!(
        "Leaderboards built: {} factions, {} rows in {:?}",
        leaderboards.factions().len(),
        leaderboards.total_rows(),
        elapsed
    );

    Ok(Report {
        observation_count: observations.len(),
        stats,
        leaderboards,
        elapsed,
    })
}

/// Stats for a single portal, or `None` if it has no observations.
pub fn portal_report(
    observations: &[Observation],
    portal_id: &PortalId,
) -> Result<Option<PortalStats>, StatsError> {
    let histories = calculate::group_histories(observations)?;
    histories
        .iter()
        .find(|h| h.portal_id() == portal_id)
        .map(calculate::portal_stats)
        .transpose()
}

/// Load an observation stream from the configured source.
pub fn load_observations(kind: SourceKind, path: &Path) -> Result<Vec<Observation>, StorageError> {
    debug!("Loading observations from {:?} ({:?})", path, kind);
    let observations = match kind {
        SourceKind::Sqlite => SqliteSource::open(path)?.load_observations()?,
        SourceKind::Jsonl => storage::read_observations(path)?,
    };
    info!("Loaded {} observations", observations.len());
    Ok(observations)
}

/// Load, compute and return a report in one step.
pub fn report_from_source(
    kind: SourceKind,
    path: &Path,
    options: &ReportOptions,
) -> Result<Report, ReportError> {
    let observations = load_observations(kind, path)?;
    Ok(run_report(&observations, options)?)
}
