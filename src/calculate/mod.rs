//! Statistics calculation engine.
//!
//! Turns a flat observation stream into ranked leaderboards:
//! - Grouping the stream into per-portal histories
//! - Per-portal ownership scan (flips, hold durations, weakness)
//! - Per-faction leaderboard aggregation

mod group;
mod leaderboard;
mod portal;

pub use group::group_histories;
pub use leaderboard::{build_leaderboards, WEAK_HEALTH_MAX};
pub use portal::portal_stats;

use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::models::{Observation, PortalId, PortalStats};

/// Errors raised while deriving statistics.
#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("Malformed input for portal {portal_id}: {reason}")]
    MalformedInput { portal_id: PortalId, reason: String },

    #[error("Malformed input: empty observation history")]
    EmptyHistory,

    #[error("Division by zero computing weakness for portal {portal_id}: level + links is 0")]
    DivisionByZero { portal_id: PortalId },
}

impl StatsError {
    /// The portal whose record caused the failure, if known.
    pub fn portal_id(&self) -> Option<&PortalId> {
        match self {
            StatsError::MalformedInput { portal_id, .. } => Some(portal_id),
            StatsError::DivisionByZero { portal_id } => Some(portal_id),
            StatsError::EmptyHistory => None,
        }
    }

    /// True for ingress ordering and partition violations.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            StatsError::MalformedInput { .. } | StatsError::EmptyHistory
        )
    }
}

/// One portal's observations, newest first. Never empty.
#[derive(Debug, Clone, Copy)]
pub struct PortalHistory<'a> {
    observations: &'a [Observation],
}

impl<'a> PortalHistory<'a> {
    /// Wrap a run of observations, checking it belongs to a single portal
    /// and runs from newest to oldest.
    pub fn new(observations: &'a [Observation]) -> Result<Self, StatsError> {
        let first = observations.first().ok_or(StatsError::EmptyHistory)?;

        for pair in observations.windows(2) {
            let (newer, older) = (&pair[0], &pair[1]);
            if older.portal_id != first.portal_id {
                return Err(StatsError::MalformedInput {
                    portal_id: first.portal_id.clone(),
                    reason: format!("history also contains portal {}", older.portal_id),
                });
            }
            if older.timestamp > newer.timestamp {
                return Err(StatsError::MalformedInput {
                    portal_id: first.portal_id.clone(),
                    reason: format!(
                        "observation at {} follows older observation at {}",
                        older.timestamp, newer.timestamp
                    ),
                });
            }
        }

        Ok(Self { observations })
    }

    pub fn portal_id(&self) -> &'a PortalId {
        &self.observations[0].portal_id
    }

    pub fn newest(&self) -> &'a Observation {
        &self.observations[0]
    }

    pub fn oldest(&self) -> &'a Observation {
        &self.observations[self.observations.len() - 1]
    }

    pub fn observations(&self) -> &'a [Observation] {
        self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Compute stats for every history, optionally fanned out across the rayon
/// pool. Any failing portal fails the whole batch.
pub fn compute_all(
    histories: &[PortalHistory<'_>],
    parallel: bool,
) -> Result<Vec<PortalStats>, StatsError> {
    debug!(
        "Computing stats for {} portals ({})",
        histories.len(),
        if parallel { "parallel" } else { "sequential" }
    );

    if parallel {
        histories.par_iter().map(portal_stats).collect()
    } else {
        histories.iter().map(portal_stats).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Faction;
    use chrono::{TimeZone, Utc};

    fn obs(portal: &str, secs: i64, owner: u8) -> Observation {
        Observation::new(portal, Utc.timestamp_opt(secs, 0).unwrap(), Faction(owner))
            .with_level(2)
            .with_links(1)
    }

    #[test]
    fn test_history_rejects_empty() {
        assert_eq!(PortalHistory::new(&[]).unwrap_err(), StatsError::EmptyHistory);
    }

    #[test]
    fn test_history_rejects_ascending_timestamps() {
        let observations = vec![obs("p1", 100, 1), obs("p1", 200, 1)];
        let err = PortalHistory::new(&observations).unwrap_err();
        assert!(err.is_malformed_input());
        assert_eq!(err.portal_id(), Some(&PortalId::from("p1")));
    }

    #[test]
    fn test_history_rejects_mixed_portals() {
        let observations = vec![obs("p1", 200, 1), obs("p2", 100, 1)];
        assert!(PortalHistory::new(&observations).unwrap_err().is_malformed_input());
    }

    #[test]
    fn test_history_accessors() {
        let observations = vec![obs("p1", 300, 1), obs("p1", 200, 2), obs("p1", 100, 1)];
        let history = PortalHistory::new(&observations).unwrap();

        assert_eq!(history.portal_id().as_str(), "p1");
        assert_eq!(history.newest().timestamp.timestamp(), 300);
        assert_eq!(history.oldest().timestamp.timestamp(), 100);
        assert_eq!(history.len(), 3);
        assert!(!history.is_empty());
    }

    #[test]
    fn test_compute_all_parallel_matches_sequential() {
        let mut observations = Vec::new();
        for i in 0..200 {
            let portal = format!("p{:03}", i);
            observations.push(obs(&portal, 1_000 + i, (i % 3) as u8));
            observations.push(obs(&portal, 500, ((i + 1) % 3) as u8));
            observations.push(obs(&portal, 10, (i % 3) as u8));
        }
        let histories = group_histories(&observations).unwrap();

        let sequential = compute_all(&histories, false).unwrap();
        let parallel = compute_all(&histories, true).unwrap();

        assert_eq!(sequential.len(), 200);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_compute_all_fails_atomically() {
        let observations = vec![
            obs("p1", 300, 1),
            Observation::new("p2", Utc.timestamp_opt(300, 0).unwrap(), Faction(1))
                .with_level(0)
                .with_links(0),
        ];
        let histories = group_histories(&observations).unwrap();

        let err = compute_all(&histories, true).unwrap_err();
        assert_eq!(
            err,
            StatsError::DivisionByZero {
                portal_id: "p2".into()
            }
        );
    }
}
