//! Per-portal ownership scan.

use chrono::Duration;

use super::{PortalHistory, StatsError};
use crate::models::{AverageHold, Observation, PortalStats};

/// Derive a portal's stats from its history with one newest-to-oldest scan.
///
/// A flip is any adjacent pair of observations with different owners.
/// `current_held` runs from the newest observation back to the first older
/// observation with a different owner; later flips only add to the count.
pub fn portal_stats(history: &PortalHistory<'_>) -> Result<PortalStats, StatsError> {
    let newest = history.newest();
    let oldest = history.oldest();

    let mut current_owner = newest.owner;
    let mut flip_count: u32 = 0;
    let mut first_flip: Option<Duration> = None;

    for obs in &history.observations()[1..] {
        if obs.owner != current_owner {
            if flip_count == 0 {
                first_flip = Some(newest.timestamp - obs.timestamp);
            }
            flip_count += 1;
            current_owner = obs.owner;
        }
    }

    let overall_duration = newest.timestamp - oldest.timestamp;
    let weakness = weakness_score(newest)?;

    Ok(PortalStats {
        portal_id: newest.portal_id.clone(),
        owner: newest.owner,
        flip_count,
        overall_duration,
        average_hold: AverageHold::from_flips(overall_duration, flip_count),
        current_held: first_flip.unwrap_or(overall_duration),
        health: newest.health,
        level: newest.level,
        link_count: newest.link_count,
        weakness_score: (!newest.owner.is_neutral()).then_some(weakness),
    })
}

/// health / (level + links). A zero denominator is an upstream data defect.
fn weakness_score(obs: &Observation) -> Result<f64, StatsError> {
    let denominator = u64::from(obs.level) + u64::from(obs.link_count);
    if denominator == 0 {
        return Err(StatsError::DivisionByZero {
            portal_id: obs.portal_id.clone(),
        });
    }
    Ok(f64::from(obs.health) / denominator as f64)
}
