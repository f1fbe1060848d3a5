//! Partition a sorted observation stream into per-portal histories.

use std::collections::HashSet;

use tracing::debug;

use super::{PortalHistory, StatsError};
use crate::models::{Observation, PortalId};

/// Split `observations` into one history per portal, in first-appearance order.
///
/// The stream must hold each portal's observations as one contiguous run,
/// newest first. A portal that reappears after another portal's run, or a
/// run that goes forward in time, is rejected.
pub fn group_histories(observations: &[Observation]) -> Result<Vec<PortalHistory<'_>>, StatsError> {
    let mut histories = Vec::new();
    let mut seen: HashSet<&PortalId> = HashSet::new();
    let mut start = 0;

    while start < observations.len() {
        let portal_id = &observations[start].portal_id;
        if !seen.insert(portal_id) {
            return Err(StatsError::MalformedInput {
                portal_id: portal_id.clone(),
                reason: "observations are not contiguous".to_string(),
            });
        }

        let run_len = observations[start..]
            .iter()
            .take_while(|o| &o.portal_id == portal_id)
            .count();
        let end = start + run_len;

        histories.push(PortalHistory::new(&observations[start..end])?);
        start = end;
    }

    debug!(
        "Grouped {} observations into {} portal histories",
        observations.len(),
        histories.len()
    );

    Ok(histories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Faction;
    use chrono::{TimeZone, Utc};

    fn obs(portal: &str, secs: i64) -> Observation {
        Observation::new(portal, Utc.timestamp_opt(secs, 0).unwrap(), Faction(1))
    }

    fn ids(histories: &[PortalHistory<'_>]) -> Vec<String> {
        histories
            .iter()
            .map(|h| h.portal_id().as_str().to_string())
            .collect()
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let observations = vec![
            obs("b", 30),
            obs("b", 20),
            obs("a", 50),
            obs("c", 10),
            obs("c", 5),
            obs("c", 1),
        ];

        let histories = group_histories(&observations).unwrap();

        assert_eq!(ids(&histories), vec!["b", "a", "c"]);
        assert_eq!(
            histories.iter().map(|h| h.len()).collect::<Vec<_>>(),
            vec![2, 1, 3]
        );
        assert_eq!(histories[2].oldest().timestamp.timestamp(), 1);
    }

    #[test]
    fn test_empty_stream() {
        assert!(group_histories(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_non_contiguous_portal_is_rejected() {
        let observations = vec![obs("a", 30), obs("b", 20), obs("a", 10)];

        let err = group_histories(&observations).unwrap_err();

        assert!(err.is_malformed_input());
        assert_eq!(err.portal_id(), Some(&PortalId::from("a")));
    }

    #[test]
    fn test_ascending_run_is_rejected() {
        let observations = vec![obs("a", 30), obs("b", 10), obs("b", 20)];

        let err = group_histories(&observations).unwrap_err();

        assert_eq!(err.portal_id(), Some(&PortalId::from("b")));
    }

    #[test]
    fn test_equal_timestamps_are_tolerated() {
        let observations = vec![obs("a", 30), obs("a", 30), obs("a", 10)];
        let histories = group_histories(&observations).unwrap();
        assert_eq!(histories.len(), 1);
        assert_eq!(histories[0].len(), 3);
    }
}
