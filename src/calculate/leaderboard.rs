//! Per-faction leaderboard aggregation.

use std::collections::BTreeSet;

use tracing::debug;

use crate::models::{
    Faction, Leaderboards, LongestHeldRow, MostActiveRow, MostLinksRow, PortalStats,
    WeakestByAgeRow, WeakestByLinkRow,
};

/// Highest health still counted as damaged for the weakest-by-age table.
pub const WEAK_HEALTH_MAX: u32 = 40;

/// Rank a complete stats set into the five leaderboards.
///
/// Every faction present in `stats` gets a table, even when nothing in it
/// qualifies. Neutral only appears in the longest-held tables.
pub fn build_leaderboards(stats: &[PortalStats]) -> Leaderboards {
    let factions: BTreeSet<Faction> = stats.iter().map(|s| s.owner).collect();

    let mut boards = Leaderboards {
        most_active: most_active(stats),
        ..Default::default()
    };

    for faction in factions {
        let members: Vec<&PortalStats> = stats.iter().filter(|s| s.owner == faction).collect();

        boards.longest_held.insert(faction, longest_held(&members));

        if faction.is_neutral() {
            continue;
        }

        boards
            .weakest_by_link
            .insert(faction, weakest_by_link(&members));
        boards.most_links.insert(faction, most_links(&members));
        boards
            .weakest_by_age
            .insert(faction, weakest_by_age(&members));
    }

    debug!(
        "Built leaderboards: {} portals, {} factions, {} rows",
        stats.len(),
        boards.longest_held.len(),
        boards.total_rows()
    );

    boards
}

/// Shortest average hold first, portal id ascending on ties.
fn most_active(stats: &[PortalStats]) -> Vec<MostActiveRow> {
    let mut rows: Vec<MostActiveRow> = stats
        .iter()
        .filter(|s| s.flip_count != 0)
        .filter_map(|s| {
            Some(MostActiveRow {
                portal_id: s.portal_id.clone(),
                average_hold: s.average_hold.as_duration()?,
                flip_count: s.flip_count,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        a.average_hold
            .cmp(&b.average_hold)
            .then_with(|| a.portal_id.cmp(&b.portal_id))
    });
    rows
}

/// Longest current hold first, portal id ascending on ties.
fn longest_held(members: &[&PortalStats]) -> Vec<LongestHeldRow> {
    let mut rows: Vec<LongestHeldRow> = members
        .iter()
        .map(|s| LongestHeldRow {
            portal_id: s.portal_id.clone(),
            current_held: s.current_held,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.current_held
            .cmp(&a.current_held)
            .then_with(|| a.portal_id.cmp(&b.portal_id))
    });
    rows
}

/// Lowest weakness score first, portal id ascending on ties.
fn weakest_by_link(members: &[&PortalStats]) -> Vec<WeakestByLinkRow> {
    let mut rows: Vec<WeakestByLinkRow> = members
        .iter()
        .filter(|s| s.is_owned())
        .filter_map(|s| {
            Some(WeakestByLinkRow {
                portal_id: s.portal_id.clone(),
                weakness_score: s.weakness_score?,
                health: s.health,
                level: s.level,
                link_count: s.link_count,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        a.weakness_score
            .total_cmp(&b.weakness_score)
            .then_with(|| a.portal_id.cmp(&b.portal_id))
    });
    rows
}

/// Most links first. Ties break on portal id descending.
fn most_links(members: &[&PortalStats]) -> Vec<MostLinksRow> {
    let mut rows: Vec<MostLinksRow> = members
        .iter()
        .filter(|s| s.is_owned())
        .map(|s| MostLinksRow {
            portal_id: s.portal_id.clone(),
            link_count: s.link_count,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.link_count
            .cmp(&a.link_count)
            .then_with(|| b.portal_id.cmp(&a.portal_id))
    });
    rows
}

/// Damaged portals, longest held first, then healthiest, then portal id.
fn weakest_by_age(members: &[&PortalStats]) -> Vec<WeakestByAgeRow> {
    let mut rows: Vec<WeakestByAgeRow> = members
        .iter()
        .filter(|s| s.is_owned() && s.health <= WEAK_HEALTH_MAX)
        .map(|s| WeakestByAgeRow {
            portal_id: s.portal_id.clone(),
            current_held: s.current_held,
            health: s.health,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.current_held
            .cmp(&a.current_held)
            .then_with(|| b.health.cmp(&a.health))
            .then_with(|| a.portal_id.cmp(&b.portal_id))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AverageHold, PortalId};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn portal(id: &str, owner: u8) -> PortalStats {
        PortalStats {
            portal_id: id.into(),
            owner: Faction(owner),
            flip_count: 0,
            overall_duration: Duration::zero(),
            average_hold: AverageHold::NeverFlipped,
            current_held: Duration::zero(),
            health: 100,
            level: 1,
            link_count: 0,
            weakness_score: (owner != 0).then_some(100.0),
        }
    }

    fn flipped(mut stats: PortalStats, flips: u32, overall_secs: i64) -> PortalStats {
        stats.flip_count = flips;
        stats.overall_duration = Duration::seconds(overall_secs);
        stats.average_hold = AverageHold::from_flips(stats.overall_duration, flips);
        stats
    }

    fn held(mut stats: PortalStats, secs: i64) -> PortalStats {
        stats.current_held = Duration::seconds(secs);
        stats
    }

    fn shape(mut stats: PortalStats, health: u32, level: u32, links: u32) -> PortalStats {
        stats.health = health;
        stats.level = level;
        stats.link_count = links;
        if stats.is_owned() {
            stats.weakness_score = Some(f64::from(health) / f64::from(level + links));
        }
        stats
    }

    fn ids<T>(rows: &[T], id: impl Fn(&T) -> &PortalId) -> Vec<String> {
        rows.iter().map(|r| id(r).as_str().to_string()).collect()
    }

    #[test]
    fn test_most_active_excludes_never_flipped() {
        let stats = vec![
            flipped(portal("c", 1), 2, 300),
            portal("never", 2),
            flipped(portal("a", 0), 1, 50),
            flipped(portal("b", 2), 4, 200),
        ];

        let boards = build_leaderboards(&stats);

        assert_eq!(ids(&boards.most_active, |r| &r.portal_id), vec!["a", "b", "c"]);
        assert!(boards.most_active.iter().all(|r| r.flip_count != 0));
        assert_eq!(boards.most_active[0].average_hold, Duration::seconds(50));
    }

    #[test]
    fn test_longest_held_includes_neutral() {
        let stats = vec![
            held(portal("n1", 0), 10),
            held(portal("n2", 0), 30),
            held(portal("e1", 1), 5),
        ];

        let boards = build_leaderboards(&stats);

        assert_eq!(boards.factions(), vec![Faction(0), Faction(1)]);
        assert_eq!(
            ids(&boards.longest_held[&Faction(0)], |r| &r.portal_id),
            vec!["n2", "n1"]
        );
        assert_eq!(
            ids(&boards.longest_held[&Faction(1)], |r| &r.portal_id),
            vec!["e1"]
        );
    }

    #[test]
    fn test_longest_held_ties_break_on_portal_id() {
        let stats = vec![
            held(portal("z", 1), 10),
            held(portal("a", 1), 10),
            held(portal("m", 1), 20),
        ];

        let boards = build_leaderboards(&stats);

        assert_eq!(
            ids(&boards.longest_held[&Faction(1)], |r| &r.portal_id),
            vec!["m", "a", "z"]
        );
    }

    #[test]
    fn test_owned_tables_exclude_neutral() {
        let stats = vec![shape(portal("n", 0), 0, 1, 0), shape(portal("r", 2), 10, 1, 1)];

        let boards = build_leaderboards(&stats);

        assert!(!boards.weakest_by_link.contains_key(&Faction::NEUTRAL));
        assert!(!boards.most_links.contains_key(&Faction::NEUTRAL));
        assert!(!boards.weakest_by_age.contains_key(&Faction::NEUTRAL));
        assert_eq!(boards.weakest_by_link[&Faction(2)].len(), 1);
    }

    #[test]
    fn test_weakest_by_link_order() {
        let stats = vec![
            shape(portal("b", 1), 50, 4, 1),  // 10.0
            shape(portal("a", 1), 80, 6, 2),  // 10.0
            shape(portal("c", 1), 30, 5, 10), // 2.0
        ];

        let boards = build_leaderboards(&stats);
        let rows = &boards.weakest_by_link[&Faction(1)];

        assert_eq!(ids(rows, |r| &r.portal_id), vec!["c", "a", "b"]);
        assert_eq!(rows[0].weakness_score, 2.0);
        assert_eq!((rows[1].health, rows[1].level, rows[1].link_count), (80, 6, 2));
    }

    #[test]
    fn test_most_links_ties_break_descending() {
        let stats = vec![
            shape(portal("a", 2), 100, 1, 3),
            shape(portal("c", 2), 100, 1, 3),
            shape(portal("b", 2), 100, 1, 8),
            shape(portal("d", 2), 100, 1, 0),
        ];

        let boards = build_leaderboards(&stats);

        assert_eq!(
            ids(&boards.most_links[&Faction(2)], |r| &r.portal_id),
            vec!["b", "c", "a", "d"]
        );
    }

    #[test]
    fn test_weakest_by_age_filters_and_orders() {
        let stats = vec![
            held(shape(portal("healthy", 1), 41, 1, 0), 1_000),
            held(shape(portal("a", 1), 20, 1, 0), 500),
            held(shape(portal("b", 1), 40, 1, 0), 500),
            held(shape(portal("c", 1), 5, 1, 0), 900),
            held(shape(portal("d", 1), 40, 1, 0), 500),
        ];

        let boards = build_leaderboards(&stats);
        let rows = &boards.weakest_by_age[&Faction(1)];

        assert_eq!(ids(rows, |r| &r.portal_id), vec!["c", "b", "d", "a"]);
        assert!(rows.iter().all(|r| r.health <= WEAK_HEALTH_MAX));
    }

    #[test]
    fn test_faction_without_qualifying_portals_gets_empty_table() {
        let stats = vec![shape(portal("full", 2), 100, 8, 2)];

        let boards = build_leaderboards(&stats);

        assert!(boards.weakest_by_age[&Faction(2)].is_empty());
        assert_eq!(boards.most_links[&Faction(2)].len(), 1);
    }

    #[test]
    fn test_idempotent() {
        let stats = vec![
            held(flipped(shape(portal("a", 1), 30, 2, 1), 3, 900), 100),
            held(flipped(shape(portal("b", 2), 10, 3, 0), 1, 400), 400),
            held(portal("c", 0), 50),
        ];

        assert_eq!(build_leaderboards(&stats), build_leaderboards(&stats));
    }

    #[test]
    fn test_empty_input() {
        let boards = build_leaderboards(&[]);
        assert_eq!(boards, Leaderboards::default());
    }
}
