//! Ranked leaderboard tables.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::Serialize;

use super::stats::seconds;
use super::{Faction, PortalId};

/// Portals that change hands most often, shortest average hold first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MostActiveRow {
    pub portal_id: PortalId,
    #[serde(with = "seconds")]
    pub average_hold: Duration,
    pub flip_count: u32,
}

/// Portals held longest by their current owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongestHeldRow {
    pub portal_id: PortalId,
    #[serde(with = "seconds")]
    pub current_held: Duration,
}

/// Owned portals with the lowest health per level and link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeakestByLinkRow {
    pub portal_id: PortalId,
    pub weakness_score: f64,
    pub health: u32,
    pub level: u32,
    pub link_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MostLinksRow {
    pub portal_id: PortalId,
    pub link_count: u32,
}

/// Damaged owned portals, longest held first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeakestByAgeRow {
    pub portal_id: PortalId,
    #[serde(with = "seconds")]
    pub current_held: Duration,
    pub health: u32,
}

/// The five ranked views over a complete portal stats set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leaderboards {
    /// Global, all factions
    pub most_active: Vec<MostActiveRow>,

    /// Per faction, neutral included
    pub longest_held: BTreeMap<Faction, Vec<LongestHeldRow>>,

    pub weakest_by_link: BTreeMap<Faction, Vec<WeakestByLinkRow>>,
    pub most_links: BTreeMap<Faction, Vec<MostLinksRow>>,
    pub weakest_by_age: BTreeMap<Faction, Vec<WeakestByAgeRow>>,
}

impl Leaderboards {
    /// Every faction that owns at least one portal, neutral included.
    pub fn factions(&self) -> Vec<Faction> {
        self.longest_held.keys().copied().collect()
    }

    /// Number of rows across all tables.
    pub fn total_rows(&self) -> usize {
        self.most_active.len()
            + self.longest_held.values().map(Vec::len).sum::<usize>()
            + self.weakest_by_link.values().map(Vec::len).sum::<usize>()
            + self.most_links.values().map(Vec::len).sum::<usize>()
            + self.weakest_by_age.values().map(Vec::len).sum::<usize>()
    }
}
