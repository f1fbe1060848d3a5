//! Derived per-portal statistics.

use std::cmp::Ordering;

use chrono::Duration;
use serde::{Serialize, Serializer};

use super::{Faction, PortalId};

/// Serialize durations as whole elapsed seconds.
pub mod seconds {
    use chrono::Duration;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }
}

/// Average time a portal stays with one owner.
///
/// `NeverFlipped` orders after every real duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AverageHold {
    Held(Duration),
    NeverFlipped,
}

impl AverageHold {
    /// Average hold for `flip_count` flips over `overall`.
    pub fn from_flips(overall: Duration, flip_count: u32) -> Self {
        if flip_count == 0 {
            return AverageHold::NeverFlipped;
        }
        // Flip counts beyond i32 are not reachable from real histories.
        let divisor = i32::try_from(flip_count).unwrap_or(i32::MAX);
        AverageHold::Held(overall / divisor)
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            AverageHold::Held(d) => Some(*d),
            AverageHold::NeverFlipped => None,
        }
    }

    pub fn is_never_flipped(&self) -> bool {
        matches!(self, AverageHold::NeverFlipped)
    }

    /// Whole seconds for export. `NeverFlipped` becomes `i64::MAX`.
    pub fn export_seconds(&self) -> i64 {
        match self {
            AverageHold::Held(d) => d.num_seconds(),
            AverageHold::NeverFlipped => i64::MAX,
        }
    }
}

impl PartialOrd for AverageHold {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AverageHold {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (AverageHold::Held(a), AverageHold::Held(b)) => a.cmp(b),
            (AverageHold::Held(_), AverageHold::NeverFlipped) => Ordering::Less,
            (AverageHold::NeverFlipped, AverageHold::Held(_)) => Ordering::Greater,
            (AverageHold::NeverFlipped, AverageHold::NeverFlipped) => Ordering::Equal,
        }
    }
}

impl Serialize for AverageHold {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AverageHold::Held(d) => serializer.serialize_some(&d.num_seconds()),
            AverageHold::NeverFlipped => serializer.serialize_none(),
        }
    }
}

/// Statistics derived from one portal's full observation history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortalStats {
    pub portal_id: PortalId,

    /// Owner at the newest observation
    pub owner: Faction,

    /// Ownership changes seen behind the newest observation
    pub flip_count: u32,

    /// Newest minus oldest observation time
    #[serde(with = "seconds")]
    pub overall_duration: Duration,

    pub average_hold: AverageHold,

    /// Time since the most recent flip, or the whole history if none
    #[serde(with = "seconds")]
    pub current_held: Duration,

    pub health: u32,
    pub level: u32,
    pub link_count: u32,

    /// health / (level + links); only present for owned portals
    pub weakness_score: Option<f64>,
}

impl PortalStats {
    /// Portals owned by a real faction.
    pub fn is_owned(&self) -> bool {
        !self.owner.is_neutral()
    }
}
