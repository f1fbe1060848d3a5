//! Portal observation model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Faction, PortalId};

/// One snapshot of a portal at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Portal this snapshot belongs to
    pub portal_id: PortalId,

    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Owning faction (0 = neutral)
    pub owner: Faction,

    /// Portal level
    #[serde(default = "default_level")]
    pub level: u32,

    /// Health percentage, 0 to 100
    #[serde(default = "default_health")]
    pub health: u32,

    /// Active links at this snapshot
    #[serde(default)]
    pub link_count: u32,
}

fn default_level() -> u32 {
    1
}

fn default_health() -> u32 {
    100
}

impl Observation {
    /// Create an observation with the ingress defaults for level, health and links.
    pub fn new(portal_id: impl Into<PortalId>, timestamp: DateTime<Utc>, owner: Faction) -> Self {
        Self {
            portal_id: portal_id.into(),
            timestamp,
            owner,
            level: default_level(),
            health: default_health(),
            link_count: 0,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health;
        self
    }

    pub fn with_links(mut self, link_count: u32) -> Self {
        self.link_count = link_count;
        self
    }
}
