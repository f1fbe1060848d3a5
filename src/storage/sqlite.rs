//! Historical observation store.
//!
//! Merges the three observation sources of the store into one stream,
//! ordered by portal and newest first:
//! - `portal_obs` snapshots, with link counts from `link_obs`
//! - `captured_plexts` capture events, owned by the capturing player's faction
//! - a neutral snapshot one millisecond before every capture

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use super::StorageError;
use crate::models::{Faction, Observation};

const OBSERVATIONS_QUERY: &str = "
SELECT portal_id, obs_time_ms, team, level, health, COALESCE(links, 0) AS links
FROM (
    SELECT
        portal AS portal_id,
        CAST(obs_time * 1000 AS INTEGER) AS obs_time_ms,
        team,
        COALESCE(level, 1) AS level,
        COALESCE(health, 100) AS health,
        id AS obs_id
    FROM portal_obs

    UNION ALL

    SELECT c.portal, c.timestampMs, p.faction, 1, 100, NULL
    FROM captured_plexts c
    JOIN players p ON p.id = c.player

    UNION ALL

    SELECT c.portal, c.timestampMs - 1, 0, 1, 0, NULL
    FROM captured_plexts c
    JOIN players p ON p.id = c.player
) merged
LEFT JOIN (
    SELECT obs_id, COUNT(*) AS links
    FROM (
        SELECT portal_head AS obs_id FROM link_obs
        UNION ALL
        SELECT portal_tail AS obs_id FROM link_obs
    ) endpoints
    GROUP BY obs_id
) link_counts USING (obs_id)
ORDER BY portal_id, obs_time_ms DESC
";

/// Raw row before domain conversion.
struct ObservationRow {
    portal_id: String,
    obs_time_ms: i64,
    team: i64,
    level: i64,
    health: i64,
    links: i64,
}

/// Read-only view over the historical SQLite store.
pub struct SqliteSource {
    db: Connection,
}

impl SqliteSource {
    /// Open an existing database read-only.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if !path.exists() {
            return Err(StorageError::PathNotFound(path.to_path_buf()));
        }
        let db = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        info!("Opened observation store {:?}", path);
        Ok(Self { db })
    }

    pub fn from_connection(db: Connection) -> Self {
        Self { db }
    }

    /// Load the merged observation stream.
    pub fn load_observations(&self) -> Result<Vec<Observation>, StorageError> {
        let mut stmt = self.db.prepare(OBSERVATIONS_QUERY)?;
        let rows = stmt.query_map([], |row| {
            Ok(ObservationRow {
                portal_id: row.get(0)?,
                obs_time_ms: row.get(1)?,
                team: row.get(2)?,
                level: row.get(3)?,
                health: row.get(4)?,
                links: row.get(5)?,
            })
        })?;

        let mut observations = Vec::new();
        for row in rows {
            observations.push(to_observation(row?)?);
        }

        debug!("Loaded {} observations from store", observations.len());
        Ok(observations)
    }
}

fn to_observation(row: ObservationRow) -> Result<Observation, StorageError> {
    let timestamp = DateTime::<Utc>::from_timestamp_millis(row.obs_time_ms).ok_or_else(|| {
        StorageError::InvalidTimestamp {
            portal_id: row.portal_id.clone(),
            millis: row.obs_time_ms,
        }
    })?;

    let owner = u8::try_from(row.team).map_err(|_| out_of_range(&row, "team", row.team))?;
    let level = u32::try_from(row.level).map_err(|_| out_of_range(&row, "level", row.level))?;
    let health = u32::try_from(row.health).map_err(|_| out_of_range(&row, "health", row.health))?;
    let links = u32::try_from(row.links).map_err(|_| out_of_range(&row, "links", row.links))?;

    Ok(Observation::new(row.portal_id, timestamp, Faction(owner))
        .with_level(level)
        .with_health(health)
        .with_links(links))
}

fn out_of_range(row: &ObservationRow, field: &'static str, value: i64) -> StorageError {
    StorageError::OutOfRange {
        portal_id: row.portal_id.clone(),
        field,
        value,
    }
}
