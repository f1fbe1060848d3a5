//! Observation sources and report output.
//!
//! Handles the I/O around the statistics engine:
//! - The historical SQLite store (portal observations, captures, links)
//! - JSONL observation files
//! - CSV leaderboard export

mod export;
mod jsonl;
mod sqlite;

pub use self::export::{CsvExporter, ExportSummary};
pub use self::jsonl::{read_observations, write_observations, JsonlIterator, JsonlReader, JsonlWriter};
pub use self::sqlite::SqliteSource;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON error on line {line} of {path:?}: {source}")]
    JsonLine {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid timestamp {millis}ms for portal {portal_id}")]
    InvalidTimestamp { portal_id: String, millis: i64 },

    #[error("Value out of range for portal {portal_id}: {field} = {value}")]
    OutOfRange {
        portal_id: String,
        field: &'static str,
        value: i64,
    },
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// The historical observation database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("guardian.sqlite3")
    }

    /// Pre-merged observation stream in JSONL form.
    pub fn observations_path(&self) -> PathBuf {
        self.data_dir.join("observations.jsonl")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir.join("csvs")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
