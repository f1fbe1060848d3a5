//! # Guardian Stats
//!
//! Portal ownership statistics and per-faction leaderboards derived from
//! a portal observation history.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (observations, portal stats, leaderboards)
//! - **calculate**: Grouping, per-portal ownership scan and leaderboard ranking
//! - **report**: End-to-end pipeline over a complete observation stream
//! - **storage**: SQLite observation store, JSONL streams, CSV export
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod models;
pub mod report;
pub mod storage;

pub use models::*;
