//! Core data models for portal statistics.

mod ids;
mod leaderboard;
mod observation;
mod stats;

pub use ids::*;
pub use leaderboard::*;
pub use observation::*;
pub use stats::*;
