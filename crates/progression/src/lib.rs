//! FanTrade Progression - gamified stats derived from fills
//!
//! Every fill feeds [`ProgressionTracker::record`], which awards XP, advances
//! the daily quest and grants titles. All of it is derived state: replaying
//! the journal's fills rebuilds it exactly.

pub mod config;
pub mod stats;
pub mod tracker;

pub use config::ProgressionConfig;
pub use stats::{ProfileStats, ProgressUpdate, Quest, Title};
pub use tracker::ProgressionTracker;
