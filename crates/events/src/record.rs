//! Journal record - one sealed line of the JSONL journal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EventError;
use crate::event::MarketEvent;
use crate::hash::calculate_record_hash;

/// A market event sealed into the hash chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    /// 1-based, strictly increasing
    pub sequence: u64,
    pub prev_hash: String,
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    pub event: MarketEvent,
}

impl JournalRecord {
    /// Build a record at `sequence` linked to `prev_hash` and compute its hash
    pub fn seal(
        sequence: u64,
        prev_hash: impl Into<String>,
        event: MarketEvent,
    ) -> Result<Self, EventError> {
        let mut record = Self {
            sequence,
            prev_hash: prev_hash.into(),
            hash: String::new(),
            timestamp: Utc::now(),
            event,
        };
        record.hash = calculate_record_hash(&record)?;
        Ok(record)
    }
}
