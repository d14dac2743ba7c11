//! Hash chain utilities for journal integrity

use crate::error::EventError;
use crate::record::JournalRecord;
use sha2::{Digest, Sha256};

/// `prev_hash` of the first record
pub const GENESIS_HASH: &str = "GENESIS";

/// Calculate SHA256 hash of record content (excluding the hash field itself)
pub fn calculate_record_hash(record: &JournalRecord) -> Result<String, EventError> {
    let mut hasher = Sha256::new();

    hasher.update(record.sequence.to_le_bytes());
    hasher.update(record.prev_hash.as_bytes());
    hasher.update(record.timestamp.to_rfc3339().as_bytes());
    hasher.update(serde_json::to_string(&record.event)?.as_bytes());

    Ok(hex::encode(hasher.finalize()))
}

/// Verify hash chain integrity
pub fn verify_chain(records: &[JournalRecord]) -> Result<(), EventError> {
    let mut prev_hash = GENESIS_HASH.to_string();

    for (i, record) in records.iter().enumerate() {
        if record.prev_hash != prev_hash {
            return Err(ChainError::BrokenLink {
                sequence: record.sequence,
                expected: prev_hash,
                actual: record.prev_hash.clone(),
            }
            .into());
        }

        let calculated = calculate_record_hash(record)?;
        if record.hash != calculated {
            return Err(ChainError::InvalidHash {
                sequence: record.sequence,
                expected: calculated,
                actual: record.hash.clone(),
            }
            .into());
        }

        let expected_sequence = i as u64 + 1;
        if record.sequence != expected_sequence {
            return Err(ChainError::InvalidSequence {
                expected: expected_sequence,
                actual: record.sequence,
            }
            .into());
        }

        prev_hash = record.hash.clone();
    }

    Ok(())
}

/// Errors in hash chain verification
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("Broken link at seq {sequence}: expected prev_hash '{expected}', got '{actual}'")]
    BrokenLink {
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("Invalid hash at seq {sequence}: expected '{expected}', got '{actual}'")]
    InvalidHash {
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("Invalid sequence: expected {expected}, got {actual}")]
    InvalidSequence { expected: u64, actual: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarketEvent;
    use fantrade_core::Amount;

    fn chain(len: u64) -> Vec<JournalRecord> {
        let mut records: Vec<JournalRecord> = Vec::new();
        for sequence in 1..=len {
            let prev_hash = records
                .last()
                .map(|r| r.hash.clone())
                .unwrap_or_else(|| GENESIS_HASH.to_string());
            let event = MarketEvent::user_registered(format!("user-{sequence}"), Amount::ZERO);
            records.push(JournalRecord::seal(sequence, prev_hash, event).unwrap());
        }
        records
    }

    #[test]
    fn test_verify_valid_chain() {
        assert!(verify_chain(&chain(3)).is_ok());
    }

    #[test]
    fn test_tampered_event_detected() {
        let mut records = chain(2);
        records[1].event = MarketEvent::user_registered("mallory", Amount::ZERO);

        let result = verify_chain(&records);
        assert!(matches!(
            result,
            Err(EventError::BrokenChain(ChainError::InvalidHash { sequence: 2, .. }))
        ));
    }

    #[test]
    fn test_broken_link_detected() {
        let mut records = chain(3);
        records.remove(1);

        let result = verify_chain(&records);
        assert!(matches!(
            result,
            Err(EventError::BrokenChain(ChainError::BrokenLink { .. }))
        ));
    }
}
