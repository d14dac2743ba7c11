//! Journal - the write side every store appends through

use std::path::Path;
use std::sync::Mutex;

use crate::error::EventError;
use crate::event::MarketEvent;
use crate::hash::GENESIS_HASH;
use crate::reader::EventReader;
use crate::record::JournalRecord;
use crate::store::EventStore;

/// Append-only sink for market events.
///
/// An `Ok` return means the event is durable; callers apply the matching
/// in-memory change only after that.
pub trait Journal: Send + Sync {
    fn append(&self, event: &MarketEvent) -> Result<JournalRecord, EventError>;
}

struct ChainHead {
    last_sequence: u64,
    last_hash: String,
}

impl ChainHead {
    fn seal(&self, event: &MarketEvent) -> Result<JournalRecord, EventError> {
        JournalRecord::seal(self.last_sequence + 1, self.last_hash.clone(), event.clone())
    }

    fn advance(&mut self, record: &JournalRecord) {
        self.last_sequence = record.sequence;
        self.last_hash = record.hash.clone();
    }
}

impl Default for ChainHead {
    fn default() -> Self {
        Self {
            last_sequence: 0,
            last_hash: GENESIS_HASH.to_string(),
        }
    }
}

/// Hash-chained journal on disk (JSONL, one file per day)
pub struct JsonlJournal {
    inner: Mutex<(EventStore, ChainHead)>,
}

impl JsonlJournal {
    /// Open the journal directory, continuing the chain after its last record
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EventError> {
        let path = path.as_ref();
        let store = EventStore::new(path)?;

        let mut head = ChainHead::default();
        if let Some(last) = EventReader::from_directory(path)?.last_record()? {
            head.advance(&last);
        }

        tracing::info!(
            path = %path.display(),
            last_sequence = head.last_sequence,
            "journal opened"
        );

        Ok(Self {
            inner: Mutex::new((store, head)),
        })
    }

    pub fn last_sequence(&self) -> u64 {
        self.inner
            .lock()
            .map(|guard| guard.1.last_sequence)
            .unwrap_or_default()
    }
}

impl Journal for JsonlJournal {
    fn append(&self, event: &MarketEvent) -> Result<JournalRecord, EventError> {
        let mut guard = self.inner.lock().map_err(|_| EventError::Poisoned)?;
        let (store, head) = &mut *guard;

        let record = head.seal(event)?;
        store.append(&record)?;
        head.advance(&record);

        Ok(record)
    }
}

/// In-memory journal for tests and ephemeral markets
#[derive(Default)]
pub struct MemoryJournal {
    inner: Mutex<(Vec<JournalRecord>, ChainHead)>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record appended so far
    pub fn records(&self) -> Vec<JournalRecord> {
        self.inner
            .lock()
            .map(|guard| guard.0.clone())
            .unwrap_or_default()
    }

    pub fn events(&self) -> Vec<MarketEvent> {
        self.records().into_iter().map(|r| r.event).collect()
    }
}

impl Journal for MemoryJournal {
    fn append(&self, event: &MarketEvent) -> Result<JournalRecord, EventError> {
        let mut guard = self.inner.lock().map_err(|_| EventError::Poisoned)?;
        let (records, head) = &mut *guard;

        let record = head.seal(event)?;
        head.advance(&record);
        records.push(record.clone());

        Ok(record)
    }
}
