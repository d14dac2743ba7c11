//! FanTrade Events - hash-chained JSONL journal
//!
//! The journal is the source of truth. Every durable state change
//! (registrations, order submissions/cancellations, fills, ticks) is appended
//! here before it is applied in memory, and startup replays it in order.

pub mod error;
pub mod event;
pub mod hash;
pub mod journal;
pub mod reader;
pub mod record;
pub mod store;

pub use error::EventError;
pub use event::MarketEvent;
pub use hash::{verify_chain, ChainError};
pub use journal::{Journal, JsonlJournal, MemoryJournal};
pub use reader::EventReader;
pub use record::JournalRecord;
pub use store::EventStore;
