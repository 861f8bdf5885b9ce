//! Persistence: a key/value record boundary and the three stores built on it.
//!
//! - `records`: `RecordStore` trait with `SQLite` and in-memory backends
//! - `transcript`: bounded chat log (head eviction)
//! - `history`: one generation event per session (tail eviction)
//! - `registry`: saved sessions, most recent first

pub mod error;
pub mod history;
pub mod records;
pub mod registry;
pub mod transcript;

pub use error::{StoreError, StoreResult};
pub use history::HistoryStore;
pub use records::{
    MemoryRecordStore, RecordStore, SqliteRecordStore, StoreFuture, load_or_default, save_json,
};
pub use registry::SessionRegistry;
pub use transcript::{TranscriptStore, deep_copy};
