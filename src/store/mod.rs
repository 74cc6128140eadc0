//! Durable key/value persistence for the ledger. A single [`LedgerStore`]
//! owns the canonical copy of transactions, categories, budget, currency,
//! and flags; every other component reads snapshots or mutates through it.

pub mod keys;
pub mod ledger_store;
pub mod prefs_backend;

use serde_json::Value;

use crate::core::errors::Result;

/// Seam between the ledger store and its persistence host. Mirrors the shape
/// of a platform preferences facility: opaque string keys, JSON-typed values.
pub trait KeyValueBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn put(&mut self, key: &str, value: Value) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

pub use ledger_store::{LedgerSnapshot, LedgerStore};
pub use prefs_backend::{MemoryBackend, PrefsBackend};
