//! Ledger domain models shared across the store, monitor, and codec.

pub mod category;
pub mod transaction;

pub use category::{default_categories, Category};
pub use transaction::{Transaction, TxKind};
