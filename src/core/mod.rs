//! Shared error taxonomy, clock abstraction, and filesystem helpers.

pub mod errors;
pub mod time;
pub mod utils;

pub use errors::{LedgerError, Result};
pub use time::{Clock, SystemClock};
