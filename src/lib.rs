#![doc(test(attr(deny(warnings))))]

//! Ledger Core provides the persistence, budgeting, currency, reminder, and
//! backup primitives behind a personal finance tracker.

pub mod backup;
pub mod budget;
pub mod core;
pub mod currency;
pub mod model;
pub mod notify;
pub mod reminder;
pub mod security;
pub mod store;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        core::utils::init_tracing();
        tracing::info!("Ledger Core tracing initialized.");
    });
}
