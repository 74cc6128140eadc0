//! Daily check-in reminder: persisted trigger time, timer arming with an
//! escalating fallback chain, and the fire-and-re-arm loop.

pub mod prefs;
pub mod scheduler;

pub use prefs::{formatted_reminder_time, reminder_time, set_reminder_time};
pub use scheduler::{
    ReminderScheduler, TimerBackend, TimerError, TimerId, TimerState, BACKUP_TIMER_ID,
    PRIMARY_TIMER_ID,
};
