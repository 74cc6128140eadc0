use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    budget::{self, AlertPolicy},
    core::{errors::Result, time::Clock},
    model::Transaction,
    notify::{daily_reminder_message, NotificationSink, Priority},
    store::{KeyValueBackend, LedgerStore},
};

use super::prefs;

/// Identity of the precise one-shot (or its repeating fallback).
pub const PRIMARY_TIMER_ID: TimerId = 123;
/// Identity of the always-approximate backup timer. Distinct from the
/// primary so canceling one never cancels the other.
pub const BACKUP_TIMER_ID: TimerId = 124;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

pub type TimerId = u32;

/// Failure modes when arming a host timer.
#[derive(Debug, Error)]
pub enum TimerError {
    /// The host refuses precise-timer privileges. Escalates to the next
    /// fallback tier rather than failing the schedule.
    #[error("precise timer denied: {0}")]
    PermissionDenied(String),
    #[error("timer backend failed: {0}")]
    Failed(String),
}

impl From<TimerError> for crate::core::errors::LedgerError {
    fn from(err: TimerError) -> Self {
        crate::core::errors::LedgerError::SchedulingDenied(err.to_string())
    }
}

/// Host timer facility. The host owns actual delivery; this crate only
/// requires two independently cancelable timer identities per reminder.
pub trait TimerBackend: Send + Sync {
    /// Arms a precise, wake-capable one-shot for the given instant.
    fn arm_exact(&self, id: TimerId, at_millis: i64) -> std::result::Result<(), TimerError>;

    /// Arms an approximate recurring timer starting at `first_millis`.
    fn arm_repeating(
        &self,
        id: TimerId,
        first_millis: i64,
        period_millis: i64,
    ) -> std::result::Result<(), TimerError>;

    /// Cancels a timer. Must be a no-op for unarmed ids.
    fn cancel(&self, id: TimerId);
}

/// Lifecycle of one timer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Armed,
    Fired,
}

/// Ordered fallback tiers for the primary path.
#[derive(Debug, Clone, Copy)]
enum ArmStrategy {
    Exact,
    Repeating,
}

const PRIMARY_CHAIN: [ArmStrategy; 2] = [ArmStrategy::Exact, ArmStrategy::Repeating];

#[derive(Debug)]
struct SchedulerState {
    primary: TimerState,
    backup: TimerState,
}

/// Arranges the daily check-in callback. Each timer identity independently
/// walks `Idle → Armed → Fired → Idle`, re-armed for the next day after a
/// fire. Scheduling failures degrade to "silently absent" behind a log line;
/// they never destabilize the host process.
pub struct ReminderScheduler<T: TimerBackend> {
    backend: T,
    state: Mutex<SchedulerState>,
}

impl<T: TimerBackend> ReminderScheduler<T> {
    pub fn new(backend: T) -> Self {
        Self {
            backend,
            state: Mutex::new(SchedulerState {
                primary: TimerState::Idle,
                backup: TimerState::Idle,
            }),
        }
    }

    /// Arms both paths for the nearest future occurrence of `hour:minute`.
    /// A time already past today targets tomorrow. Previously armed timers
    /// for this reminder are canceled first, so a stale prior schedule can
    /// never double-deliver.
    pub fn schedule(&self, hour: u32, minute: u32, clock: &dyn Clock) -> Result<()> {
        prefs::validate_time(hour, minute)?;
        let at = next_trigger_millis(clock.now(), hour, minute);

        self.cancel();

        let mut state = self.lock_state();
        if self.arm_primary(at) {
            state.primary = TimerState::Armed;
        }
        match self.backend.arm_repeating(BACKUP_TIMER_ID, at, DAY_MILLIS) {
            Ok(()) => state.backup = TimerState::Armed,
            Err(err) => warn!(error = %err, "backup reminder timer failed to arm"),
        }
        if state.primary == TimerState::Idle && state.backup == TimerState::Idle {
            warn!("all reminder tiers exhausted; reminder is disabled until rescheduled");
        } else {
            debug!(at_millis = at, "daily reminder armed");
        }
        Ok(())
    }

    /// Cancels both timer identities. Safe to call when nothing is armed and
    /// safe concurrently with a firing callback: the callback may still
    /// complete once, but nothing re-arms after cancellation settles.
    pub fn cancel(&self) {
        self.backend.cancel(PRIMARY_TIMER_ID);
        self.backend.cancel(BACKUP_TIMER_ID);
        let mut state = self.lock_state();
        state.primary = TimerState::Idle;
        state.backup = TimerState::Idle;
    }

    /// Entry point invoked by the host when either timer fires. Sends the
    /// daily reminder (skipped when a transaction was already recorded
    /// today), runs the budget check, then re-arms the primary path for the
    /// next day.
    pub fn on_fire<B: KeyValueBackend>(
        &self,
        store: &LedgerStore<B>,
        sink: &dyn NotificationSink,
        policy: &mut dyn AlertPolicy,
        clock: &dyn Clock,
    ) -> Result<()> {
        let was_armed = {
            let mut state = self.lock_state();
            let was_armed = state.primary == TimerState::Armed;
            if was_armed {
                state.primary = TimerState::Fired;
            }
            was_armed
        };

        let transactions = store.load_transactions()?;
        if has_transaction_today(&transactions, clock.now()) {
            debug!("transaction already recorded today; skipping reminder notification");
        } else {
            let (title, body) = daily_reminder_message();
            sink.notify(&title, &body, Priority::High);
        }
        budget::check_and_notify(store, sink, policy, clock)?;

        // Re-arm only when this fire came from a live schedule. A cancel that
        // landed before the callback leaves the chain broken on purpose.
        if was_armed {
            let (hour, minute) = prefs::reminder_time(store)?;
            let at = next_trigger_millis(clock.now(), hour, minute);
            let mut state = self.lock_state();
            state.primary = if self.arm_primary(at) {
                TimerState::Armed
            } else {
                TimerState::Idle
            };
        }
        Ok(())
    }

    /// Shared access to the host timer facility, e.g. for host-side wiring.
    pub fn backend(&self) -> &T {
        &self.backend
    }

    pub fn primary_state(&self) -> TimerState {
        self.lock_state().primary
    }

    pub fn backup_state(&self) -> TimerState {
        self.lock_state().backup
    }

    /// Walks the fallback chain in order; true when any tier armed.
    fn arm_primary(&self, at_millis: i64) -> bool {
        for strategy in PRIMARY_CHAIN {
            let outcome = match strategy {
                ArmStrategy::Exact => self.backend.arm_exact(PRIMARY_TIMER_ID, at_millis),
                ArmStrategy::Repeating => {
                    self.backend
                        .arm_repeating(PRIMARY_TIMER_ID, at_millis, DAY_MILLIS)
                }
            };
            match outcome {
                Ok(()) => {
                    debug!(?strategy, "primary reminder timer armed");
                    return true;
                }
                Err(err) => {
                    warn!(?strategy, error = %err, "primary tier failed; trying next");
                }
            }
        }
        false
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

/// Epoch millis of the nearest future `hour:minute` relative to `now`.
/// Out-of-range components are clamped so a damaged stored time still
/// produces a usable trigger.
fn next_trigger_millis(now: DateTime<Utc>, hour: u32, minute: u32) -> i64 {
    let today = now
        .date_naive()
        .and_hms_opt(hour.min(23), minute.min(59), 0)
        .map(|t| t.and_utc())
        .unwrap_or(now);
    let target = if today > now {
        today
    } else {
        today + Duration::days(1)
    };
    target.timestamp_millis()
}

fn has_transaction_today(transactions: &[Transaction], now: DateTime<Utc>) -> bool {
    transactions.iter().any(|txn| txn.on_day_of(now))
}
