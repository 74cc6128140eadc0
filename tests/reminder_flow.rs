use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use ledger_core::{
    budget::AlwaysAlert,
    core::time::Clock,
    model::{Transaction, TxKind},
    notify::{NotificationSink, Priority},
    reminder::{
        self, ReminderScheduler, TimerBackend, TimerError, TimerId, TimerState, BACKUP_TIMER_ID,
        PRIMARY_TIMER_ID,
    },
    store::{LedgerStore, MemoryBackend},
};

#[derive(Clone, Copy)]
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn noon() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Exact(TimerId, i64),
    Repeating(TimerId, i64, i64),
    Cancel(TimerId),
}

#[derive(Default)]
struct ScriptedTimers {
    calls: Mutex<Vec<Call>>,
    deny_exact: bool,
}

impl ScriptedTimers {
    fn recorded(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl TimerBackend for ScriptedTimers {
    fn arm_exact(&self, id: TimerId, at: i64) -> Result<(), TimerError> {
        if self.deny_exact {
            return Err(TimerError::PermissionDenied("not granted".into()));
        }
        self.calls.lock().unwrap().push(Call::Exact(id, at));
        Ok(())
    }

    fn arm_repeating(&self, id: TimerId, first: i64, period: i64) -> Result<(), TimerError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Repeating(id, first, period));
        Ok(())
    }

    fn cancel(&self, id: TimerId) {
        self.calls.lock().unwrap().push(Call::Cancel(id));
    }
}

#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<(String, Priority)>>,
}

impl RecordingSink {
    fn titles(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, title: &str, _body: &str, priority: Priority) {
        self.sent.lock().unwrap().push((title.to_string(), priority));
    }
}

fn fresh_store() -> LedgerStore<MemoryBackend> {
    LedgerStore::open(MemoryBackend::new()).unwrap()
}

#[test]
fn past_trigger_time_schedules_for_tomorrow() {
    let scheduler = ReminderScheduler::new(ScriptedTimers::default());
    // 08:30 has already passed at noon.
    scheduler.schedule(8, 30, &noon()).unwrap();

    let expected = Utc
        .with_ymd_and_hms(2025, 6, 16, 8, 30, 0)
        .unwrap()
        .timestamp_millis();
    let calls = scheduler_calls(&scheduler);
    assert!(calls.contains(&Call::Exact(PRIMARY_TIMER_ID, expected)));
}

#[test]
fn both_timer_identities_are_armed_independently() {
    let scheduler = ReminderScheduler::new(ScriptedTimers::default());
    scheduler.schedule(20, 0, &noon()).unwrap();

    let calls = scheduler_calls(&scheduler);
    let backup_armed = calls
        .iter()
        .any(|call| matches!(call, Call::Repeating(BACKUP_TIMER_ID, _, _)));
    assert!(backup_armed, "backup timer must arm even when primary is exact");
    assert_eq!(scheduler.primary_state(), TimerState::Armed);
    assert_eq!(scheduler.backup_state(), TimerState::Armed);
}

#[test]
fn denied_exact_timers_degrade_to_repeating_primary() {
    let scheduler = ReminderScheduler::new(ScriptedTimers {
        deny_exact: true,
        ..ScriptedTimers::default()
    });
    scheduler.schedule(20, 0, &noon()).unwrap();

    let calls = scheduler_calls(&scheduler);
    assert!(calls
        .iter()
        .any(|call| matches!(call, Call::Repeating(PRIMARY_TIMER_ID, _, _))));
    assert_eq!(scheduler.primary_state(), TimerState::Armed);
}

#[test]
fn fire_sends_reminder_and_rearms_for_next_day() {
    let store = fresh_store();
    let sink = RecordingSink::default();
    let scheduler = ReminderScheduler::new(ScriptedTimers::default());
    scheduler.schedule(20, 0, &noon()).unwrap();

    scheduler
        .on_fire(&store, &sink, &mut AlwaysAlert, &noon())
        .unwrap();

    assert_eq!(sink.titles(), vec!["Transaction Reminder"]);
    assert_eq!(scheduler.primary_state(), TimerState::Armed);

    // The re-arm used the persisted default time (20:00, still ahead today).
    let expected = Utc
        .with_ymd_and_hms(2025, 6, 15, 20, 0, 0)
        .unwrap()
        .timestamp_millis();
    let exact_arms: Vec<_> = scheduler_calls(&scheduler)
        .into_iter()
        .filter(|call| matches!(call, Call::Exact(PRIMARY_TIMER_ID, _)))
        .collect();
    assert_eq!(exact_arms.len(), 2);
    assert_eq!(exact_arms[1], Call::Exact(PRIMARY_TIMER_ID, expected));
}

#[test]
fn reminder_skipped_when_transaction_already_recorded_today() {
    let store = fresh_store();
    store
        .save_transactions(&[Transaction::new(
            "Coffee",
            4.0,
            "Food",
            TxKind::Expense,
            noon().0.timestamp_millis(),
        )])
        .unwrap();
    let sink = RecordingSink::default();
    let scheduler = ReminderScheduler::new(ScriptedTimers::default());
    scheduler.schedule(20, 0, &noon()).unwrap();

    scheduler
        .on_fire(&store, &sink, &mut AlwaysAlert, &noon())
        .unwrap();

    assert!(sink.titles().is_empty());
}

#[test]
fn fire_runs_budget_check_alongside_reminder() {
    let store = fresh_store();
    store.set_currency("USD").unwrap();
    store.set_budget(100.0).unwrap();
    store
        .save_transactions(&[Transaction::new(
            "Rent",
            150.0,
            "Housing",
            TxKind::Expense,
            noon().0.timestamp_millis(),
        )])
        .unwrap();
    let sink = RecordingSink::default();
    let scheduler = ReminderScheduler::new(ScriptedTimers::default());
    scheduler.schedule(20, 0, &noon()).unwrap();

    scheduler
        .on_fire(&store, &sink, &mut AlwaysAlert, &noon())
        .unwrap();

    // Transaction exists today, so no reminder; the exceeded alert still goes out.
    assert_eq!(sink.titles(), vec!["Budget Exceeded"]);
}

#[test]
fn cancel_before_any_schedule_is_a_noop() {
    let scheduler = ReminderScheduler::new(ScriptedTimers::default());
    scheduler.cancel();
    assert_eq!(scheduler.primary_state(), TimerState::Idle);
}

#[test]
fn canceled_schedule_does_not_rearm_after_a_late_fire() {
    let store = fresh_store();
    let sink = RecordingSink::default();
    let scheduler = ReminderScheduler::new(ScriptedTimers::default());
    scheduler.schedule(20, 0, &noon()).unwrap();
    scheduler.cancel();

    // A fire that raced the cancel may still deliver once, but must not
    // restart the chain.
    scheduler
        .on_fire(&store, &sink, &mut AlwaysAlert, &noon())
        .unwrap();
    assert_eq!(scheduler.primary_state(), TimerState::Idle);
}

#[test]
fn boot_time_reschedule_uses_persisted_time() {
    let store = fresh_store();
    reminder::set_reminder_time(&store, 6, 45).unwrap();

    let (hour, minute) = reminder::reminder_time(&store).unwrap();
    let scheduler = ReminderScheduler::new(ScriptedTimers::default());
    scheduler.schedule(hour, minute, &noon()).unwrap();

    let expected = Utc
        .with_ymd_and_hms(2025, 6, 16, 6, 45, 0)
        .unwrap()
        .timestamp_millis();
    assert!(scheduler_calls(&scheduler).contains(&Call::Exact(PRIMARY_TIMER_ID, expected)));
}

fn scheduler_calls(scheduler: &ReminderScheduler<ScriptedTimers>) -> Vec<Call> {
    // The backend is owned by the scheduler; peek through a shared reference.
    scheduler.backend().recorded()
}
