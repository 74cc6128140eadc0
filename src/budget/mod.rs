//! Spend-vs-budget evaluation over the current calendar month.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    core::{errors::Result, time::Clock},
    model::{Transaction, TxKind},
    notify::{budget_approaching_message, budget_exceeded_message, NotificationSink, Priority},
    store::{KeyValueBackend, LedgerStore},
};

/// Soft-warning threshold. Advisory only; the exceeded alert is the sole hard
/// contract.
const APPROACHING_PERCENT: i64 = 90;

/// Overall budget position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetState {
    /// No positive budget is configured; no alert ever fires.
    Unset,
    Ok,
    Exceeded,
}

/// Result of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetStatus {
    pub spent: f64,
    pub budget: f64,
    /// Rounded percentage of budget spent; reported even above 100.
    pub percentage: i64,
    pub state: BudgetState,
}

/// Decides whether a given evaluation should produce an alert. The default
/// policy re-fires on every over-budget evaluation; callers wanting a
/// cooldown swap in [`Cooldown`] without touching the evaluation itself.
pub trait AlertPolicy: Send {
    fn should_alert(&mut self, status: &BudgetStatus, now: DateTime<Utc>) -> bool;
}

/// Fires on every evaluation while the budget is exceeded.
#[derive(Debug, Default)]
pub struct AlwaysAlert;

impl AlertPolicy for AlwaysAlert {
    fn should_alert(&mut self, status: &BudgetStatus, _now: DateTime<Utc>) -> bool {
        status.state == BudgetState::Exceeded
    }
}

/// Suppresses repeat exceeded alerts inside the cooldown window.
#[derive(Debug)]
pub struct Cooldown {
    window: chrono::Duration,
    last_fired: Option<DateTime<Utc>>,
}

impl Cooldown {
    pub fn new(window: chrono::Duration) -> Self {
        Self {
            window,
            last_fired: None,
        }
    }
}

impl AlertPolicy for Cooldown {
    fn should_alert(&mut self, status: &BudgetStatus, now: DateTime<Utc>) -> bool {
        if status.state != BudgetState::Exceeded {
            return false;
        }
        match self.last_fired {
            Some(previous) if now - previous < self.window => false,
            _ => {
                self.last_fired = Some(now);
                true
            }
        }
    }
}

/// Computes spend against budget for the calendar month containing `now`.
/// Only expense-kind transactions inside that month count; this is a strict
/// current-month filter, not a rolling window.
pub fn evaluate(transactions: &[Transaction], budget: f64, now: DateTime<Utc>) -> BudgetStatus {
    if budget <= 0.0 {
        return BudgetStatus {
            spent: 0.0,
            budget,
            percentage: 0,
            state: BudgetState::Unset,
        };
    }
    let spent: f64 = transactions
        .iter()
        .filter(|txn| txn.kind == TxKind::Expense && txn.in_month_of(now))
        .map(|txn| txn.amount)
        .sum();
    let percentage = (spent / budget * 100.0).round() as i64;
    let state = if spent > budget {
        BudgetState::Exceeded
    } else {
        BudgetState::Ok
    };
    BudgetStatus {
        spent,
        budget,
        percentage,
        state,
    }
}

/// Reads the store, evaluates the month, and dispatches alerts through the
/// sink according to `policy`. Exceeded alerts go out at high priority; the
/// optional approaching warning at default priority.
pub fn check_and_notify<B: KeyValueBackend>(
    store: &LedgerStore<B>,
    sink: &dyn NotificationSink,
    policy: &mut dyn AlertPolicy,
    clock: &dyn Clock,
) -> Result<BudgetStatus> {
    let budget = store.budget()?;
    let transactions = store.load_transactions()?;
    let now = clock.now();
    let status = evaluate(&transactions, budget, now);
    debug!(
        spent = status.spent,
        budget = status.budget,
        percentage = status.percentage,
        "budget evaluated"
    );
    match status.state {
        BudgetState::Exceeded => {
            if policy.should_alert(&status, now) {
                let currency = store.currency()?;
                let (title, body) =
                    budget_exceeded_message(status.spent, status.budget, &currency);
                sink.notify(&title, &body, Priority::High);
            }
        }
        BudgetState::Ok if status.percentage >= APPROACHING_PERCENT => {
            let currency = store.currency()?;
            let (title, body) = budget_approaching_message(
                status.percentage,
                status.spent,
                status.budget,
                &currency,
            );
            sink.notify(&title, &body, Priority::Default);
        }
        _ => {}
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn expense_this_month(amount: f64) -> Transaction {
        Transaction::new(
            "Groceries",
            amount,
            "Food",
            TxKind::Expense,
            now().timestamp_millis(),
        )
    }

    #[test]
    fn unset_budget_never_alerts() {
        for budget in [0.0, -5.0] {
            let status = evaluate(&[expense_this_month(999.0)], budget, now());
            assert_eq!(status.state, BudgetState::Unset);
        }
    }

    #[test]
    fn exceeded_at_150_percent() {
        let status = evaluate(
            &[expense_this_month(100.0), expense_this_month(50.0)],
            100.0,
            now(),
        );
        assert_eq!(status.state, BudgetState::Exceeded);
        assert_eq!(status.percentage, 150);
    }

    #[test]
    fn ok_at_50_percent() {
        let status = evaluate(&[expense_this_month(50.0)], 100.0, now());
        assert_eq!(status.state, BudgetState::Ok);
        assert_eq!(status.percentage, 50);
    }

    #[test]
    fn income_and_other_months_do_not_count() {
        let last_month = Transaction::new(
            "Rent",
            500.0,
            "Housing",
            TxKind::Expense,
            (now() - Duration::days(40)).timestamp_millis(),
        );
        let income = Transaction::new(
            "Salary",
            2000.0,
            "Salary",
            TxKind::Income,
            now().timestamp_millis(),
        );
        let status = evaluate(&[last_month, income, expense_this_month(30.0)], 100.0, now());
        assert_eq!(status.spent, 30.0);
        assert_eq!(status.state, BudgetState::Ok);
    }

    #[test]
    fn exact_budget_spend_is_not_exceeded() {
        let status = evaluate(&[expense_this_month(100.0)], 100.0, now());
        assert_eq!(status.state, BudgetState::Ok);
        assert_eq!(status.percentage, 100);
    }

    #[test]
    fn always_alert_refires_every_evaluation() {
        let mut policy = AlwaysAlert;
        let status = evaluate(&[expense_this_month(150.0)], 100.0, now());
        assert!(policy.should_alert(&status, now()));
        assert!(policy.should_alert(&status, now()));
    }

    #[test]
    fn cooldown_suppresses_repeats_inside_window() {
        let mut policy = Cooldown::new(Duration::hours(6));
        let status = evaluate(&[expense_this_month(150.0)], 100.0, now());
        assert!(policy.should_alert(&status, now()));
        assert!(!policy.should_alert(&status, now() + Duration::hours(1)));
        assert!(policy.should_alert(&status, now() + Duration::hours(7)));
    }
}
