//! Abstract notification dispatch. Delivery guarantees live with the host;
//! this crate only builds the messages and hands them to a sink.

use crate::currency::format_amount;

/// Relative urgency of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Default,
    High,
}

/// Sink accepting fully rendered notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, title: &str, body: &str, priority: Priority);
}

/// Message for a budget that has been exceeded.
pub fn budget_exceeded_message(spent: f64, budget: f64, currency: &str) -> (String, String) {
    let body = format!(
        "You have exceeded your monthly budget by {}! ({} of {})",
        format_amount(spent - budget, currency),
        format_amount(spent, currency),
        format_amount(budget, currency)
    );
    ("Budget Exceeded".to_string(), body)
}

/// Soft warning when spending approaches the ceiling.
pub fn budget_approaching_message(
    percentage: i64,
    spent: f64,
    budget: f64,
    currency: &str,
) -> (String, String) {
    let body = format!(
        "You've used {}% of your monthly budget ({} of {})",
        percentage,
        format_amount(spent, currency),
        format_amount(budget, currency)
    );
    ("Budget Alert".to_string(), body)
}

/// Daily check-in reminder.
pub fn daily_reminder_message() -> (String, String) {
    (
        "Transaction Reminder".to_string(),
        "Don't forget to record your daily transactions".to_string(),
    )
}
