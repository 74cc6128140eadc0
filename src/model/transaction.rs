use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single income or expense entry. Amounts are denominated in whatever the
/// ledger's currency was at write time; changing the ledger currency rebases
/// every stored amount in the same operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub title: String,
    pub amount: f64,
    /// Category name reference. Not a foreign key; may dangle.
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TxKind,
    /// Epoch milliseconds.
    pub date: i64,
    #[serde(default)]
    pub note: String,
}

impl Transaction {
    pub fn new(
        title: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        kind: TxKind,
        date: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            amount,
            category: category.into(),
            kind,
            date,
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// True when the transaction falls inside the calendar month of `now`.
    pub fn in_month_of(&self, now: DateTime<Utc>) -> bool {
        match DateTime::<Utc>::from_timestamp_millis(self.date) {
            Some(when) => when.year() == now.year() && when.month() == now.month(),
            None => false,
        }
    }

    /// True when the transaction falls on the same calendar day as `now`.
    pub fn on_day_of(&self, now: DateTime<Utc>) -> bool {
        match DateTime::<Utc>::from_timestamp_millis(self.date) {
            Some(when) => when.date_naive() == now.date_naive(),
            None => false,
        }
    }
}

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxKind {
    Income,
    Expense,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_kind_with_wire_names() {
        let txn = Transaction::new("Lunch", 12.5, "Food", TxKind::Expense, 1_700_000_000_000);
        let json = serde_json::to_string(&txn).unwrap();
        assert!(json.contains("\"type\":\"EXPENSE\""));
        assert!(json.contains("\"date\":1700000000000"));
    }

    #[test]
    fn note_defaults_to_empty_on_decode() {
        let json = r#"{
            "id": "abc",
            "title": "Lunch",
            "amount": 12.5,
            "category": "Food",
            "type": "EXPENSE",
            "date": 1700000000000
        }"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.note, "");
    }

    #[test]
    fn month_filter_respects_year_boundary() {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let last_january = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let txn = Transaction::new(
            "Rent",
            800.0,
            "Housing",
            TxKind::Expense,
            last_january.timestamp_millis(),
        );
        assert!(!txn.in_month_of(now));
    }
}
