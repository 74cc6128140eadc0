//! Stateless currency conversion and display helpers.
//!
//! Rates are a fixed table of currency→USD factors (static configuration, not
//! user-editable). Rebasing multiplies every stored amount by one factor; the
//! store performs the surrounding read-rebase-write ordering.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::model::Transaction;

static USD_RATES: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("USD", 1.0),
        ("EUR", 0.85),
        ("GBP", 0.75),
        ("JPY", 110.0),
        ("CAD", 1.25),
        ("AUD", 1.35),
        ("LKR", 320.0),
    ])
});

/// Codes present in the rate table, in display order.
pub fn available_currencies() -> Vec<&'static str> {
    vec!["USD", "EUR", "GBP", "JPY", "CAD", "AUD", "LKR"]
}

/// Multiplier that converts an amount denominated in `from` into `to`.
/// Unknown codes fall back to parity, so `from == to` always yields 1.0.
pub fn conversion_factor(from: &str, to: &str) -> f64 {
    let from_rate = USD_RATES.get(from).copied().unwrap_or(1.0);
    let to_rate = USD_RATES.get(to).copied().unwrap_or(1.0);
    to_rate / from_rate
}

/// Returns a copy of `transactions` with every amount multiplied by `factor`.
pub fn rebase(transactions: &[Transaction], factor: f64) -> Vec<Transaction> {
    transactions
        .iter()
        .map(|txn| {
            let mut rebased = txn.clone();
            rebased.amount = txn.amount * factor;
            rebased
        })
        .collect()
}

/// Rebases a budget ceiling by the same factor.
pub fn rebase_budget(budget: f64, factor: f64) -> f64 {
    budget * factor
}

/// Display symbol for a currency code; unknown codes render as the code.
pub fn symbol_for(code: &str) -> &str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "CAD" => "CA$",
        "AUD" => "A$",
        "LKR" => "Rs",
        other => other,
    }
}

/// Formats an amount for notification text, e.g. `€1234.56`.
pub fn format_amount(amount: f64, code: &str) -> String {
    format!("{}{:.2}", symbol_for(code), amount)
}
