use serde::{Deserialize, Serialize};

use super::transaction::TxKind;

/// Categorises ledger activity. `(name, kind)` pairs are unique within a
/// ledger; transactions reference categories by name only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TxKind,
    #[serde(default)]
    pub emoji: String,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: TxKind, emoji: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            emoji: emoji.into(),
        }
    }
}

/// The seeded category set returned whenever no categories are stored.
/// Returning these instead of an empty sequence is a contract.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("Salary", TxKind::Income, "💰"),
        Category::new("Gifts", TxKind::Income, "🎁"),
        Category::new("Food", TxKind::Expense, "🍔"),
        Category::new("Transport", TxKind::Expense, "🚗"),
        Category::new("Entertainment", TxKind::Expense, "🎬"),
        Category::new("Housing", TxKind::Expense, "🏠"),
        Category::new("Utilities", TxKind::Expense, "💡"),
        Category::new("Healthcare", TxKind::Expense, "🏥"),
    ]
}
