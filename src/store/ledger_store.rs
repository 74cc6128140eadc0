use std::sync::{Mutex, MutexGuard};

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{
    core::errors::{LedgerError, Result},
    currency,
    model::{default_categories, Category, Transaction, TxKind},
};

use super::{keys, KeyValueBackend};

/// Reserved title used by a long-gone debug path. Purged once at open.
const TEST_DATA_TITLE: &str = "Test Expense";

/// Point-in-time copy of everything a backup document captures. Produced
/// under a single lock so amounts and currency code always agree.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub budget: f64,
    pub currency: String,
}

/// The single authoritative owner of all persisted ledger state.
///
/// Constructed once at process start and passed by reference to every
/// component that needs it; the handle itself proves initialization, so there
/// is no "is it initialized yet" runtime check anywhere. All mutations
/// serialize through the internal writer mutex, and compound operations
/// (currency change, restore, the hygiene sweep) hold it for their entire
/// read-modify-write.
pub struct LedgerStore<B: KeyValueBackend> {
    inner: Mutex<B>,
}

impl<B: KeyValueBackend> LedgerStore<B> {
    /// Wraps a backend and runs the one-time test-data hygiene sweep. The
    /// sweep is idempotent; a failed sweep is logged and does not block the
    /// store from opening.
    pub fn open(backend: B) -> Result<Self> {
        let store = Self {
            inner: Mutex::new(backend),
        };
        if let Err(err) = store.purge_test_data() {
            warn!(error = %err, "test-data sweep failed; continuing with store as-is");
        }
        Ok(store)
    }

    fn backend(&self) -> MutexGuard<'_, B> {
        self.inner.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    // ---- transactions ----

    /// Returns all transactions. Order is stable within a session only;
    /// callers sort explicitly for presentation.
    pub fn load_transactions(&self) -> Result<Vec<Transaction>> {
        load_transactions_from(&*self.backend())
    }

    /// Atomically replaces the full transaction set.
    pub fn save_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        validate_transactions(transactions)?;
        save_transactions_to(&mut *self.backend(), transactions)
    }

    // ---- categories ----

    /// Returns stored categories, or the seeded default set when none exist.
    pub fn load_categories(&self) -> Result<Vec<Category>> {
        load_categories_from(&*self.backend())
    }

    /// Replaces the full category set. Rejects duplicate `(name, kind)` pairs.
    pub fn save_categories(&self, categories: &[Category]) -> Result<()> {
        validate_categories(categories)?;
        save_categories_to(&mut *self.backend(), categories)
    }

    /// Deletes one category. Refused while any transaction still references
    /// the category name. The reference check is case-sensitive and by name
    /// only; kind is not re-verified against existing transactions.
    pub fn delete_category(&self, name: &str, kind: TxKind) -> Result<()> {
        let mut backend = self.backend();
        let transactions = load_transactions_from(&*backend)?;
        if transactions.iter().any(|txn| txn.category == name) {
            return Err(LedgerError::Validation(format!(
                "category `{}` is referenced by existing transactions",
                name
            )));
        }
        let mut categories = load_categories_from(&*backend)?;
        let position = categories
            .iter()
            .position(|category| category.name == name && category.kind == kind)
            .ok_or_else(|| {
                LedgerError::Validation(format!("category `{}` not found", name))
            })?;
        categories.remove(position);
        save_categories_to(&mut *backend, &categories)
    }

    // ---- budget / currency ----

    /// Monthly budget ceiling. Zero or negative means unset.
    pub fn budget(&self) -> Result<f64> {
        budget_from(&*self.backend())
    }

    /// Overwrites the budget unconditionally. Stored at float precision.
    pub fn set_budget(&self, amount: f64) -> Result<()> {
        set_budget_on(&mut *self.backend(), amount)
    }

    /// Ledger-wide currency code. Empty until first set.
    pub fn currency(&self) -> Result<String> {
        currency_from(&*self.backend())
    }

    pub fn set_currency(&self, code: &str) -> Result<()> {
        self.backend().put(keys::CURRENCY, json!(code))
    }

    /// Rebases every stored amount and the budget into `to`, then records the
    /// new code. The code is written last so a crash mid-sequence leaves
    /// amounts consistent with the old currency rather than a mismatched
    /// state. Holds the writer lock for the whole operation.
    pub fn change_currency(&self, to: &str) -> Result<()> {
        let mut backend = self.backend();
        let from = match backend.get(keys::CURRENCY)? {
            Some(Value::String(code)) => code,
            _ => String::new(),
        };
        if from == to {
            debug!(currency = to, "currency unchanged; skipping rebase");
            return Ok(());
        }
        let factor = currency::conversion_factor(&from, to);
        let transactions = load_transactions_from(&*backend)?;
        // A corrupt stored budget aborts the rebase before anything is written.
        let budget = budget_from(&*backend)?;
        let rebased = currency::rebase(&transactions, factor);
        save_transactions_to(&mut *backend, &rebased)?;
        set_budget_on(&mut *backend, currency::rebase_budget(budget, factor))?;
        backend.put(keys::CURRENCY, json!(to))?;
        debug!(from = %from, to = %to, factor, "currency rebased");
        Ok(())
    }

    // ---- flags ----

    pub fn is_onboarding_completed(&self) -> Result<bool> {
        self.flag(keys::ONBOARDING_COMPLETED)
    }

    pub fn set_onboarding_completed(&self, completed: bool) -> Result<()> {
        self.backend().put(keys::ONBOARDING_COMPLETED, json!(completed))
    }

    pub fn use_internal_storage_for_backup(&self) -> Result<bool> {
        self.flag(keys::USE_INTERNAL_STORAGE)
    }

    pub fn set_use_internal_storage_for_backup(&self, use_internal: bool) -> Result<()> {
        self.backend().put(keys::USE_INTERNAL_STORAGE, json!(use_internal))
    }

    fn flag(&self, key: &str) -> Result<bool> {
        Ok(self
            .backend()
            .get(key)?
            .and_then(|value| value.as_bool())
            .unwrap_or(false))
    }

    // ---- snapshot / restore ----

    /// Reads transactions, categories, budget, and currency under one lock.
    /// A concurrent currency change can never interleave mid-read, so the
    /// snapshot's amounts always match its currency code.
    pub fn snapshot(&self) -> Result<LedgerSnapshot> {
        let backend = self.backend();
        Ok(LedgerSnapshot {
            transactions: load_transactions_from(&*backend)?,
            categories: load_categories_from(&*backend)?,
            budget: budget_from(&*backend)?,
            currency: currency_from(&*backend)?,
        })
    }

    /// Writes a restored snapshot in one operation. Used by the backup codec
    /// after every field has been computed; never applied partially.
    pub fn apply_restore(
        &self,
        transactions: &[Transaction],
        categories: &[Category],
        budget: f64,
        currency_code: &str,
    ) -> Result<()> {
        validate_categories(categories)?;
        let mut backend = self.backend();
        save_transactions_to(&mut *backend, transactions)?;
        save_categories_to(&mut *backend, categories)?;
        set_budget_on(&mut *backend, budget)?;
        backend.put(keys::CURRENCY, json!(currency_code))?;
        Ok(())
    }

    // ---- untyped access for narrow collaborators ----

    /// Raw value lookup for collaborators that persist small settings
    /// (reminder time, passcode hash) through the same store.
    pub fn get_raw(&self, key: &str) -> Result<Option<Value>> {
        self.backend().get(key)
    }

    pub fn put_raw(&self, key: &str, value: Value) -> Result<()> {
        self.backend().put(key, value)
    }

    // ---- hygiene ----

    fn purge_test_data(&self) -> Result<()> {
        let mut backend = self.backend();
        let transactions = load_transactions_from(&*backend)?;
        let kept: Vec<Transaction> = transactions
            .iter()
            .filter(|txn| txn.title != TEST_DATA_TITLE)
            .cloned()
            .collect();
        if kept.len() < transactions.len() {
            debug!(
                removed = transactions.len() - kept.len(),
                "purged reserved test transactions"
            );
            save_transactions_to(&mut *backend, &kept)?;
        }
        Ok(())
    }
}

// Lock-free inner helpers so compound operations can reuse them while
// already holding the writer mutex.

fn load_transactions_from<B: KeyValueBackend>(backend: &B) -> Result<Vec<Transaction>> {
    decode_list(backend.get(keys::TRANSACTIONS)?, "transaction list")
        .map(|list| list.unwrap_or_default())
}

fn save_transactions_to<B: KeyValueBackend>(
    backend: &mut B,
    transactions: &[Transaction],
) -> Result<()> {
    let json = serde_json::to_string(transactions)?;
    backend.put(keys::TRANSACTIONS, json!(json))
}

fn load_categories_from<B: KeyValueBackend>(backend: &B) -> Result<Vec<Category>> {
    let stored: Option<Vec<Category>> =
        decode_list(backend.get(keys::CATEGORIES)?, "category list")?;
    Ok(match stored {
        Some(categories) if !categories.is_empty() => categories,
        _ => default_categories(),
    })
}

fn save_categories_to<B: KeyValueBackend>(backend: &mut B, categories: &[Category]) -> Result<()> {
    let json = serde_json::to_string(categories)?;
    backend.put(keys::CATEGORIES, json!(json))
}

fn budget_from<B: KeyValueBackend>(backend: &B) -> Result<f64> {
    match backend.get(keys::BUDGET)? {
        Some(value) => value
            .as_f64()
            .ok_or_else(|| LedgerError::CorruptState("budget value is not a number".into())),
        None => Ok(0.0),
    }
}

fn currency_from<B: KeyValueBackend>(backend: &B) -> Result<String> {
    match backend.get(keys::CURRENCY)? {
        Some(Value::String(code)) => Ok(code),
        Some(_) => Err(LedgerError::CorruptState(
            "currency value is not a string".into(),
        )),
        None => Ok(String::new()),
    }
}

fn set_budget_on<B: KeyValueBackend>(backend: &mut B, amount: f64) -> Result<()> {
    // Budgets persist at 32-bit float precision, matching the historical
    // on-disk format.
    backend.put(keys::BUDGET, json!(amount as f32 as f64))
}

fn decode_list<T: serde::de::DeserializeOwned>(
    value: Option<Value>,
    what: &str,
) -> Result<Option<Vec<T>>> {
    match value {
        None => Ok(None),
        Some(Value::String(raw)) if raw.is_empty() => Ok(None),
        Some(Value::String(raw)) => serde_json::from_str(&raw).map(Some).map_err(|err| {
            LedgerError::CorruptState(format!("{} failed to decode: {}", what, err))
        }),
        Some(_) => Err(LedgerError::CorruptState(format!(
            "{} is not stored as a serialized string",
            what
        ))),
    }
}

fn validate_transactions(transactions: &[Transaction]) -> Result<()> {
    for txn in transactions {
        if txn.title.trim().is_empty() {
            return Err(LedgerError::Validation(
                "transaction title must not be empty".into(),
            ));
        }
        if txn.amount <= 0.0 || !txn.amount.is_finite() {
            return Err(LedgerError::Validation(format!(
                "transaction `{}` amount must be a positive number",
                txn.title
            )));
        }
    }
    Ok(())
}

fn validate_categories(categories: &[Category]) -> Result<()> {
    for (index, category) in categories.iter().enumerate() {
        if category.name.trim().is_empty() {
            return Err(LedgerError::Validation(
                "category name must not be empty".into(),
            ));
        }
        let duplicate = categories[..index]
            .iter()
            .any(|other| other.name == category.name && other.kind == category.kind);
        if duplicate {
            return Err(LedgerError::Validation(format!(
                "duplicate category `{}`",
                category.name
            )));
        }
    }
    Ok(())
}
