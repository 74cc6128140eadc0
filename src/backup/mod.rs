//! Snapshot export/import for backup, restore, and currency-safe migration.
//!
//! The document is one self-describing JSON object. Import is all-or-nothing:
//! either every field decodes and the whole snapshot is written to the store
//! together, or the restore is rejected and the store is untouched. The one
//! tolerated gap is a missing/undecodable `categories` field, which falls
//! back to the store's current categories.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    core::{
        errors::{LedgerError, Result},
        time::Clock,
        utils::ensure_dir,
    },
    model::{Category, Transaction},
    store::{KeyValueBackend, LedgerStore},
};

const BACKUP_FILE_PREFIX: &str = "FinanceTracker_backup_";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Wire form of a full ledger snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSnapshot {
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub budget: f64,
    pub currency: String,
    #[serde(rename = "backupDate")]
    pub backup_date: i64,
}

/// Everything a completed restore wrote, for caller-facing summaries.
#[derive(Debug, Clone)]
pub struct RestoreSummary {
    pub transactions: usize,
    pub categories: usize,
    pub budget: f64,
    pub currency: String,
}

/// Serializes the store's full state into one document. The state is read
/// as a single snapshot, so a concurrent currency change can never produce a
/// document whose amounts and currency code disagree.
pub fn export<B: KeyValueBackend>(store: &LedgerStore<B>, clock: &dyn Clock) -> Result<String> {
    let state = store.snapshot()?;
    let snapshot = BackupSnapshot {
        transactions: state.transactions,
        categories: state.categories,
        budget: state.budget,
        currency: state.currency,
        backup_date: clock.now_millis(),
    };
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

/// Parses a backup document and writes it to the store in one operation.
pub fn import<B: KeyValueBackend>(
    store: &LedgerStore<B>,
    document: &str,
) -> Result<RestoreSummary> {
    let root: Value = serde_json::from_str(document)
        .map_err(|err| LedgerError::RestoreRejected(format!("not a JSON document: {}", err)))?;
    let fields = root.as_object().ok_or_else(|| {
        LedgerError::RestoreRejected("backup document is not a JSON object".into())
    })?;

    let transactions: Vec<Transaction> = fields
        .get("transactions")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|err| {
            LedgerError::RestoreRejected(format!("transactions failed to decode: {}", err))
        })?
        .ok_or_else(|| {
            LedgerError::RestoreRejected("backup document has no transactions field".into())
        })?;

    // Missing or malformed categories fall back to what the store already
    // has; a partial document should not sink the whole restore.
    let categories: Vec<Category> = match fields.get("categories").cloned() {
        Some(value) => match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(error = %err, "backup categories unreadable; keeping current set");
                store.load_categories()?
            }
        },
        None => store.load_categories()?,
    };

    let budget = fields
        .get("budget")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let currency = fields
        .get("currency")
        .and_then(Value::as_str)
        .unwrap_or("USD")
        .to_string();

    store.apply_restore(&transactions, &categories, budget, &currency)?;
    debug!(
        transactions = transactions.len(),
        categories = categories.len(),
        "restore applied"
    );
    Ok(RestoreSummary {
        transactions: transactions.len(),
        categories: categories.len(),
        budget,
        currency,
    })
}

/// Exports the store into a timestamped file under `dir`, returning the path.
/// File naming follows the historical `FinanceTracker_backup_*.json` scheme
/// so older backups stay discoverable.
pub fn write_backup_file<B: KeyValueBackend>(
    store: &LedgerStore<B>,
    dir: &Path,
    clock: &dyn Clock,
) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let document = export(store, clock)?;
    let timestamp = clock.now().format(BACKUP_TIMESTAMP_FORMAT);
    let path = dir.join(format!("{}{}.json", BACKUP_FILE_PREFIX, timestamp));
    fs::write(&path, document)?;
    debug!(path = %path.display(), "backup file written");
    Ok(path)
}

/// Restores the store from a backup file on disk.
pub fn restore_from_file<B: KeyValueBackend>(
    store: &LedgerStore<B>,
    path: &Path,
) -> Result<RestoreSummary> {
    if !path.exists() {
        return Err(LedgerError::RestoreRejected(format!(
            "backup file `{}` not found",
            path.display()
        )));
    }
    let document = fs::read_to_string(path)?;
    import(store, &document)
}

/// Newest backup file across the candidate directories, if any.
pub fn latest_backup_file(dirs: &[PathBuf]) -> Option<(PathBuf, DateTime<Utc>)> {
    let mut newest: Option<(PathBuf, DateTime<Utc>)> = None;
    for dir in dirs {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(stamp) = parse_backup_timestamp(&path) else {
                continue;
            };
            if newest.as_ref().map(|(_, t)| stamp > *t).unwrap_or(true) {
                newest = Some((path, stamp));
            }
        }
    }
    newest
}

fn parse_backup_timestamp(path: &Path) -> Option<DateTime<Utc>> {
    let name = path.file_name()?.to_str()?;
    let stem = name
        .strip_prefix(BACKUP_FILE_PREFIX)?
        .strip_suffix(".json")?;
    chrono::NaiveDateTime::parse_from_str(stem, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
