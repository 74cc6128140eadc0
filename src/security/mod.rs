//! Passcode hash contract for the passcode-entry collaborator. Only the
//! SHA-256 digest is ever stored; plaintext never touches the backend.

use serde_json::json;
use sha2::{Digest, Sha256};

use crate::{
    core::errors::Result,
    store::{keys, KeyValueBackend, LedgerStore},
};

/// Stores the digest of a new passcode, replacing any previous one.
pub fn save_passcode<B: KeyValueBackend>(store: &LedgerStore<B>, passcode: &str) -> Result<()> {
    store.put_raw(keys::PASSCODE_HASH, json!(hash_passcode(passcode)))
}

/// True when the entered passcode matches the stored digest. An empty or
/// absent stored hash always fails verification.
pub fn verify_passcode<B: KeyValueBackend>(store: &LedgerStore<B>, passcode: &str) -> Result<bool> {
    let stored = store
        .get_raw(keys::PASSCODE_HASH)?
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default();
    if stored.is_empty() {
        return Ok(false);
    }
    Ok(hash_passcode(passcode) == stored)
}

pub fn is_passcode_enabled<B: KeyValueBackend>(store: &LedgerStore<B>) -> Result<bool> {
    Ok(store
        .get_raw(keys::PASSCODE_ENABLED)?
        .and_then(|value| value.as_bool())
        .unwrap_or(false))
}

pub fn set_passcode_enabled<B: KeyValueBackend>(
    store: &LedgerStore<B>,
    enabled: bool,
) -> Result<()> {
    store.put_raw(keys::PASSCODE_ENABLED, json!(enabled))
}

fn hash_passcode(passcode: &str) -> String {
    let digest = Sha256::digest(passcode.as_bytes());
    hex::encode(digest)
}
