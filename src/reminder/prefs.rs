//! Persisted reminder time. Lives in the same key/value store as the rest of
//! the ledger so a boot-time collaborator can re-schedule after a restart.

use serde_json::json;

use crate::{
    core::errors::{LedgerError, Result},
    store::{keys, KeyValueBackend, LedgerStore},
};

pub const DEFAULT_HOUR: u32 = 20;
pub const DEFAULT_MINUTE: u32 = 0;

/// Returns the configured `(hour, minute)` in 24-hour form, defaulting to
/// 20:00.
pub fn reminder_time<B: KeyValueBackend>(store: &LedgerStore<B>) -> Result<(u32, u32)> {
    let hour = read_component(store, keys::REMINDER_HOUR, DEFAULT_HOUR)?;
    let minute = read_component(store, keys::REMINDER_MINUTE, DEFAULT_MINUTE)?;
    Ok((hour, minute))
}

pub fn set_reminder_time<B: KeyValueBackend>(
    store: &LedgerStore<B>,
    hour: u32,
    minute: u32,
) -> Result<()> {
    validate_time(hour, minute)?;
    store.put_raw(keys::REMINDER_HOUR, json!(hour))?;
    store.put_raw(keys::REMINDER_MINUTE, json!(minute))?;
    Ok(())
}

/// Renders the configured time in 12-hour am/pm form, e.g. `8:00 PM`.
pub fn formatted_reminder_time<B: KeyValueBackend>(store: &LedgerStore<B>) -> Result<String> {
    let (hour, minute) = reminder_time(store)?;
    let hour_12 = match hour {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    let am_pm = if hour >= 12 { "PM" } else { "AM" };
    Ok(format!("{}:{:02} {}", hour_12, minute, am_pm))
}

pub(crate) fn validate_time(hour: u32, minute: u32) -> Result<()> {
    if hour > 23 || minute > 59 {
        return Err(LedgerError::Validation(format!(
            "invalid reminder time {:02}:{:02}",
            hour, minute
        )));
    }
    Ok(())
}

fn read_component<B: KeyValueBackend>(
    store: &LedgerStore<B>,
    key: &str,
    default: u32,
) -> Result<u32> {
    Ok(store
        .get_raw(key)?
        .and_then(|value| value.as_u64())
        .map(|value| value as u32)
        .unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    fn store() -> LedgerStore<MemoryBackend> {
        LedgerStore::open(MemoryBackend::new()).unwrap()
    }

    #[test]
    fn defaults_to_eight_pm() {
        let store = store();
        assert_eq!(reminder_time(&store).unwrap(), (20, 0));
        assert_eq!(formatted_reminder_time(&store).unwrap(), "8:00 PM");
    }

    #[test]
    fn round_trips_custom_time() {
        let store = store();
        set_reminder_time(&store, 7, 5).unwrap();
        assert_eq!(reminder_time(&store).unwrap(), (7, 5));
        assert_eq!(formatted_reminder_time(&store).unwrap(), "7:05 AM");
    }

    #[test]
    fn midnight_formats_as_twelve_am() {
        let store = store();
        set_reminder_time(&store, 0, 30).unwrap();
        assert_eq!(formatted_reminder_time(&store).unwrap(), "12:30 AM");
    }

    #[test]
    fn rejects_out_of_range_time() {
        let store = store();
        assert!(set_reminder_time(&store, 24, 0).is_err());
        assert!(set_reminder_time(&store, 8, 60).is_err());
    }
}
