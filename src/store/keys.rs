//! Persisted-state key names. Stable; renaming any of these orphans data.

pub const TRANSACTIONS: &str = "transactions";
pub const CATEGORIES: &str = "categories";
pub const BUDGET: &str = "budget";
pub const CURRENCY: &str = "currency";
pub const ONBOARDING_COMPLETED: &str = "onboarding_completed";
pub const USE_INTERNAL_STORAGE: &str = "use_internal_storage";
pub const REMINDER_HOUR: &str = "reminder_hour";
pub const REMINDER_MINUTE: &str = "reminder_minute";
pub const PASSCODE_HASH: &str = "passcode_hash";
pub const PASSCODE_ENABLED: &str = "passcode_enabled";
