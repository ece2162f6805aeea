//! Store configuration.
//!
//! Defaults suit a local mock server. `from_env` reads overrides the same way
//! the mock server binary reads `PORT`.

use std::time::Duration;

use tracing::warn;

use crate::notification::NOTIFICATION_TTL;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

/// Environment variable holding the API origin, e.g. `http://localhost:3000`.
pub const BASE_URL_VAR: &str = "TODO_API_URL";

/// Environment variable holding the notification lifetime in milliseconds.
pub const NOTIFICATION_TTL_VAR: &str = "TODO_NOTIFICATION_TTL_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Origin the `/api/todos` routes hang off.
    pub base_url: String,
    /// How long a notification stays visible.
    pub notification_ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            notification_ttl: NOTIFICATION_TTL,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source. Unparseable values
    /// are logged and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base_url) = lookup(BASE_URL_VAR).filter(|url| !url.trim().is_empty()) {
            config.base_url = base_url.trim().to_string();
        }
        if let Some(raw) = lookup(NOTIFICATION_TTL_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(millis) => config.notification_ttl = Duration::from_millis(millis),
                Err(err) => warn!(value = %raw, error = %err, "ignoring invalid {NOTIFICATION_TTL_VAR}"),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = StoreConfig::from_lookup(lookup(&[]));
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.notification_ttl, Duration::from_millis(3000));
    }

    #[test]
    fn reads_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "http://todo.internal:8080"),
            (NOTIFICATION_TTL_VAR, "500"),
        ]));
        assert_eq!(config.base_url, "http://todo.internal:8080");
        assert_eq!(config.notification_ttl, Duration::from_millis(500));
    }

    #[test]
    fn invalid_ttl_falls_back_to_default() {
        let config = StoreConfig::from_lookup(lookup(&[(NOTIFICATION_TTL_VAR, "soon")]));
        assert_eq!(config.notification_ttl, NOTIFICATION_TTL);
    }
}
