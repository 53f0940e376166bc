/// Vault configuration.
use std::time::Duration;

use crate::storage::DEFAULT_STORAGE_KEY;
use crate::vault::state::AuthMethod;

pub const DEFAULT_AUTO_LOCK_TIMEOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Whether the signless feature is turned on at all.
    pub enabled: bool,
    /// Default unlock factor offered by the UI.
    pub auth_method: AuthMethod,
    /// Inactivity window before the in-memory key is dropped. `None` or a
    /// zero duration disables auto-lock (manual lock only).
    pub auto_lock_timeout: Option<Duration>,
    /// Storage namespace; records live under `<storage_key>_<wallet>`.
    pub storage_key: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            auth_method: AuthMethod::None,
            auto_lock_timeout: Some(DEFAULT_AUTO_LOCK_TIMEOUT),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

/// Partial configuration merge; unset fields keep their current values.
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub enabled: Option<bool>,
    pub auth_method: Option<AuthMethod>,
    pub auto_lock_timeout: Option<Option<Duration>>,
    pub storage_key: Option<String>,
}

impl VaultConfig {
    pub fn apply(&mut self, update: ConfigUpdate) {
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        if let Some(auth_method) = update.auth_method {
            self.auth_method = auth_method;
        }
        if let Some(auto_lock_timeout) = update.auto_lock_timeout {
            self.auto_lock_timeout = auto_lock_timeout;
        }
        if let Some(storage_key) = update.storage_key {
            self.storage_key = storage_key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_merges_partial_update() {
        let mut config = VaultConfig::default();
        config.apply(ConfigUpdate {
            enabled: Some(true),
            auto_lock_timeout: Some(None),
            ..Default::default()
        });

        assert!(config.enabled);
        assert!(config.auto_lock_timeout.is_none());
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.auth_method, AuthMethod::None);
    }

    #[test]
    fn test_empty_update_is_noop() {
        let mut config = VaultConfig::default();
        let before = config.clone();
        config.apply(ConfigUpdate::default());

        assert_eq!(config.enabled, before.enabled);
        assert_eq!(config.auto_lock_timeout, before.auto_lock_timeout);
        assert_eq!(config.storage_key, before.storage_key);
    }
}
