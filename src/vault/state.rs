/// Observable vault state.
///
/// `VaultState` is a plain snapshot rebuilt whenever the active wallet
/// changes. The decrypted private key is never part of it; that lives only
/// inside the manager.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultStatus {
    Disabled,
    NotSetup,
    Locked,
    Unlocked,
    SettingUp,
}

/// Unlock factor protecting the vault at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    Pin,
    Biometric,
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultState {
    pub status: VaultStatus,
    pub is_enabled: bool,
    pub is_setup: bool,
    pub is_unlocked: bool,
    pub auth_method: AuthMethod,
    /// Vault public key, base64.
    pub public_key: Option<String>,
    pub wallet_address: Option<String>,
}

impl Default for VaultState {
    fn default() -> Self {
        Self {
            status: VaultStatus::Disabled,
            is_enabled: false,
            is_setup: false,
            is_unlocked: false,
            auth_method: AuthMethod::None,
            public_key: None,
            wallet_address: None,
        }
    }
}

/// Whether the UI must run an unlock flow before a signless payment can be
/// signed. Recomputed on demand, never stored.
pub fn requires_unlock(enabled: bool, is_setup: bool, is_unlocked: bool) -> bool {
    enabled && is_setup && !is_unlocked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_unlock_truth_table() {
        assert!(requires_unlock(true, true, false));
        assert!(!requires_unlock(true, true, true));
        assert!(!requires_unlock(true, false, false));
        assert!(!requires_unlock(false, true, false));
    }

    #[test]
    fn test_auth_method_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AuthMethod::Pin).unwrap(), "\"pin\"");
        assert_eq!(
            serde_json::to_string(&AuthMethod::Biometric).unwrap(),
            "\"biometric\""
        );
        assert_eq!(
            serde_json::from_str::<AuthMethod>("\"none\"").unwrap(),
            AuthMethod::None
        );
    }
}
