/// Pluggable persistence for encrypted vault records.
///
/// `KeyValueStorage` is the storage medium: origin-scoped key-value with
/// synchronous get/set/remove/enumerate semantics. `VaultStore` layers the
/// record format and per-wallet namespacing on top. All data passing through
/// here is already encrypted — the store never sees plaintext key material.
pub mod file;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::authenticator::CredentialInfo;
use crate::crypto::EncryptedVault;
use crate::error::Result;
use crate::vault::state::AuthMethod;

pub const DEFAULT_STORAGE_KEY: &str = "tonpay_signless_vault";

/// Synchronous key-value storage medium.
///
/// Implementations use interior mutability; the store is the sole
/// reader/writer of keys under its namespace prefix.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

/// Storage envelope for one wallet's vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRecord {
    pub vault: EncryptedVault,
    pub auth_method: AuthMethod,
    pub wallet_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webauthn_credential: Option<CredentialInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persists one vault record per wallet address under
/// `<namespace>_<walletAddress>`.
///
/// Persistence is best-effort: write failures are logged and swallowed, and
/// unreadable or unparseable records load as absent. Losing a record costs
/// the user a re-setup, never a broken session.
pub struct VaultStore {
    storage: Box<dyn KeyValueStorage>,
    namespace: String,
}

impl VaultStore {
    pub fn new(storage: Box<dyn KeyValueStorage>, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
        }
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.namespace = namespace.into();
    }

    fn key_for(&self, wallet_address: &str) -> String {
        format!("{}_{}", self.namespace, wallet_address)
    }

    /// Write a record, overwriting any existing one for the wallet. The
    /// original `created_at` survives an overwrite.
    pub fn save(
        &self,
        wallet_address: &str,
        vault: EncryptedVault,
        auth_method: AuthMethod,
        credential: Option<CredentialInfo>,
    ) {
        let now = Utc::now();
        let created_at = self
            .load(wallet_address)
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        let record = VaultRecord {
            vault,
            auth_method,
            wallet_address: wallet_address.to_string(),
            webauthn_credential: credential,
            created_at,
            updated_at: now,
        };

        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize vault record");
                return;
            }
        };

        if let Err(e) = self.storage.set(&self.key_for(wallet_address), &json) {
            warn!(error = %e, "failed to persist vault record");
        }
    }

    /// Returns `None` when absent and when the stored content no longer
    /// parses — a corrupt record behaves as "no vault".
    pub fn load(&self, wallet_address: &str) -> Option<VaultRecord> {
        let data = self
            .storage
            .get(&self.key_for(wallet_address))
            .ok()
            .flatten()?;
        serde_json::from_str(&data).ok()
    }

    /// Idempotent removal.
    pub fn delete(&self, wallet_address: &str) {
        if let Err(e) = self.storage.remove(&self.key_for(wallet_address)) {
            warn!(error = %e, "failed to delete vault record");
        }
    }

    pub fn has_vault(&self, wallet_address: &str) -> bool {
        self.load(wallet_address).is_some()
    }

    /// Refresh a record's `updated_at` without touching its contents.
    pub fn touch(&self, wallet_address: &str) {
        let Some(mut record) = self.load(wallet_address) else {
            return;
        };
        record.updated_at = Utc::now();

        match serde_json::to_string(&record) {
            Ok(json) => {
                if let Err(e) = self.storage.set(&self.key_for(wallet_address), &json) {
                    warn!(error = %e, "failed to persist vault record");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize vault record"),
        }
    }

    /// Wallet addresses with a stored record under this namespace.
    pub fn list_wallets(&self) -> Vec<String> {
        let prefix = format!("{}_", self.namespace);
        self.storage
            .keys()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }
}
