/// Vault state machine.
///
/// `VaultManager` owns the in-memory decrypted private key and the auto-lock
/// deadline, coordinates setup/unlock/lock/reset against the envelope crypto
/// and the platform-authenticator bridge, and produces signed payment
/// payloads on demand. It is a plain stateful object: the UI layer observes
/// `state()` and invokes operations, nothing more.
///
/// Auto-lock is a recorded deadline enforced at every operation and
/// observation boundary, the cooperative single-threaded equivalent of a
/// timer callback. Operations take `&mut self`, so overlapping calls on one
/// manager cannot compile; callers sharing a handle serialize through their
/// own lock.
pub mod config;
pub mod payload;
pub mod state;

use tokio::time::{timeout, Instant};
use tracing::debug;
use zeroize::Zeroizing;

use crate::authenticator::{self, CredentialInfo, PlatformAuthenticator, CEREMONY_TIMEOUT};
use crate::crypto::{aead, keys, SensitiveBytes32, SigningKeyPair};
use crate::error::{Result, SignlessError};
use crate::storage::{KeyValueStorage, VaultStore};

pub use config::{ConfigUpdate, VaultConfig};
pub use payload::{PaymentRequest, SignedPayload};
pub use state::{AuthMethod, VaultState, VaultStatus};

use payload::PaymentPayload;

#[derive(Debug, Clone)]
pub struct SetupParams {
    pub auth_method: AuthMethod,
    pub pin: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UnlockParams {
    pub pin: Option<String>,
}

pub struct VaultManager {
    config: VaultConfig,
    store: VaultStore,
    authenticator: Box<dyn PlatformAuthenticator>,
    state: VaultState,
    /// The decrypted signing key. Exists only while unlocked; zeroized on
    /// lock, reset, auto-lock, wallet switch, and drop.
    private_key: Option<SensitiveBytes32>,
    credential: Option<CredentialInfo>,
    lock_deadline: Option<Instant>,
}

impl VaultManager {
    pub fn new(
        config: VaultConfig,
        storage: Box<dyn KeyValueStorage>,
        authenticator: Box<dyn PlatformAuthenticator>,
    ) -> Self {
        let store = VaultStore::new(storage, config.storage_key.clone());
        Self {
            config,
            store,
            authenticator,
            state: VaultState::default(),
            private_key: None,
            credential: None,
            lock_deadline: None,
        }
    }

    /// Current observable state. Applies the auto-lock deadline first, so an
    /// expired vault reports `locked` and its key is already zeroized by the
    /// time the caller sees the snapshot.
    pub fn state(&mut self) -> VaultState {
        self.enforce_auto_lock();
        self.state.clone()
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Whether the UI must run an unlock flow before signing.
    pub fn requires_unlock(&mut self) -> bool {
        self.enforce_auto_lock();
        state::requires_unlock(
            self.config.enabled,
            self.state.is_setup,
            self.state.is_unlocked,
        )
    }

    /// Probe for a user-verifying platform authenticator. Failures collapse
    /// to `false`.
    pub async fn is_biometric_available(&self) -> bool {
        self.authenticator.is_supported() && self.authenticator.is_available().await
    }

    /// Wallet addresses with a stored vault under the current namespace.
    pub fn list_wallets(&self) -> Vec<String> {
        self.store.list_wallets()
    }

    /// Context switch to a different (or no) wallet address. The previous
    /// wallet's in-memory key is zeroized before the new context loads.
    pub fn set_wallet_address(&mut self, wallet_address: Option<&str>) {
        if self.state.wallet_address.as_deref() == wallet_address {
            return;
        }
        self.state.wallet_address = wallet_address.map(str::to_string);
        self.reload();
    }

    /// Rebuild state for the current wallet from configuration and storage,
    /// zeroizing any in-memory key. Call after toggling `enabled` via
    /// `update_config`.
    pub fn reload(&mut self) {
        let wallet = self.state.wallet_address.clone();
        self.private_key = None;
        self.lock_deadline = None;
        self.credential = None;
        self.state = self.load_state_for(wallet.as_deref());
    }

    fn load_state_for(&mut self, wallet_address: Option<&str>) -> VaultState {
        let Some(wallet) = wallet_address else {
            return VaultState::default();
        };

        if !self.config.enabled {
            return VaultState {
                wallet_address: Some(wallet.to_string()),
                ..VaultState::default()
            };
        }

        match self.store.load(wallet) {
            None => VaultState {
                status: VaultStatus::NotSetup,
                is_enabled: true,
                wallet_address: Some(wallet.to_string()),
                ..VaultState::default()
            },
            Some(record) => {
                self.credential = record.webauthn_credential.clone();
                VaultState {
                    status: VaultStatus::Locked,
                    is_enabled: true,
                    is_setup: true,
                    is_unlocked: false,
                    auth_method: record.auth_method,
                    public_key: Some(record.vault.public_key.clone()),
                    wallet_address: Some(wallet.to_string()),
                }
            }
        }
    }

    /// Create a fresh vault for the connected wallet and leave it unlocked.
    ///
    /// On failure the state reverts to `locked` when a previous vault
    /// exists, else `not_setup`, and any partially-held key is zeroized.
    pub async fn setup(&mut self, params: SetupParams) -> Result<()> {
        self.enforce_auto_lock();
        let wallet = self
            .state
            .wallet_address
            .clone()
            .ok_or(SignlessError::NotConnected)?;

        let was_setup = self.state.is_setup;
        self.state.status = VaultStatus::SettingUp;
        debug!(wallet = %wallet, method = ?params.auth_method, "setting up signless vault");

        match self.do_setup(&wallet, &params).await {
            Ok(public_key) => {
                self.state = VaultState {
                    status: VaultStatus::Unlocked,
                    is_enabled: true,
                    is_setup: true,
                    is_unlocked: true,
                    auth_method: params.auth_method,
                    public_key: Some(public_key),
                    wallet_address: Some(wallet),
                };
                self.arm_lock_deadline();
                Ok(())
            }
            Err(e) => {
                self.private_key = None;
                self.state.status = if was_setup {
                    VaultStatus::Locked
                } else {
                    VaultStatus::NotSetup
                };
                self.state.is_unlocked = false;
                Err(e)
            }
        }
    }

    async fn do_setup(&mut self, wallet: &str, params: &SetupParams) -> Result<String> {
        let keypair = SigningKeyPair::generate();

        match params.auth_method {
            AuthMethod::Biometric => {
                if !self.authenticator.is_supported() {
                    return Err(SignlessError::UnsupportedPlatform);
                }

                let credential = timeout(CEREMONY_TIMEOUT, self.authenticator.register(wallet))
                    .await
                    .map_err(|_| {
                        SignlessError::RegistrationFailed("ceremony timed out".into())
                    })??;
                let signature = timeout(CEREMONY_TIMEOUT, self.authenticator.assert(&credential))
                    .await
                    .map_err(|_| {
                        SignlessError::AuthenticationFailed("ceremony timed out".into())
                    })??;
                let secret = authenticator::secret_from_assertion(&signature)?;

                let vault = aead::encrypt(
                    keypair.private_key().as_bytes(),
                    &keypair.public_key,
                    secret.as_bytes(),
                )?;
                let public_key = vault.public_key.clone();

                self.store
                    .save(wallet, vault, AuthMethod::Biometric, Some(credential.clone()));
                self.credential = Some(credential);
                self.private_key = Some(keypair.private_key().clone());
                Ok(public_key)
            }
            AuthMethod::Pin => {
                let pin = params
                    .pin
                    .as_deref()
                    .filter(|pin| !pin.is_empty())
                    .ok_or(SignlessError::PinRequired)?;

                let vault = aead::encrypt(
                    keypair.private_key().as_bytes(),
                    &keypair.public_key,
                    pin.as_bytes(),
                )?;
                let public_key = vault.public_key.clone();

                self.store.save(wallet, vault, AuthMethod::Pin, None);
                self.credential = None;
                self.private_key = Some(keypair.private_key().clone());
                Ok(public_key)
            }
            AuthMethod::None => Err(SignlessError::InvalidAuthMethod),
        }
    }

    /// Re-derive the secret (fresh assertion or supplied PIN), decrypt the
    /// persisted vault, and hold the key in memory.
    ///
    /// Decryption failures surface as the generic `UnlockFailed`;
    /// authenticator failures keep their own variants so the UI can offer
    /// the PIN fallback.
    pub async fn unlock(&mut self, params: UnlockParams) -> Result<()> {
        self.enforce_auto_lock();
        let wallet = self
            .state
            .wallet_address
            .clone()
            .ok_or(SignlessError::NotConnected)?;
        let record = self.store.load(&wallet).ok_or(SignlessError::NoVaultFound)?;

        let secret: Zeroizing<String> = match record.auth_method {
            AuthMethod::Biometric => {
                let credential = record
                    .webauthn_credential
                    .clone()
                    .ok_or(SignlessError::CredentialMissing)?;
                let signature = timeout(CEREMONY_TIMEOUT, self.authenticator.assert(&credential))
                    .await
                    .map_err(|_| {
                        SignlessError::AuthenticationFailed("ceremony timed out".into())
                    })??;
                authenticator::secret_from_assertion(&signature)?
            }
            AuthMethod::Pin => {
                let pin = params
                    .pin
                    .as_deref()
                    .filter(|pin| !pin.is_empty())
                    .ok_or(SignlessError::PinRequired)?;
                Zeroizing::new(pin.to_string())
            }
            AuthMethod::None => return Err(SignlessError::InvalidAuthMethod),
        };

        let plaintext = aead::decrypt(&record.vault, secret.as_bytes())
            .map_err(|_| SignlessError::UnlockFailed)?;
        let private_key =
            SensitiveBytes32::from_slice(plaintext.as_bytes()).ok_or(SignlessError::UnlockFailed)?;

        self.private_key = Some(private_key);
        self.credential = record.webauthn_credential.clone();
        self.state.status = VaultStatus::Unlocked;
        self.state.is_setup = true;
        self.state.is_unlocked = true;
        self.state.auth_method = record.auth_method;
        self.state.public_key = Some(record.vault.public_key.clone());
        self.arm_lock_deadline();
        debug!(wallet = %wallet, "vault unlocked");
        Ok(())
    }

    /// Zeroize and drop the in-memory key. Idempotent.
    pub fn lock(&mut self) {
        self.lock_deadline = None;
        self.private_key = None;
        if self.state.is_setup {
            self.state.status = VaultStatus::Locked;
        }
        self.state.is_unlocked = false;
    }

    /// Lock, then delete the persisted record for the current wallet.
    /// A no-op when no wallet is connected.
    pub fn reset(&mut self) {
        let Some(wallet) = self.state.wallet_address.clone() else {
            return;
        };

        self.lock();
        self.credential = None;
        self.store.delete(&wallet);

        self.state = VaultState {
            status: if self.config.enabled {
                VaultStatus::NotSetup
            } else {
                VaultStatus::Disabled
            },
            is_enabled: self.config.enabled,
            wallet_address: Some(wallet),
            ..VaultState::default()
        };
    }

    /// Sign a payment payload with the in-memory key. Counts as activity:
    /// the auto-lock deadline is re-armed.
    pub fn sign_payload(&mut self, request: PaymentRequest) -> Result<SignedPayload> {
        self.enforce_auto_lock();

        let private_key = self.private_key.as_ref().ok_or(SignlessError::NotUnlocked)?;
        let public_key = self
            .state
            .public_key
            .clone()
            .ok_or(SignlessError::PublicKeyUnavailable)?;

        let payload = PaymentPayload::from_request(request);
        let bytes = payload.to_bytes()?;
        let signature = keys::sign(private_key.as_bytes(), &bytes)?;

        self.arm_lock_deadline();

        Ok(SignedPayload {
            payload: bytes,
            signature,
            public_key,
            reference: payload.reference,
            valid_until: payload.valid_until,
        })
    }

    /// Merge a partial configuration. Does not mutate vault state; callers
    /// that toggle `enabled` should follow with `reload()`. A new
    /// `storage_key` takes effect for subsequent store operations.
    pub fn update_config(&mut self, update: ConfigUpdate) {
        self.config.apply(update);
        self.store.set_namespace(self.config.storage_key.clone());
    }

    fn enforce_auto_lock(&mut self) {
        let Some(deadline) = self.lock_deadline else {
            return;
        };
        if Instant::now() >= deadline {
            debug!("auto-lock timeout elapsed, locking vault");
            self.lock();
        }
    }

    fn arm_lock_deadline(&mut self) {
        self.lock_deadline = match self.config.auto_lock_timeout {
            Some(window) if !window.is_zero() => Some(Instant::now() + window),
            _ => None,
        };
    }
}
