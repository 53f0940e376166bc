/// Platform-authenticator bridge.
///
/// Abstracts the host's biometric/security-key ceremony (WebAuthn-style)
/// behind a trait so the vault manager can derive its envelope secret from a
/// live assertion instead of anything stored at rest. A genuine, fresh user
/// verification is the only path to the decrypted signing key when the
/// biometric factor is chosen.
pub mod software;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{Result, SignlessError};

pub const RP_NAME: &str = "TON Pay";
pub const RP_ID_FALLBACK: &str = "tonpay.io";

/// Maximum time a registration or assertion ceremony may take before the
/// orchestrator rejects it.
pub const CEREMONY_TIMEOUT: Duration = Duration::from_secs(60);

/// Fixed ceremony challenge.
///
/// The assertion is consumed locally as KDF input and must be byte-stable
/// across ceremonies for the derived secret to re-open the vault; it is
/// never presented to a remote verifier, so a per-ceremony freshness nonce
/// would only break re-derivation.
pub const CHALLENGE: [u8; 16] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
    0x10,
];

/// Number of assertion-signature bytes reduced into the vault secret.
pub const ASSERTION_SECRET_LEN: usize = 32;

/// Identifies a registered platform credential. Stored alongside the vault
/// record when the biometric factor is used; required to request later
/// assertions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialInfo {
    /// Credential id, base64url without padding.
    pub credential_id: String,
    /// Credential public key, base64url without padding.
    pub public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String>>,
}

/// A platform biometric/security-key authenticator.
///
/// Implementations must require user verification (not mere presence) and
/// must produce byte-stable assertion signatures for the same credential,
/// since the signature is the input to the vault's key derivation.
#[async_trait]
pub trait PlatformAuthenticator: Send + Sync {
    /// Capability probe. No side effects, safe to call eagerly.
    fn is_supported(&self) -> bool;

    /// Whether a user-verifying authenticator is actually present.
    /// Failures collapse to `false` rather than propagating.
    async fn is_available(&self) -> bool;

    /// Create a new credential scoped to the current origin.
    async fn register(&self, user_identifier: &str) -> Result<CredentialInfo>;

    /// Request a fresh assertion against a stored credential.
    /// Returns the raw assertion signature bytes.
    async fn assert(&self, credential: &CredentialInfo) -> Result<Vec<u8>>;
}

// Delegation so a bridge can be shared between the vault manager and a UI
// layer that probes availability.
#[async_trait]
impl<T: PlatformAuthenticator + ?Sized> PlatformAuthenticator for std::sync::Arc<T> {
    fn is_supported(&self) -> bool {
        (**self).is_supported()
    }

    async fn is_available(&self) -> bool {
        (**self).is_available().await
    }

    async fn register(&self, user_identifier: &str) -> Result<CredentialInfo> {
        (**self).register(user_identifier).await
    }

    async fn assert(&self, credential: &CredentialInfo) -> Result<Vec<u8>> {
        (**self).assert(credential).await
    }
}

/// Reduce an assertion signature into the fixed-length secret string that
/// plays the PIN's role for envelope encryption.
///
/// The secret is never stored; it is re-derived via a fresh assertion on
/// every unlock.
pub fn secret_from_assertion(signature: &[u8]) -> Result<Zeroizing<String>> {
    if signature.len() < ASSERTION_SECRET_LEN {
        return Err(SignlessError::AuthenticationFailed(format!(
            "assertion signature too short: {} bytes",
            signature.len()
        )));
    }
    Ok(Zeroizing::new(hex::encode(
        &signature[..ASSERTION_SECRET_LEN],
    )))
}
