/// In-process software authenticator.
///
/// Stands in for a platform authenticator in tests, demos, and headless
/// environments. Each registered credential holds its own Ed25519 key;
/// assertions sign the fixed challenge, and Ed25519 signatures are
/// deterministic, so the derived vault secret is stable across unlocks just
/// like a real platform credential.
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;

use super::{CredentialInfo, PlatformAuthenticator, CHALLENGE};
use crate::error::{Result, SignlessError};

struct RegisteredCredential {
    /// User handle the credential was created for (wallet address).
    user: String,
    key: SigningKey,
}

pub struct SoftwareAuthenticator {
    credentials: Mutex<HashMap<String, RegisteredCredential>>,
    user_presence: AtomicBool,
}

impl SoftwareAuthenticator {
    pub fn new() -> Self {
        Self {
            credentials: Mutex::new(HashMap::new()),
            user_presence: AtomicBool::new(true),
        }
    }

    /// Simulate the user cancelling (or completing) ceremonies. With
    /// presence off, register and assert fail the way a dismissed platform
    /// prompt does.
    pub fn set_user_presence(&self, present: bool) {
        self.user_presence.store(present, Ordering::SeqCst);
    }

    /// User handle a credential was registered for, if known.
    pub fn user_for_credential(&self, credential_id: &str) -> Option<String> {
        self.credentials
            .lock()
            .unwrap()
            .get(credential_id)
            .map(|c| c.user.clone())
    }
}

impl Default for SoftwareAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformAuthenticator for SoftwareAuthenticator {
    fn is_supported(&self) -> bool {
        true
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn register(&self, user_identifier: &str) -> Result<CredentialInfo> {
        if !self.user_presence.load(Ordering::SeqCst) {
            return Err(SignlessError::RegistrationFailed(
                "user cancelled the ceremony".into(),
            ));
        }

        let mut raw_id = [0u8; 16];
        OsRng.fill_bytes(&mut raw_id);
        let key = SigningKey::generate(&mut OsRng);

        let credential_id = URL_SAFE_NO_PAD.encode(raw_id);
        let public_key = URL_SAFE_NO_PAD.encode(key.verifying_key().to_bytes());

        self.credentials.lock().unwrap().insert(
            credential_id.clone(),
            RegisteredCredential {
                user: user_identifier.to_string(),
                key,
            },
        );

        Ok(CredentialInfo {
            credential_id,
            public_key,
            transports: Some(vec!["internal".into()]),
        })
    }

    async fn assert(&self, credential: &CredentialInfo) -> Result<Vec<u8>> {
        if !self.user_presence.load(Ordering::SeqCst) {
            return Err(SignlessError::AuthenticationFailed(
                "user cancelled the ceremony".into(),
            ));
        }

        let credentials = self.credentials.lock().unwrap();
        let registered = credentials
            .get(&credential.credential_id)
            .ok_or_else(|| SignlessError::AuthenticationFailed("unknown credential".into()))?;

        let mut message = CHALLENGE.to_vec();
        message.extend_from_slice(credential.credential_id.as_bytes());

        Ok(registered.key.sign(&message).to_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authenticator::secret_from_assertion;

    #[tokio::test]
    async fn test_register_then_assert_is_stable() {
        let auth = SoftwareAuthenticator::new();
        let credential = auth.register("EQwallet1").await.unwrap();

        let sig1 = auth.assert(&credential).await.unwrap();
        let sig2 = auth.assert(&credential).await.unwrap();

        assert_eq!(sig1, sig2);
        assert_eq!(
            *secret_from_assertion(&sig1).unwrap(),
            *secret_from_assertion(&sig2).unwrap()
        );
    }

    #[tokio::test]
    async fn test_distinct_credentials_distinct_secrets() {
        let auth = SoftwareAuthenticator::new();
        let c1 = auth.register("EQwallet1").await.unwrap();
        let c2 = auth.register("EQwallet2").await.unwrap();

        assert_ne!(c1.credential_id, c2.credential_id);
        assert_ne!(
            auth.assert(&c1).await.unwrap(),
            auth.assert(&c2).await.unwrap()
        );
        assert_eq!(auth.user_for_credential(&c1.credential_id).unwrap(), "EQwallet1");
    }

    #[tokio::test]
    async fn test_cancelled_ceremonies_fail() {
        let auth = SoftwareAuthenticator::new();
        let credential = auth.register("EQwallet1").await.unwrap();

        auth.set_user_presence(false);
        assert!(matches!(
            auth.register("EQwallet2").await,
            Err(SignlessError::RegistrationFailed(_))
        ));
        assert!(matches!(
            auth.assert(&credential).await,
            Err(SignlessError::AuthenticationFailed(_))
        ));

        auth.set_user_presence(true);
        assert!(auth.assert(&credential).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_credential_fails() {
        let auth = SoftwareAuthenticator::new();
        let credential = CredentialInfo {
            credential_id: "bm90LXJlZ2lzdGVyZWQ".into(),
            public_key: String::new(),
            transports: None,
        };

        assert!(matches!(
            auth.assert(&credential).await,
            Err(SignlessError::AuthenticationFailed(_))
        ));
    }
}
