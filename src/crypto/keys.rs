/// Ed25519 signing keypair for payment-payload authorization.
///
/// Keys are handled as raw 32-byte values. The private key only exists in
/// plaintext transiently: at generation, and in the vault manager's memory
/// while the vault is unlocked.
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

use crate::crypto::sensitive::SensitiveBytes32;
use crate::error::{Result, SignlessError};

pub const PUBLIC_KEY_LEN: usize = 32;
pub const PRIVATE_KEY_LEN: usize = 32;
pub const SIGNATURE_LEN: usize = 64;

/// A freshly generated signing keypair.
pub struct SigningKeyPair {
    pub public_key: [u8; PUBLIC_KEY_LEN],
    private_key: SensitiveBytes32,
}

impl SigningKeyPair {
    /// Generate a keypair from the OS random source.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self {
            public_key: signing_key.verifying_key().to_bytes(),
            private_key: SensitiveBytes32::new(signing_key.to_bytes()),
        }
    }

    pub fn private_key(&self) -> &SensitiveBytes32 {
        &self.private_key
    }
}

fn import_signing_key(private_key: &[u8]) -> Result<SigningKey> {
    let bytes: &[u8; PRIVATE_KEY_LEN] = private_key.try_into().map_err(|_| {
        SignlessError::KeyImport(format!(
            "expected {PRIVATE_KEY_LEN}-byte Ed25519 private key, got {}",
            private_key.len()
        ))
    })?;
    Ok(SigningKey::from_bytes(bytes))
}

/// Sign a message with a raw Ed25519 private key.
pub fn sign(private_key: &[u8], message: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
    let key = import_signing_key(private_key)?;
    Ok(key.sign(message).to_bytes())
}

/// Verify a signature against a raw Ed25519 public key.
///
/// Returns `Ok(false)` on mismatch or a malformed signature; only malformed
/// key bytes are an error.
pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool> {
    let bytes: &[u8; PUBLIC_KEY_LEN] = public_key.try_into().map_err(|_| {
        SignlessError::KeyImport(format!(
            "expected {PUBLIC_KEY_LEN}-byte Ed25519 public key, got {}",
            public_key.len()
        ))
    })?;
    let verifying_key =
        VerifyingKey::from_bytes(bytes).map_err(|e| SignlessError::KeyImport(e.to_string()))?;

    let sig = match Signature::from_slice(signature) {
        Ok(sig) => sig,
        Err(_) => return Ok(false),
    };

    Ok(verifying_key.verify(message, &sig).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_roundtrip() {
        let keypair = SigningKeyPair::generate();
        let message = b"payment payload bytes";

        let signature = sign(keypair.private_key().as_bytes(), message).unwrap();
        assert!(verify(&keypair.public_key, message, &signature).unwrap());
    }

    #[test]
    fn test_wrong_message_fails() {
        let keypair = SigningKeyPair::generate();
        let signature = sign(keypair.private_key().as_bytes(), b"original").unwrap();

        assert!(!verify(&keypair.public_key, b"tampered", &signature).unwrap());
    }

    #[test]
    fn test_tampered_signature_fails() {
        let keypair = SigningKeyPair::generate();
        let message = b"payment payload bytes";
        let mut signature = sign(keypair.private_key().as_bytes(), message).unwrap();
        signature[0] ^= 0xFF;

        assert!(!verify(&keypair.public_key, message, &signature).unwrap());
    }

    #[test]
    fn test_malformed_private_key_rejected() {
        let result = sign(&[0u8; 7], b"message");
        assert!(matches!(result, Err(SignlessError::KeyImport(_))));
    }

    #[test]
    fn test_malformed_public_key_rejected() {
        let result = verify(&[0u8; 7], b"message", &[0u8; SIGNATURE_LEN]);
        assert!(matches!(result, Err(SignlessError::KeyImport(_))));
    }

    #[test]
    fn test_malformed_signature_is_false_not_error() {
        let keypair = SigningKeyPair::generate();
        assert!(!verify(&keypair.public_key, b"message", &[0u8; 3]).unwrap());
    }

    #[test]
    fn test_generated_keypairs_unique() {
        let a = SigningKeyPair::generate();
        let b = SigningKeyPair::generate();
        assert_ne!(a.public_key, b.public_key);
    }
}
