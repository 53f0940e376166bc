/// AES-256-GCM envelope encryption for the signless private key.
///
/// The cipher key is derived from the user secret with PBKDF2, never used
/// directly. Salt and IV are freshly random on every encryption, including
/// retry paths; the 12-byte GCM nonce is never reused under a derived key
/// because the salt (and therefore the key) changes alongside it.
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{self, PBKDF2_ITERATIONS};
use crate::crypto::sensitive::SensitiveVec;
use crate::error::{Result, SignlessError};

pub const IV_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// Current vault format version.
pub const VAULT_VERSION: u32 = 1;

/// Encrypted vault format, persisted per wallet address.
///
/// Binary fields are base64-encoded. `encrypted_blob` is ciphertext with the
/// GCM authentication tag appended. The public key is stored in clear; it is
/// not secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedVault {
    pub salt: String,
    pub iv: String,
    pub encrypted_blob: String,
    pub public_key: String,
    pub version: u32,
}

/// Generate a random 12-byte IV for AES-GCM.
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    rand::rngs::OsRng.fill_bytes(&mut iv);
    iv
}

/// Encrypt a raw private key under a user secret.
///
/// Generates a fresh salt and IV, derives the cipher key, and returns the
/// complete vault struct. The caller is responsible for persisting it.
pub fn encrypt(private_key: &[u8], public_key: &[u8], secret: &[u8]) -> Result<EncryptedVault> {
    let salt = kdf::generate_salt();
    let iv = generate_iv();
    let key = kdf::derive_key(secret, &salt, PBKDF2_ITERATIONS);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| SignlessError::Encryption(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), private_key)
        .map_err(|e| SignlessError::Encryption(e.to_string()))?;

    Ok(EncryptedVault {
        salt: B64.encode(salt),
        iv: B64.encode(iv),
        encrypted_blob: B64.encode(ciphertext),
        public_key: B64.encode(public_key),
        version: VAULT_VERSION,
    })
}

/// Decrypt a vault back into the raw private key.
///
/// Every failure mode (bad encoding, unknown version, tag mismatch) collapses
/// to the same generic error so a wrong secret is indistinguishable from a
/// corrupted or tampered vault.
pub fn decrypt(vault: &EncryptedVault, secret: &[u8]) -> Result<SensitiveVec> {
    if vault.version != VAULT_VERSION {
        return Err(SignlessError::InvalidSecretOrCorruptVault);
    }

    let salt = B64
        .decode(&vault.salt)
        .map_err(|_| SignlessError::InvalidSecretOrCorruptVault)?;
    let iv = B64
        .decode(&vault.iv)
        .map_err(|_| SignlessError::InvalidSecretOrCorruptVault)?;
    let blob = B64
        .decode(&vault.encrypted_blob)
        .map_err(|_| SignlessError::InvalidSecretOrCorruptVault)?;

    if iv.len() != IV_LEN || blob.len() < TAG_LEN {
        return Err(SignlessError::InvalidSecretOrCorruptVault);
    }

    let key = kdf::derive_key(secret, &salt, PBKDF2_ITERATIONS);
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| SignlessError::InvalidSecretOrCorruptVault)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&iv), blob.as_ref())
        .map_err(|_| SignlessError::InvalidSecretOrCorruptVault)?;

    Ok(SensitiveVec::new(plaintext))
}
