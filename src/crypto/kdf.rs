/// PBKDF2-HMAC-SHA256 key derivation for secret-based envelope encryption.
///
/// The secret is either a user PIN or the hex-reduced signature of a
/// platform-authenticator assertion. Both are low entropy, so the iteration
/// count is the brute-force brake.
///
/// Produces a 256-bit (32-byte) AES-GCM key from a secret and salt.
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use crate::crypto::sensitive::SensitiveBytes32;

/// Default PBKDF2 iteration count. Matches the vault format; lowering it
/// breaks decryption of existing vaults.
pub const PBKDF2_ITERATIONS: u32 = 100_000;
pub const SALT_LEN: usize = 16;

/// Generate a random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a 32-byte key from a secret using PBKDF2-HMAC-SHA256.
///
/// Deterministic for identical `(secret, salt, iterations)`.
pub fn derive_key(secret: &[u8], salt: &[u8], iterations: u32) -> SensitiveBytes32 {
    let mut output = [0u8; 32];
    pbkdf2_hmac::<Sha256>(secret, salt, iterations, &mut output);
    SensitiveBytes32::new(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Full-strength derivation is cheap enough for PBKDF2; no reduced-cost
    // test variant needed.
    #[test]
    fn test_derive_key_deterministic() {
        let salt = [0x42u8; SALT_LEN];
        let k1 = derive_key(b"123456", &salt, PBKDF2_ITERATIONS);
        let k2 = derive_key(b"123456", &salt, PBKDF2_ITERATIONS);
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_secret() {
        let salt = [0x42u8; SALT_LEN];
        let k1 = derive_key(b"123456", &salt, PBKDF2_ITERATIONS);
        let k2 = derive_key(b"654321", &salt, PBKDF2_ITERATIONS);
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_salt() {
        let k1 = derive_key(b"123456", &[0x01; SALT_LEN], PBKDF2_ITERATIONS);
        let k2 = derive_key(b"123456", &[0x02; SALT_LEN], PBKDF2_ITERATIONS);
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_iterations() {
        let salt = [0x42u8; SALT_LEN];
        let k1 = derive_key(b"123456", &salt, 1_000);
        let k2 = derive_key(b"123456", &salt, 2_000);
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_generate_salt_unique() {
        let s1 = generate_salt();
        let s2 = generate_salt();
        assert_ne!(s1, s2);
    }
}
