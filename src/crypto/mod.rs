/// Cryptographic primitives for the signless vault.
///
/// - `kdf`       — PBKDF2-HMAC-SHA256 secret-to-key derivation
/// - `aead`      — AES-256-GCM envelope encryption + vault format
/// - `keys`      — Ed25519 keypair generation / sign / verify
/// - `sensitive` — zeroize-on-drop wrappers for key material
pub mod aead;
pub mod kdf;
pub mod keys;
pub mod sensitive;

pub use aead::EncryptedVault;
pub use keys::SigningKeyPair;
pub use sensitive::{SensitiveBytes32, SensitiveVec};
