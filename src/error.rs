use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignlessError {
    #[error("Wallet not connected")]
    NotConnected,

    #[error("PIN is required for PIN authentication")]
    PinRequired,

    #[error("Invalid authentication method")]
    InvalidAuthMethod,

    #[error("Public key not available")]
    PublicKeyUnavailable,

    #[error("Vault is locked")]
    NotUnlocked,

    #[error("No signless vault found")]
    NoVaultFound,

    #[error("Authenticator credential not found")]
    CredentialMissing,

    // Intentionally generic: wrong secret and corrupted ciphertext must be
    // indistinguishable to the caller.
    #[error("Invalid secret or corrupted vault")]
    InvalidSecretOrCorruptVault,

    #[error("Failed to unlock vault")]
    UnlockFailed,

    #[error("Platform authenticator is not supported")]
    UnsupportedPlatform,

    #[error("Credential registration failed: {0}")]
    RegistrationFailed(String),

    #[error("Authenticator assertion failed: {0}")]
    AuthenticationFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Key import failed: {0}")]
    KeyImport(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SignlessError>;
