/// Canonical payment payload and signing output.
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::crypto::keys::SIGNATURE_LEN;
use crate::error::{Result, SignlessError};

/// Token symbol used when the caller does not name one.
pub const NATIVE_TOKEN: &str = "TON";

/// Default signature validity window, seconds.
pub const DEFAULT_VALIDITY_SECS: i64 = 300;

pub const REFERENCE_LEN: usize = 16;

/// Caller-supplied payment parameters. Optional fields receive defaults at
/// signing time.
#[derive(Debug, Clone, Default)]
pub struct PaymentRequest {
    pub recipient: String,
    pub amount: String,
    pub token: Option<String>,
    pub payload: Option<String>,
    pub reference: Option<String>,
    /// Unix seconds.
    pub valid_until: Option<i64>,
}

/// Canonical payload form. The declared field order is part of the format:
/// the signature covers exactly these bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub recipient: String,
    pub amount: String,
    pub token: String,
    pub payload: String,
    pub reference: String,
    pub valid_until: i64,
}

impl PaymentPayload {
    /// Fill in defaults: native token, empty attached payload, fresh random
    /// reference, now + 300 s validity.
    pub fn from_request(request: PaymentRequest) -> Self {
        Self {
            recipient: request.recipient,
            amount: request.amount,
            token: request.token.unwrap_or_else(|| NATIVE_TOKEN.to_string()),
            payload: request.payload.unwrap_or_default(),
            reference: request.reference.unwrap_or_else(generate_reference),
            valid_until: request
                .valid_until
                .unwrap_or_else(|| chrono::Utc::now().timestamp() + DEFAULT_VALIDITY_SECS),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| SignlessError::Serialization(e.to_string()))
    }
}

/// Fresh random 16-byte payment reference, hex-encoded.
pub fn generate_reference() -> String {
    let mut bytes = [0u8; REFERENCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Output of a signless signing operation. Opaque transport values for the
/// merchant-side settlement API.
#[derive(Debug, Clone)]
pub struct SignedPayload {
    pub payload: Vec<u8>,
    pub signature: [u8; SIGNATURE_LEN],
    /// Vault public key, base64.
    pub public_key: String,
    pub reference: String,
    pub valid_until: i64,
}
