//! Timestamped RSA-SHA256 scheme for asymmetric-signing providers

use base64::{engine::general_purpose::STANDARD, Engine};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier as _;
use rsa::RsaPublicKey;
use sha2::Sha256;
use tracing::warn;

use crate::domain::DomainError;

/// Replay window for RSA-signed callbacks
pub const RSA_TIMESTAMP_TOLERANCE_SECS: u64 = 600;

/// Parses a PEM public key in SPKI (`BEGIN PUBLIC KEY`) or PKCS#1
/// (`BEGIN RSA PUBLIC KEY`) form
pub fn parse_public_key(pem: &str) -> Result<RsaPublicKey, DomainError> {
    let pem = pem.trim();

    RsaPublicKey::from_public_key_pem(pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
        .map_err(|e| DomainError::configuration(format!("Invalid RSA public key: {}", e)))
}

/// Validates with the default ten-minute replay window
pub fn validate_rsa_signature(
    signature: &str,
    timestamp: &str,
    body: &[u8],
    public_key: &RsaPublicKey,
    now: i64,
) -> bool {
    validate_rsa_signature_with_tolerance(
        signature,
        timestamp,
        body,
        public_key,
        now,
        RSA_TIMESTAMP_TOLERANCE_SECS,
    )
}

/// Verifies a base64 PKCS#1 v1.5 RSA-SHA256 signature over `"{timestamp}{body}"`
pub fn validate_rsa_signature_with_tolerance(
    signature: &str,
    timestamp: &str,
    body: &[u8],
    public_key: &RsaPublicKey,
    now: i64,
    tolerance_secs: u64,
) -> bool {
    let Ok(signed_at) = timestamp.trim().parse::<i64>() else {
        warn!(scheme = "rsa_timestamped", reason = "bad_timestamp", "webhook_signature_invalid");
        return false;
    };

    if now.abs_diff(signed_at) > tolerance_secs {
        warn!(
            scheme = "rsa_timestamped",
            reason = "stale_timestamp",
            timestamp = signed_at,
            now,
            "webhook_signature_invalid"
        );
        return false;
    }

    let signature = match STANDARD
        .decode(signature.trim())
        .ok()
        .and_then(|bytes| Signature::try_from(bytes.as_slice()).ok())
    {
        Some(signature) => signature,
        None => {
            warn!(scheme = "rsa_timestamped", reason = "bad_encoding", "webhook_signature_invalid");
            return false;
        }
    };

    let mut message = Vec::with_capacity(timestamp.len() + body.len());
    message.extend_from_slice(timestamp.trim().as_bytes());
    message.extend_from_slice(body);

    let verifying_key = VerifyingKey::<Sha256>::new(public_key.clone());

    match verifying_key.verify(&message, &signature) {
        Ok(()) => true,
        Err(_) => {
            warn!(scheme = "rsa_timestamped", reason = "mismatch", "webhook_signature_invalid");
            false
        }
    }
}
