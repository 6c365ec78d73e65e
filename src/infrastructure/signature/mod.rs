//! Webhook signature verification
//!
//! Every entry point returns `bool`; malformed input, stale timestamps and
//! mismatches all read as unauthenticated and are logged at `warn`.

mod compare;
mod hmac_canonical;
mod hmac_timestamped;
mod rsa_timestamped;
mod verifier;

pub use hmac_canonical::{canonical_string, compute_twilio_signature, validate_twilio_signature};
pub use hmac_timestamped::{
    compute_timestamped_signature, validate_timestamped_signature,
    validate_timestamped_signature_with_tolerance, HMAC_TIMESTAMP_TOLERANCE_SECS,
};
pub use rsa_timestamped::{
    parse_public_key, validate_rsa_signature, validate_rsa_signature_with_tolerance,
    RSA_TIMESTAMP_TOLERANCE_SECS,
};
pub use verifier::Verifier;

#[cfg(test)]
pub(crate) use rsa_timestamped::test_keys;
