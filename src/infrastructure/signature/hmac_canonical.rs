//! URL + sorted parameter HMAC-SHA1 scheme (Twilio `X-Twilio-Signature`)

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use tracing::warn;

use super::compare::constant_time_eq;
use crate::domain::DomainError;

type HmacSha1 = Hmac<Sha1>;

/// Builds `url + key1 + value1 + key2 + value2 ...` with keys in byte order
pub fn canonical_string(url: &str, params: &BTreeMap<String, String>) -> String {
    let capacity = url.len() + params.iter().map(|(k, v)| k.len() + v.len()).sum::<usize>();

    params
        .iter()
        .fold(String::with_capacity(capacity) + url, |mut acc, (key, value)| {
            acc.push_str(key);
            acc.push_str(value);
            acc
        })
}

fn mac_bytes(
    url: &str,
    params: &BTreeMap<String, String>,
    secret: &str,
) -> Result<Vec<u8>, DomainError> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| DomainError::internal(format!("Invalid HMAC key: {}", e)))?;
    mac.update(canonical_string(url, params).as_bytes());

    Ok(mac.finalize().into_bytes().to_vec())
}

/// Computes the base64 signature a provider would send for this request
pub fn compute_twilio_signature(
    url: &str,
    params: &BTreeMap<String, String>,
    secret: &str,
) -> Result<String, DomainError> {
    Ok(STANDARD.encode(mac_bytes(url, params, secret)?))
}

/// Checks a base64 HMAC-SHA1 signature over the canonical string.
///
/// Returns `false` on any malformed input.
pub fn validate_twilio_signature(
    signature: &str,
    url: &str,
    params: &BTreeMap<String, String>,
    secret: &str,
) -> bool {
    if signature.is_empty() || secret.is_empty() {
        warn!(scheme = "hmac_canonical", reason = "missing_input", "webhook_signature_invalid");
        return false;
    }

    let provided = match STANDARD.decode(signature.trim()) {
        Ok(bytes) => bytes,
        Err(_) => {
            warn!(scheme = "hmac_canonical", reason = "bad_encoding", "webhook_signature_invalid");
            return false;
        }
    };

    let expected = match mac_bytes(url, params, secret) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(scheme = "hmac_canonical", error = %e, "webhook_signature_invalid");
            return false;
        }
    };

    if !constant_time_eq(&expected, &provided) {
        warn!(scheme = "hmac_canonical", reason = "mismatch", url, "webhook_signature_invalid");
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("B".to_string(), "2".to_string()),
            ("A".to_string(), "1".to_string()),
        ])
    }

    fn expected_signature() -> String {
        let mut mac = HmacSha1::new_from_slice(b"secret").unwrap();
        mac.update(b"https://x.com/hookA1B2");
        STANDARD.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_canonical_string_sorts_keys() {
        assert_eq!(canonical_string("https://x.com/hook", &params()), "https://x.com/hookA1B2");
    }

    #[test]
    fn test_canonical_string_is_case_sensitive_byte_order() {
        let params = BTreeMap::from([
            ("a".to_string(), "3".to_string()),
            ("B".to_string(), "2".to_string()),
        ]);

        assert_eq!(canonical_string("u", &params), "uB2a3");
    }

    #[test]
    fn test_accepts_correct_signature() {
        let signature = expected_signature();

        assert_eq!(
            compute_twilio_signature("https://x.com/hook", &params(), "secret").unwrap(),
            signature
        );
        assert!(validate_twilio_signature(&signature, "https://x.com/hook", &params(), "secret"));
    }

    #[test]
    fn test_rejects_any_flipped_character() {
        let signature = expected_signature();

        for index in 0..signature.len() {
            let mut chars: Vec<char> = signature.chars().collect();
            chars[index] = if chars[index] == 'A' { 'B' } else { 'A' };
            let tampered: String = chars.into_iter().collect();

            assert!(
                !validate_twilio_signature(&tampered, "https://x.com/hook", &params(), "secret"),
                "tampered signature accepted at index {}",
                index
            );
        }
    }

    #[test]
    fn test_rejects_single_bit_flip() {
        let mut raw = STANDARD.decode(expected_signature()).unwrap();

        for byte in 0..raw.len() {
            for bit in 0..8 {
                raw[byte] ^= 1 << bit;
                let tampered = STANDARD.encode(&raw);
                assert!(!validate_twilio_signature(
                    &tampered,
                    "https://x.com/hook",
                    &params(),
                    "secret"
                ));
                raw[byte] ^= 1 << bit;
            }
        }
    }

    #[test]
    fn test_rejects_wrong_secret_url_or_params() {
        let signature = expected_signature();

        assert!(!validate_twilio_signature(&signature, "https://x.com/hook", &params(), "other"));
        assert!(!validate_twilio_signature(&signature, "http://x.com/hook", &params(), "secret"));

        let mut extra = params();
        extra.insert("C".to_string(), "3".to_string());
        assert!(!validate_twilio_signature(&signature, "https://x.com/hook", &extra, "secret"));
    }

    #[test]
    fn test_rejects_truncated_signature() {
        let raw = STANDARD.decode(expected_signature()).unwrap();
        let truncated = STANDARD.encode(&raw[..raw.len() - 1]);

        assert!(!validate_twilio_signature(&truncated, "https://x.com/hook", &params(), "secret"));
    }

    #[test]
    fn test_malformed_input_returns_false() {
        assert!(!validate_twilio_signature("not base64!!", "https://x.com/hook", &params(), "secret"));
        assert!(!validate_twilio_signature("", "https://x.com/hook", &params(), "secret"));
        assert!(!validate_twilio_signature(&expected_signature(), "https://x.com/hook", &params(), ""));
    }
}
