//! Timestamped HMAC-SHA256 scheme (`t=<unix>,v1=<hex>`, Stripe style)

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use super::compare::constant_time_eq;
use crate::domain::DomainError;

type HmacSha256 = Hmac<Sha256>;

/// Replay window for timestamped HMAC signatures
pub const HMAC_TIMESTAMP_TOLERANCE_SECS: u64 = 300;

#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

/// Parses comma-separated `key=value` pairs. Several `v1` entries may be
/// present while the signing secret is rotated.
fn parse_header(header: &str) -> Option<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for pair in header.split(',') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };

        match key.trim() {
            "t" | "timestamp" => timestamp = value.trim().parse::<i64>().ok(),
            "v1" | "signature" => signatures.push(value.trim().to_string()),
            _ => {}
        }
    }

    if signatures.is_empty() {
        return None;
    }

    Some(SignatureHeader {
        timestamp: timestamp?,
        signatures,
    })
}

fn mac_bytes(timestamp: i64, body: &[u8], secret: &str) -> Result<Vec<u8>, DomainError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| DomainError::internal(format!("Invalid HMAC key: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);

    Ok(mac.finalize().into_bytes().to_vec())
}

/// Computes the header value a provider would send for this payload
pub fn compute_timestamped_signature(
    timestamp: i64,
    body: &[u8],
    secret: &str,
) -> Result<String, DomainError> {
    Ok(format!("t={},v1={}", timestamp, hex::encode(mac_bytes(timestamp, body, secret)?)))
}

/// Validates with the default five-minute replay window
pub fn validate_timestamped_signature(header: &str, body: &[u8], secret: &str, now: i64) -> bool {
    validate_timestamped_signature_with_tolerance(
        header,
        body,
        secret,
        now,
        HMAC_TIMESTAMP_TOLERANCE_SECS,
    )
}

pub fn validate_timestamped_signature_with_tolerance(
    header: &str,
    body: &[u8],
    secret: &str,
    now: i64,
    tolerance_secs: u64,
) -> bool {
    if secret.is_empty() {
        warn!(scheme = "hmac_timestamped", reason = "missing_secret", "webhook_signature_invalid");
        return false;
    }

    let Some(parsed) = parse_header(header) else {
        warn!(scheme = "hmac_timestamped", reason = "malformed_header", "webhook_signature_invalid");
        return false;
    };

    if now.abs_diff(parsed.timestamp) > tolerance_secs {
        warn!(
            scheme = "hmac_timestamped",
            reason = "stale_timestamp",
            timestamp = parsed.timestamp,
            now,
            "webhook_signature_invalid"
        );
        return false;
    }

    let expected = match mac_bytes(parsed.timestamp, body, secret) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(scheme = "hmac_timestamped", error = %e, "webhook_signature_invalid");
            return false;
        }
    };

    let matched = parsed
        .signatures
        .iter()
        .filter_map(|candidate| hex::decode(candidate).ok())
        .any(|provided| constant_time_eq(&expected, &provided));

    if !matched {
        warn!(scheme = "hmac_timestamped", reason = "mismatch", "webhook_signature_invalid");
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;
    const BODY: &[u8] = br#"{"type":"invoice.paid","id":"evt_1"}"#;

    #[test]
    fn test_parse_header_with_aliases() {
        let parsed = parse_header("timestamp=42, signature=abcd").unwrap();

        assert_eq!(parsed.timestamp, 42);
        assert_eq!(parsed.signatures, vec!["abcd".to_string()]);
    }

    #[test]
    fn test_parse_header_requires_both_parts() {
        assert!(parse_header("t=42").is_none());
        assert!(parse_header("v1=abcd").is_none());
        assert!(parse_header("t=soon,v1=abcd").is_none());
        assert!(parse_header("").is_none());
    }

    #[test]
    fn test_accepts_fresh_signature() {
        let header = compute_timestamped_signature(NOW, BODY, "whsec").unwrap();
        assert!(validate_timestamped_signature(&header, BODY, "whsec", NOW + 10));
    }

    #[test]
    fn test_accepts_any_rotated_signature() {
        let valid = compute_timestamped_signature(NOW, BODY, "whsec").unwrap();
        let v1 = valid.split("v1=").nth(1).unwrap();
        let header = format!("t={},v1={},v1={}", NOW, "00".repeat(32), v1);

        assert!(validate_timestamped_signature(&header, BODY, "whsec", NOW));
    }

    #[test]
    fn test_rejects_outside_replay_window() {
        let header = compute_timestamped_signature(NOW, BODY, "whsec").unwrap();

        assert!(validate_timestamped_signature(&header, BODY, "whsec", NOW + 300));
        assert!(!validate_timestamped_signature(&header, BODY, "whsec", NOW + 301));
        assert!(!validate_timestamped_signature(&header, BODY, "whsec", NOW - 301));
    }

    #[test]
    fn test_rejects_tampered_body_or_secret() {
        let header = compute_timestamped_signature(NOW, BODY, "whsec").unwrap();

        assert!(!validate_timestamped_signature(&header, b"{}", "whsec", NOW));
        assert!(!validate_timestamped_signature(&header, BODY, "other", NOW));
    }

    #[test]
    fn test_rejects_timestamp_swap() {
        let header = compute_timestamped_signature(NOW, BODY, "whsec").unwrap();
        let replayed = header.replacen(&format!("t={}", NOW), &format!("t={}", NOW + 5), 1);

        assert!(!validate_timestamped_signature(&replayed, BODY, "whsec", NOW));
    }

    #[test]
    fn test_rejects_non_hex_signature() {
        let header = format!("t={},v1=zzzz", NOW);
        assert!(!validate_timestamped_signature(&header, BODY, "whsec", NOW));
    }
}
