use std::fmt;

use rsa::RsaPublicKey;
use tracing::warn;

use super::hmac_canonical::validate_twilio_signature;
use super::hmac_timestamped::{
    validate_timestamped_signature_with_tolerance, HMAC_TIMESTAMP_TOLERANCE_SECS,
};
use super::rsa_timestamped::{
    parse_public_key, validate_rsa_signature_with_tolerance, RSA_TIMESTAMP_TOLERANCE_SECS,
};
use crate::domain::{Clock, DomainError, SignedRequest, SystemClock};
use crate::infrastructure::observability::record_signature_check;

/// Webhook signature scheme together with its key material.
///
/// A new provider format is one more variant here plus its free function.
#[derive(Clone)]
pub enum Verifier {
    /// HMAC-SHA1 over `url + sorted params`, base64
    HmacCanonical { secret: String },
    /// HMAC-SHA256 over `"{t}.{body}"` carried in a `t=..,v1=..` header
    HmacTimestamped { secret: String, tolerance_secs: u64 },
    /// RSA-SHA256 over `"{timestamp}{body}"`, timestamp in its own header
    RsaTimestamped {
        public_key: RsaPublicKey,
        tolerance_secs: u64,
    },
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HmacCanonical { .. } => f
                .debug_struct("HmacCanonical")
                .field("secret", &"[REDACTED]")
                .finish(),
            Self::HmacTimestamped { tolerance_secs, .. } => f
                .debug_struct("HmacTimestamped")
                .field("secret", &"[REDACTED]")
                .field("tolerance_secs", tolerance_secs)
                .finish(),
            Self::RsaTimestamped { tolerance_secs, .. } => f
                .debug_struct("RsaTimestamped")
                .field("tolerance_secs", tolerance_secs)
                .finish_non_exhaustive(),
        }
    }
}

impl Verifier {
    pub fn hmac_canonical(secret: impl Into<String>) -> Self {
        Self::HmacCanonical {
            secret: secret.into(),
        }
    }

    pub fn hmac_timestamped(secret: impl Into<String>) -> Self {
        Self::HmacTimestamped {
            secret: secret.into(),
            tolerance_secs: HMAC_TIMESTAMP_TOLERANCE_SECS,
        }
    }

    pub fn rsa_timestamped(public_key: RsaPublicKey) -> Self {
        Self::RsaTimestamped {
            public_key,
            tolerance_secs: RSA_TIMESTAMP_TOLERANCE_SECS,
        }
    }

    pub fn rsa_timestamped_from_pem(pem: &str) -> Result<Self, DomainError> {
        Ok(Self::rsa_timestamped(parse_public_key(pem)?))
    }

    /// Overrides the replay window; no effect on `HmacCanonical`
    pub fn with_tolerance(mut self, secs: u64) -> Self {
        match &mut self {
            Self::HmacCanonical { .. } => {}
            Self::HmacTimestamped { tolerance_secs, .. }
            | Self::RsaTimestamped { tolerance_secs, .. } => *tolerance_secs = secs,
        }
        self
    }

    /// Scheme name used in logs and metrics
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::HmacCanonical { .. } => "hmac_canonical",
            Self::HmacTimestamped { .. } => "hmac_timestamped",
            Self::RsaTimestamped { .. } => "rsa_timestamped",
        }
    }

    /// Verifies against the system clock
    pub fn verify(&self, request: &SignedRequest) -> bool {
        self.verify_with(request, &SystemClock::new())
    }

    pub fn verify_with(&self, request: &SignedRequest, clock: &dyn Clock) -> bool {
        self.verify_at(request, clock.unix_timestamp())
    }

    /// Verifies as of `now` (unix seconds). Any failure is `false`.
    pub fn verify_at(&self, request: &SignedRequest, now: i64) -> bool {
        let valid = match request.signature() {
            None => {
                warn!(scheme = self.scheme(), reason = "missing_signature", "webhook_signature_invalid");
                false
            }
            Some(signature) => self.check(request, signature, now),
        };

        record_signature_check(self.scheme(), valid);
        valid
    }

    fn check(&self, request: &SignedRequest, signature: &str, now: i64) -> bool {
        match self {
            Self::HmacCanonical { secret } => {
                validate_twilio_signature(signature, request.url(), request.params(), secret)
            }
            Self::HmacTimestamped {
                secret,
                tolerance_secs,
            } => validate_timestamped_signature_with_tolerance(
                signature,
                request.body(),
                secret,
                now,
                *tolerance_secs,
            ),
            Self::RsaTimestamped {
                public_key,
                tolerance_secs,
            } => {
                let Some(timestamp) = request.timestamp() else {
                    warn!(scheme = "rsa_timestamped", reason = "missing_timestamp", "webhook_signature_invalid");
                    return false;
                };

                validate_rsa_signature_with_tolerance(
                    signature,
                    timestamp,
                    request.body(),
                    public_key,
                    now,
                    *tolerance_secs,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::ManualClock;
    use crate::infrastructure::signature::hmac_canonical::compute_twilio_signature;
    use crate::infrastructure::signature::hmac_timestamped::compute_timestamped_signature;
    use crate::infrastructure::signature::rsa_timestamped::test_keys::{public_key, sign};

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_hmac_canonical_variant() {
        let params = BTreeMap::from([
            ("A".to_string(), "1".to_string()),
            ("B".to_string(), "2".to_string()),
        ]);
        let signature = compute_twilio_signature("https://x.com/hook", &params, "secret").unwrap();
        let verifier = Verifier::hmac_canonical("secret");

        let request = SignedRequest::new("https://x.com/hook")
            .with_params(params)
            .with_signature(signature);

        assert!(verifier.verify(&request));
        assert!(!verifier.verify(&request.clone().with_param("C", "3")));
    }

    #[test]
    fn test_missing_signature_is_invalid() {
        let request = SignedRequest::new("https://x.com/hook").with_param("A", "1");

        assert!(!Verifier::hmac_canonical("secret").verify(&request));
        assert!(!Verifier::hmac_timestamped("whsec").verify_at(&request, NOW));
    }

    #[test]
    fn test_hmac_timestamped_variant_uses_clock() {
        let body = b"{\"id\":\"evt_1\"}".to_vec();
        let header = compute_timestamped_signature(NOW, &body, "whsec").unwrap();
        let request = SignedRequest::new("https://x.com/billing")
            .with_body(body)
            .with_signature(header);
        let verifier = Verifier::hmac_timestamped("whsec");
        let clock = ManualClock::at_unix(NOW);

        assert!(verifier.verify_with(&request, &clock));

        clock.advance(std::time::Duration::from_secs(301));
        assert!(!verifier.verify_with(&request, &clock));
    }

    #[test]
    fn test_tolerance_override() {
        let body = b"{}".to_vec();
        let header = compute_timestamped_signature(NOW, &body, "whsec").unwrap();
        let request = SignedRequest::new("https://x.com/billing")
            .with_body(body)
            .with_signature(header);

        let strict = Verifier::hmac_timestamped("whsec").with_tolerance(10);

        assert!(strict.verify_at(&request, NOW + 10));
        assert!(!strict.verify_at(&request, NOW + 11));
    }

    #[test]
    fn test_rsa_variant_requires_timestamp_header() {
        let body = b"{\"event\":\"port\"}".to_vec();
        let timestamp = NOW.to_string();
        let signature = sign(&timestamp, &body);
        let verifier = Verifier::rsa_timestamped(public_key());

        let request = SignedRequest::new("https://x.com/carrier")
            .with_body(body)
            .with_signature(signature);

        assert!(!verifier.verify_at(&request, NOW));
        assert!(verifier.verify_at(&request.clone().with_timestamp(timestamp), NOW));
        assert!(!verifier.verify_at(&request.with_timestamp(NOW.to_string()), NOW + 601));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", Verifier::hmac_canonical("super-secret-token"));

        assert!(!debug.contains("super-secret-token"));
        assert_eq!(Verifier::hmac_canonical("x").scheme(), "hmac_canonical");
    }
}
