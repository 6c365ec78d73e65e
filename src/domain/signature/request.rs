use std::collections::BTreeMap;

use bytes::Bytes;

/// Request material needed by every signature scheme.
///
/// Parameters live in a `BTreeMap` so iteration is already in the
/// lexicographic key order the canonical string requires.
#[derive(Debug, Clone, Default)]
pub struct SignedRequest {
    url: String,
    params: BTreeMap<String, String>,
    body: Bytes,
    signature: Option<String>,
    timestamp: Option<String>,
}

impl SignedRequest {
    /// Creates request material for the URL the provider signed
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Raw value of the provider's signature header
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Raw value of a separate timestamp header, for schemes that use one
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_iterate_sorted() {
        let request = SignedRequest::new("https://x.com/hook")
            .with_param("To", "+15550001111")
            .with_param("AccountSid", "AC123")
            .with_param("Body", "hi");

        let keys: Vec<&str> = request.params().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["AccountSid", "Body", "To"]);
    }

    #[test]
    fn test_optional_headers_absent_by_default() {
        let request = SignedRequest::new("https://x.com/hook");

        assert!(request.signature().is_none());
        assert!(request.timestamp().is_none());
        assert!(request.body().is_empty());
    }
}
