//! Reading provider callbacks: body parameters, signed URL, client address

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{ConnectInfo, FromRequest, Multipart, Request},
    http::{self, header, HeaderMap, Uri},
};
use tracing::warn;

use crate::api::middleware::MAX_BODY_SIZE;
use crate::config::WebhookConfig;
use crate::domain::SignedRequest;

/// A provider callback after the body has been read
#[derive(Debug, Clone)]
pub struct InboundWebhook {
    /// URL as the provider signed it, `None` when it cannot be reconstructed
    pub url: Option<String>,
    pub params: BTreeMap<String, String>,
    pub body: Bytes,
    pub headers: HeaderMap,
    pub client_ip: String,
}

impl InboundWebhook {
    /// Reads the request. Unreadable bodies yield empty parameters so the
    /// caller still answers the provider; signature checks then fail.
    pub async fn read(request: Request, config: &WebhookConfig) -> Self {
        let client_ip = client_ip(&request, config.trust_forwarded_headers);
        let url = signed_url(request.uri(), request.headers(), config);
        let (parts, body) = request.into_parts();

        let body = match to_bytes(body, MAX_BODY_SIZE).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "webhook_body_unreadable");
                Bytes::new()
            }
        };

        let params = parse_params(&parts.headers, &body).await;

        Self {
            url,
            params,
            body,
            headers: parts.headers,
            client_ip,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Signature material for the given signature/timestamp headers
    pub fn signed_request(&self, signature_header: &str, timestamp_header: Option<&str>) -> SignedRequest {
        let mut request = SignedRequest::new(self.url.clone().unwrap_or_default())
            .with_params(self.params.clone())
            .with_body(self.body.clone());

        if let Some(signature) = self.header(signature_header) {
            request = request.with_signature(signature);
        }

        if let Some(timestamp) = timestamp_header.and_then(|name| self.header(name)) {
            request = request.with_timestamp(timestamp);
        }

        request
    }
}

async fn parse_params(headers: &HeaderMap, body: &Bytes) -> BTreeMap<String, String> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("multipart/form-data") {
        return parse_multipart(content_type, body.clone()).await;
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        return url::form_urlencoded::parse(body).into_owned().collect();
    }

    BTreeMap::new()
}

async fn parse_multipart(content_type: &str, body: Bytes) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();

    let request = match http::Request::builder()
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
    {
        Ok(request) => request,
        Err(_) => return params,
    };

    let mut multipart = match Multipart::from_request(request, &()).await {
        Ok(multipart) => multipart,
        Err(e) => {
            warn!(error = %e, "webhook_multipart_invalid");
            return params;
        }
    };

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                // File parts are never signed parameters
                if field.file_name().is_some() {
                    continue;
                }

                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };

                match field.text().await {
                    Ok(value) => {
                        params.insert(name, value);
                    }
                    Err(e) => {
                        warn!(error = %e, field = %name, "webhook_multipart_field_invalid");
                        return BTreeMap::new();
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "webhook_multipart_invalid");
                return BTreeMap::new();
            }
        }
    }

    params
}

/// Reconstructs the URL the provider signed.
///
/// Precedence: configured public base URL, then forwarded headers (when
/// trusted), then `Host`. The scheme defaults to https since providers only
/// call public TLS endpoints.
pub fn signed_url(uri: &Uri, headers: &HeaderMap, config: &WebhookConfig) -> Option<String> {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    if let Some(base) = &config.public_base_url {
        return Some(format!("{}{}", base.trim_end_matches('/'), path_and_query));
    }

    let forwarded = |name: &str| {
        config
            .trust_forwarded_headers
            .then(|| first_header_value(headers, name))
            .flatten()
    };

    let scheme = forwarded("x-forwarded-proto").unwrap_or("https");

    let host = forwarded("x-forwarded-host")
        .or_else(|| headers.get(header::HOST).and_then(|v| v.to_str().ok()))
        .or_else(|| uri.authority().map(|a| a.as_str()))?;

    Some(format!("{}://{}{}", scheme, host, path_and_query))
}

/// Client address for per-source limits
pub fn client_ip(request: &Request, trust_forwarded_headers: bool) -> String {
    let forwarded = trust_forwarded_headers
        .then(|| {
            first_header_value(request.headers(), "x-forwarded-for")
                .or_else(|| first_header_value(request.headers(), "x-real-ip"))
        })
        .flatten();

    forwarded
        .map(str::to_string)
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// First comma-separated value of a header, trimmed
fn first_header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn config() -> WebhookConfig {
        WebhookConfig::default()
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_signed_url_from_host_defaults_to_https() {
        let uri: Uri = "/webhooks/sms/inbound?tenant=acme".parse().unwrap();
        let url = signed_url(&uri, &headers(&[("host", "crm.example.com")]), &config());

        assert_eq!(url.as_deref(), Some("https://crm.example.com/webhooks/sms/inbound?tenant=acme"));
    }

    #[test]
    fn test_signed_url_prefers_forwarded_headers() {
        let uri: Uri = "/webhooks/voice/status".parse().unwrap();
        let headers = headers(&[
            ("host", "10.0.0.5:8080"),
            ("x-forwarded-proto", "https, http"),
            ("x-forwarded-host", "crm.example.com"),
        ]);

        assert_eq!(
            signed_url(&uri, &headers, &config()).as_deref(),
            Some("https://crm.example.com/webhooks/voice/status")
        );
    }

    #[test]
    fn test_signed_url_ignores_untrusted_forwarded_headers() {
        let uri: Uri = "/webhooks/voice/status".parse().unwrap();
        let headers = headers(&[("host", "internal:8080"), ("x-forwarded-host", "evil.example")]);
        let config = WebhookConfig {
            trust_forwarded_headers: false,
            ..config()
        };

        assert_eq!(
            signed_url(&uri, &headers, &config).as_deref(),
            Some("https://internal:8080/webhooks/voice/status")
        );
    }

    #[test]
    fn test_signed_url_public_base_wins() {
        let uri: Uri = "/webhooks/sms/inbound".parse().unwrap();
        let config = WebhookConfig {
            public_base_url: Some("https://hooks.example.com/".to_string()),
            ..config()
        };

        assert_eq!(
            signed_url(&uri, &headers(&[("host", "other")]), &config).as_deref(),
            Some("https://hooks.example.com/webhooks/sms/inbound")
        );
    }

    #[test]
    fn test_signed_url_without_host() {
        let uri: Uri = "/webhooks/sms/inbound".parse().unwrap();
        assert!(signed_url(&uri, &HeaderMap::new(), &config()).is_none());
    }

    #[test]
    fn test_client_ip_sources() {
        let request = http::Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request, true), "203.0.113.7");
        assert_eq!(client_ip(&request, false), "unknown");

        let mut request = http::Request::builder().body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([198, 51, 100, 4], 5000))));
        assert_eq!(client_ip(&request, true), "198.51.100.4");
    }

    #[tokio::test]
    async fn test_reads_form_params() {
        let request = http::Request::builder()
            .uri("/webhooks/sms/inbound")
            .header("host", "crm.example.com")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("From=%2B15550001111&Body=hello+there&AccountSid=AC1"))
            .unwrap();

        let webhook = InboundWebhook::read(request, &config()).await;

        assert_eq!(webhook.param("From"), Some("+15550001111"));
        assert_eq!(webhook.param("Body"), Some("hello there"));
        assert_eq!(webhook.url.as_deref(), Some("https://crm.example.com/webhooks/sms/inbound"));
    }

    #[tokio::test]
    async fn test_reads_multipart_params() {
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"From\"\r\n\r\n+15550001111\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"AccountSid\"\r\n\r\nAC1\r\n--{b}--\r\n",
            b = boundary
        );
        let request = http::Request::builder()
            .uri("/webhooks/voice/inbound")
            .header("host", "crm.example.com")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();

        let webhook = InboundWebhook::read(request, &config()).await;

        assert_eq!(webhook.param("From"), Some("+15550001111"));
        assert_eq!(webhook.param("AccountSid"), Some("AC1"));
    }

    #[tokio::test]
    async fn test_unknown_content_type_has_no_params() {
        let request = http::Request::builder()
            .uri("/webhooks/billing")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"id":"evt_1"}"#))
            .unwrap();

        let webhook = InboundWebhook::read(request, &config()).await;

        assert!(webhook.params.is_empty());
        assert_eq!(&webhook.body[..], br#"{"id":"evt_1"}"#);
    }
}
