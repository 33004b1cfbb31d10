//! Backend client shared by all adapters
//!
//! Wraps the injected transport with the backend identity, its base URL
//! and the debug flag, and turns transport / serde failures into tagged
//! `ExchangeError`s.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::transport::{HttpMethod, HttpTransport, RequestBody, TransportError, TransportRequest};
use crate::adapters::types::path_segment;

/// Extracts a backend's structured error message from a response body
pub type UpstreamErrorFn = fn(&[u8]) -> Option<String>;

pub struct BackendClient {
    exchange: &'static str,
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    debug: AtomicBool,
    upstream_error: UpstreamErrorFn,
    redact: Vec<String>,
}

impl BackendClient {
    pub fn new(
        exchange: &'static str,
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        debug: bool,
        upstream_error: UpstreamErrorFn,
    ) -> Self {
        Self {
            exchange,
            base_url: base_url.into(),
            transport,
            debug: AtomicBool::new(debug),
            upstream_error,
            redact: Vec::new(),
        }
    }

    /// Mask `secret` (and its path-encoded form) in every logged request
    pub fn with_redacted(mut self, secret: &str) -> Self {
        for value in [secret.to_string(), path_segment(secret)] {
            if !value.is_empty() && !self.redact.contains(&value) {
                self.redact.push(value);
            }
        }
        self
    }

    pub fn set_debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Start a request against this backend with the current debug flag
    pub fn request(&self, method: HttpMethod, path: impl Into<String>) -> TransportRequest {
        self.redact.iter().fold(
            TransportRequest::new(method, self.base_url.clone(), path).debug(self.is_debug()),
            |request, secret| request.with_redacted(secret.as_str()),
        )
    }

    pub async fn get(&self, path: impl Into<String>) -> ExchangeResult<Vec<u8>> {
        self.send(self.request(HttpMethod::Get, path)).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: impl Into<String>,
        body: &B,
    ) -> ExchangeResult<Vec<u8>> {
        let body = self.encode_json(body)?;
        self.send(self.request(HttpMethod::Post, path).with_body(RequestBody::Json(body)))
            .await
    }

    pub async fn post_form(&self, path: impl Into<String>, form: String) -> ExchangeResult<Vec<u8>> {
        self.send(self.request(HttpMethod::Post, path).with_body(RequestBody::Form(form)))
            .await
    }

    /// POST a JSON body the adapter already signed; `headers` carry the
    /// signature and the transport's own signer is skipped
    pub async fn post_signed_json(
        &self,
        path: impl Into<String>,
        body: String,
        headers: Vec<(String, String)>,
    ) -> ExchangeResult<Vec<u8>> {
        let mut request = self
            .request(HttpMethod::Post, path)
            .with_body(RequestBody::Json(body))
            .signed(true);
        for (name, value) in headers {
            request = request.with_header(name, value);
        }
        self.send(request).await
    }

    pub fn encode_json<B: Serialize + ?Sized>(&self, body: &B) -> ExchangeResult<String> {
        serde_json::to_string(body).map_err(|e| ExchangeError::decode(self.exchange, e))
    }

    /// Send a fully prepared request
    pub async fn send(&self, request: TransportRequest) -> ExchangeResult<Vec<u8>> {
        tracing::debug!(
            exchange = self.exchange,
            method = %request.method,
            path = %request.sanitized(&request.path),
            signed = request.signed,
            "Sending backend request"
        );
        self.transport
            .execute(request)
            .await
            .map_err(|e| self.map_transport_error(e))
    }

    /// Decode a response body, surfacing structured upstream errors first
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> ExchangeResult<T> {
        serde_json::from_slice(bytes).map_err(|e| {
            if let Some(message) = (self.upstream_error)(bytes) {
                return ExchangeError::Upstream {
                    exchange: self.exchange,
                    message,
                };
            }
            ExchangeError::decode(
                self.exchange,
                format!("{} - body: {}", e, String::from_utf8_lossy(bytes)),
            )
        })
    }

    /// Parse a numeric string field
    pub fn parse_number(&self, field: &str, raw: &str) -> ExchangeResult<f64> {
        raw.trim().parse::<f64>().map_err(|e| {
            ExchangeError::decode(self.exchange, format!("invalid {} '{}': {}", field, raw, e))
        })
    }

    fn map_transport_error(&self, err: TransportError) -> ExchangeError {
        if let TransportError::Status { body, .. } = &err {
            if let Some(message) = (self.upstream_error)(body.as_bytes()) {
                return ExchangeError::Upstream {
                    exchange: self.exchange,
                    message,
                };
            }
        }
        ExchangeError::Transport {
            exchange: self.exchange,
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_utils::MockTransport;
    use serde::Deserialize;

    fn extract(body: &[u8]) -> Option<String> {
        let value: serde_json::Value = serde_json::from_slice(body).ok()?;
        value.get("message")?.as_str().map(str::to_string)
    }

    fn client(mock: &Arc<MockTransport>) -> BackendClient {
        BackendClient::new("test", "https://api.test/", mock.clone(), false, extract)
    }

    #[derive(Debug, Deserialize)]
    struct Payload {
        value: f64,
    }

    #[tokio::test]
    async fn test_get_passes_debug_flag_and_path() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(r#"{"value": 1.5}"#);
        let client = client(&mock);
        client.set_debug(true);

        let bytes = client.get("pairs/btc?x=1").await.unwrap();
        let payload: Payload = client.decode(&bytes).unwrap();
        assert_eq!(payload.value, 1.5);

        let sent = mock.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url(), "https://api.test/pairs/btc?x=1");
        assert!(sent[0].debug);
        assert_eq!(sent[0].method, HttpMethod::Get);
    }

    #[tokio::test]
    async fn test_status_with_structured_body_becomes_upstream() {
        let mock = Arc::new(MockTransport::new());
        mock.push_error(TransportError::Status {
            status: 400,
            body: r#"{"message":"pair is inactive"}"#.to_string(),
        });
        let err = client(&mock).get("x").await.unwrap_err();
        match err {
            ExchangeError::Upstream { exchange, message } => {
                assert_eq!(exchange, "test");
                assert_eq!(message, "pair is inactive");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_plain_transport_failure() {
        let mock = Arc::new(MockTransport::new());
        mock.push_error(TransportError::Timeout);
        let err = client(&mock).get("x").await.unwrap_err();
        assert!(matches!(err, ExchangeError::Transport { exchange: "test", .. }));
    }

    #[test]
    fn test_decode_error_includes_body() {
        let mock = Arc::new(MockTransport::new());
        let err = client(&mock).decode::<Payload>(b"not json").unwrap_err();
        assert!(matches!(err, ExchangeError::Decode { .. }));
        assert!(err.to_string().contains("not json"));
    }

    #[test]
    fn test_parse_number() {
        let mock = Arc::new(MockTransport::new());
        let client = client(&mock);
        assert_eq!(client.parse_number("min", " 0.0021 ").unwrap(), 0.0021);
        assert!(client.parse_number("min", "abc").is_err());
    }

    #[tokio::test]
    async fn test_post_signed_json_marks_request() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json("{}");
        client(&mock)
            .post_signed_json("", "{}".to_string(), vec![("sign".to_string(), "abc".to_string())])
            .await
            .unwrap();
        let sent = mock.requests();
        assert!(sent[0].signed);
        assert_eq!(sent[0].headers, vec![("sign".to_string(), "abc".to_string())]);
        assert_eq!(sent[0].body, Some(RequestBody::Json("{}".to_string())));
    }

    #[tokio::test]
    async fn test_post_form_sets_body() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json("{}");
        client(&mock)
            .post_form("getPrice", "a=1&b=2".to_string())
            .await
            .unwrap();
        let sent = mock.requests();
        assert_eq!(sent[0].body, Some(RequestBody::Form("a=1&b=2".to_string())));
        assert!(!sent[0].signed);
    }
}
