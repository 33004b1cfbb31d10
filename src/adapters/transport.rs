//! Transport port
//!
//! Adapters never talk HTTP directly. They describe one exchange as a
//! [`TransportRequest`] and hand it to an [`HttpTransport`], which returns
//! the raw response bytes. [`ReqwestTransport`] is the production
//! implementation; tests inject `MockTransport` instead.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::adapters::shared::signing::RequestSigner;
use crate::config::logging::redact_secrets;

// =============================================================================
// HTTP Client Constants
// =============================================================================

/// HTTP request timeout (seconds)
const HTTP_TIMEOUT_SECS: u64 = 30;
/// HTTP connection timeout (milliseconds)
const HTTP_CONNECT_TIMEOUT_MS: u64 = 5000;
/// Max idle connections per host in connection pool
const HTTP_POOL_MAX_IDLE: usize = 4;
/// How long idle connections stay in the pool (seconds)
const HTTP_POOL_IDLE_TIMEOUT_SECS: u64 = 60;
/// Truncation length for debug dumps of bodies
const DEBUG_DUMP_MAX_CHARS: usize = 2000;

// =============================================================================
// Request / Error Types
// =============================================================================

/// HTTP verb used by a backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// Encoded request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// `application/json`
    Json(String),
    /// `application/x-www-form-urlencoded`
    Form(String),
}

impl RequestBody {
    pub fn as_str(&self) -> &str {
        match self {
            RequestBody::Json(s) | RequestBody::Form(s) => s,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            RequestBody::Json(_) => "application/json",
            RequestBody::Form(_) => "application/x-www-form-urlencoded",
        }
    }
}

/// One HTTP exchange as described by an adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    /// Backend base URL, ending with `/`
    pub base_url: String,
    /// Path relative to `base_url`, query string included
    pub path: String,
    pub body: Option<RequestBody>,
    /// Extra headers (e.g. signatures applied by the adapter itself)
    pub headers: Vec<(String, String)>,
    /// The adapter already signed this request; the transport must not sign it again
    pub signed: bool,
    /// Dump request and response through tracing
    pub debug: bool,
    /// Values masked wherever the request is logged (e.g. an API key in the path)
    pub redact: Vec<String>,
}

impl TransportRequest {
    pub fn new(method: HttpMethod, base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            base_url: base_url.into(),
            path: path.into(),
            body: None,
            headers: Vec::new(),
            signed: false,
            debug: false,
            redact: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Mask `secret` in every log line describing this request
    pub fn with_redacted(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if !secret.is_empty() && !self.redact.contains(&secret) {
            self.redact.push(secret);
        }
        self
    }

    /// Full request URL
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    /// `text` with this request's secrets masked
    pub fn sanitized(&self, text: &str) -> String {
        redact_secrets(text, &self.redact)
    }

    /// Body text, empty for bodiless requests
    pub fn body_str(&self) -> &str {
        self.body.as_ref().map(RequestBody::as_str).unwrap_or("")
    }
}

/// Failure of the transport itself, before any backend payload is decoded
#[derive(Error, Debug)]
pub enum TransportError {
    /// Request could not be sent or the response could not be read
    #[error("request failed: {0}")]
    Request(String),

    /// The request timed out
    #[error("request timed out")]
    Timeout,

    /// Non-success HTTP status; body kept for upstream error extraction
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The injected signing hook failed
    #[error("signing failed: {0}")]
    Signing(String),
}

/// The port every adapter uses to perform one HTTP exchange
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute the request and return the raw response body
    async fn execute(&self, request: TransportRequest) -> Result<Vec<u8>, TransportError>;
}

// =============================================================================
// ReqwestTransport
// =============================================================================

/// Create the pooled HTTP client shared by one backend's requests
pub fn create_http_client(exchange_name: &str) -> reqwest::Client {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_millis(HTTP_CONNECT_TIMEOUT_MS))
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE)
        .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
    tracing::debug!(
        phase = "init",
        exchange = %exchange_name,
        timeout_s = HTTP_TIMEOUT_SECS,
        connect_timeout_ms = HTTP_CONNECT_TIMEOUT_MS,
        "HTTP client configured"
    );
    client
}

/// Production transport backed by `reqwest`
pub struct ReqwestTransport {
    exchange: &'static str,
    client: reqwest::Client,
    signer: Option<Arc<dyn RequestSigner>>,
}

impl ReqwestTransport {
    pub fn new(exchange: &'static str) -> Self {
        Self {
            exchange,
            client: create_http_client(exchange),
            signer: None,
        }
    }

    /// Install a signing hook applied to every request not already signed by the adapter
    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    fn truncated(text: &str) -> String {
        text.chars().take(DEBUG_DUMP_MAX_CHARS).collect()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<Vec<u8>, TransportError> {
        let url = request.url();

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if !request.signed {
            if let Some(signer) = &self.signer {
                for (name, value) in signer.sign(request.body_str())? {
                    builder = builder.header(name, value);
                }
            }
        }

        if let Some(body) = &request.body {
            builder = builder
                .header("Content-Type", body.content_type())
                .body(body.as_str().to_string());
        }

        if request.debug {
            tracing::info!(
                exchange = self.exchange,
                method = %request.method,
                url = %request.sanitized(&url),
                body = %request.sanitized(&Self::truncated(request.body_str())),
                "HTTP request"
            );
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(format!("failed to read response: {}", e)))?;

        if request.debug {
            tracing::info!(
                exchange = self.exchange,
                status = status.as_u16(),
                body = %request.sanitized(&Self::truncated(&String::from_utf8_lossy(&bytes))),
                "HTTP response"
            );
        }

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(bytes.to_vec())
    }
}
