//! Shared test utilities for adapter testing
//!
//! Provides `MockTransport`, a scripted [`HttpTransport`] that replays
//! canned responses in order and records every request it receives, and
//! `LogCapture`, which collects formatted tracing output for assertions.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::adapters::transport::{HttpTransport, TransportError, TransportRequest};

/// Scripted transport: responses are served FIFO, requests are recorded
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Vec<u8>, TransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor returning the mock already wrapped for injection
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Queue a successful response body
    pub fn push_json(&self, body: &str) {
        self.responses.lock().push_back(Ok(body.as_bytes().to_vec()));
    }

    /// Queue a transport failure
    pub fn push_error(&self, err: TransportError) {
        self.responses.lock().push_back(Err(err));
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: TransportRequest) -> Result<Vec<u8>, TransportError> {
        let path = request.path.clone();
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request(format!("no canned response for {}", path))))
    }
}

/// In-memory tracing sink
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route DEBUG and above on the current thread into this capture until
    /// the returned guard is dropped
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Everything logged so far
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
