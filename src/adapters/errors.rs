//! Exchange adapter error types
//!
//! Every failure an adapter can return is an `ExchangeError`. Each variant
//! carries the backend name so a caller aggregating several backends can
//! attribute the failure from the message alone.

use thiserror::Error;

use crate::adapters::transport::TransportError;

/// Exchange-specific error types for adapter operations
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// Registry lookup miss
    #[error("unknown exchange backend '{name}' (supported: {supported})")]
    UnknownBackend { name: String, supported: String },

    /// Required API key / secret (or per-order token) absent
    #[error("{exchange}: missing credential: {credential}")]
    MissingCredential {
        exchange: &'static str,
        credential: &'static str,
    },

    /// Zero or otherwise out-of-range amount, rejected before any network call
    #[error("{exchange}: invalid amount: {reason}")]
    InvalidAmount {
        exchange: &'static str,
        reason: String,
    },

    /// Operation has no equivalent on this backend
    #[error("{exchange}: {operation} not available for this exchange")]
    CapabilityNotSupported {
        exchange: &'static str,
        operation: &'static str,
    },

    /// Backend answered with a structured error payload
    #[error("{exchange}: upstream error: {message}")]
    Upstream {
        exchange: &'static str,
        message: String,
    },

    /// The transport failed (network, timeout, HTTP status)
    #[error("{exchange}: transport error: {source}")]
    Transport {
        exchange: &'static str,
        #[source]
        source: TransportError,
    },

    /// Response bytes did not match the expected shape
    #[error("{exchange}: decode error: {reason}")]
    Decode {
        exchange: &'static str,
        reason: String,
    },

    /// Id not present in a list-style lookup response
    #[error("{exchange}: order {order_id} could not be found")]
    OrderNotFound {
        exchange: &'static str,
        order_id: String,
    },

    /// Estimate cannot produce a usable rate (zero or non-finite)
    #[error("{exchange}: invalid quote: {reason}")]
    InvalidQuote {
        exchange: &'static str,
        reason: String,
    },
}

impl ExchangeError {
    /// Backend identity the error is attributed to (`None` for registry misses)
    pub fn exchange(&self) -> Option<&'static str> {
        match self {
            ExchangeError::UnknownBackend { .. } => None,
            ExchangeError::MissingCredential { exchange, .. }
            | ExchangeError::InvalidAmount { exchange, .. }
            | ExchangeError::CapabilityNotSupported { exchange, .. }
            | ExchangeError::Upstream { exchange, .. }
            | ExchangeError::Transport { exchange, .. }
            | ExchangeError::Decode { exchange, .. }
            | ExchangeError::OrderNotFound { exchange, .. }
            | ExchangeError::InvalidQuote { exchange, .. } => Some(exchange),
        }
    }

    /// True when the operation is simply not offered by the backend
    pub fn is_not_supported(&self) -> bool {
        matches!(self, ExchangeError::CapabilityNotSupported { .. })
    }

    pub(crate) fn not_supported(exchange: &'static str, operation: &'static str) -> Self {
        ExchangeError::CapabilityNotSupported { exchange, operation }
    }

    pub(crate) fn decode(exchange: &'static str, reason: impl std::fmt::Display) -> Self {
        ExchangeError::Decode {
            exchange,
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for exchange operations
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;
