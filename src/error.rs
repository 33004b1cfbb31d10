//! Application-wide error types using thiserror
//!
//! Adapter failures stay `ExchangeError`; `AppError` wraps them together
//! with configuration and I/O failures for the loader and the binary.

use thiserror::Error;
use crate::adapters::errors::ExchangeError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_error_conversion() {
        let err: AppError = ExchangeError::not_supported("stealthex", "cancel_order").into();
        assert_eq!(
            err.to_string(),
            "Exchange error: stealthex: cancel_order not available for this exchange"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = AppError::Config("missing exchanges".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing exchanges");
    }
}
