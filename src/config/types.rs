//! Configuration types
//!
//! `ExchangeConfig` is the per-backend settings value handed to the
//! registry; `AppConfig` is the YAML document listing the configured
//! backends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ============================================================================
// Per-backend configuration
// ============================================================================

/// Settings for one exchange backend.
///
/// Passed by value into the backend constructor; the adapter keeps its own
/// copy and only ever changes the debug flag afterwards.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// API key (required by most backends)
    pub api_key: String,
    /// API secret, only for backends that HMAC-sign requests
    pub api_secret: Option<String>,
    /// Dump HTTP requests/responses through tracing
    pub debug: bool,
    /// Override of the backend's production endpoint (sandbox, tests)
    pub base_url: Option<String>,
}

impl ExchangeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.api_secret = Some(secret.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Create configuration from `<NAME>_API_KEY`, `<NAME>_API_SECRET`,
    /// `<NAME>_DEBUG` and `<NAME>_BASE_URL`
    pub fn from_env(name: &str) -> Self {
        let prefix = name.to_uppercase();
        let var = |suffix: &str| {
            std::env::var(format!("{}_{}", prefix, suffix))
                .ok()
                .filter(|v| !v.is_empty())
        };

        Self {
            api_key: var("API_KEY").unwrap_or_default(),
            api_secret: var("API_SECRET"),
            debug: var("DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            base_url: var("BASE_URL"),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// API secret if present and non-empty
    pub fn secret(&self) -> Option<&str> {
        self.api_secret.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// `base_url` override, or the backend's default endpoint
    pub fn base_url_or(&self, default: &str) -> String {
        match &self.base_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => default.to_string(),
        }
    }

    /// Fill blank fields from the environment, keeping explicit values
    pub fn merge_env(&mut self, name: &str) {
        let env = Self::from_env(name);
        if !self.has_api_key() {
            self.api_key = env.api_key;
        }
        if self.secret().is_none() {
            self.api_secret = env.api_secret;
        }
        if self.base_url.is_none() {
            self.base_url = env.base_url;
        }
        self.debug = self.debug || env.debug;
    }
}

impl std::fmt::Debug for ExchangeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |present: bool| if present { "<redacted>" } else { "<unset>" };
        f.debug_struct("ExchangeConfig")
            .field("api_key", &redact(self.has_api_key()))
            .field("api_secret", &redact(self.secret().is_some()))
            .field("debug", &self.debug)
            .field("base_url", &self.base_url)
            .finish()
    }
}

// ============================================================================
// Root configuration
// ============================================================================

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend name → settings
    #[serde(default)]
    pub exchanges: BTreeMap<String, ExchangeConfig>,
}

impl AppConfig {
    /// Validate all configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        // Rule: At least one exchange must be configured
        if self.exchanges.is_empty() {
            return Err(AppError::Config(
                "Configuration must contain at least one exchange".to_string(),
            ));
        }

        for (name, exchange) in &self.exchanges {
            // Rule: names are lowercase registry keys
            if name.trim().is_empty() {
                return Err(AppError::Config("Exchange name cannot be empty".to_string()));
            }
            if name != &name.to_lowercase() {
                return Err(AppError::Config(format!(
                    "Exchange '{}': name must be lowercase",
                    name
                )));
            }

            // Rule: base URL overrides are joined with relative paths
            if let Some(url) = &exchange.base_url {
                if !url.ends_with('/') {
                    return Err(AppError::Config(format!(
                        "Exchange '{}': base_url must end with '/' (got {})",
                        name, url
                    )));
                }
            }
        }

        Ok(())
    }

    /// Settings for `name`, if configured
    pub fn exchange(&self, name: &str) -> Option<&ExchangeConfig> {
        self.exchanges.get(name)
    }

    /// Fill blank credentials of every configured exchange from the environment
    pub fn apply_env_overrides(&mut self) {
        for (name, exchange) in self.exchanges.iter_mut() {
            exchange.merge_env(name);
        }
    }
}
