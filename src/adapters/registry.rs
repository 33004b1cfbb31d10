//! Exchange registry for dynamic backend selection
//!
//! Maps a backend name to a constructor closure. Backends register once at
//! startup (see [`Registry::with_builtin`]); callers resolve a name plus an
//! [`ExchangeConfig`] into a live `Box<dyn ExchangeAdapter>` at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::traits::ExchangeAdapter;
use crate::adapters::{changelly, changenow, fixedfloat, stealthex};
use crate::config::ExchangeConfig;

/// Backend constructor. Construction-time failures (e.g. a missing API key)
/// are returned to the resolving caller unchanged.
pub type Constructor =
    Arc<dyn Fn(ExchangeConfig) -> ExchangeResult<Box<dyn ExchangeAdapter>> + Send + Sync>;

/// Thread-safe name → constructor table
#[derive(Default)]
pub struct Registry {
    entries: RwLock<HashMap<String, Constructor>>,
}

impl Registry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every backend shipped in this crate
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        changenow::register(&registry);
        changelly::register(&registry);
        fixedfloat::register(&registry);
        stealthex::register(&registry);
        registry
    }

    /// Store `constructor` under `name`. Re-registering a name replaces the
    /// previous constructor.
    pub fn register<F>(&self, name: &str, constructor: F)
    where
        F: Fn(ExchangeConfig) -> ExchangeResult<Box<dyn ExchangeAdapter>> + Send + Sync + 'static,
    {
        let previous = self
            .entries
            .write()
            .insert(name.to_string(), Arc::new(constructor));
        if previous.is_some() {
            tracing::debug!(exchange = name, "Replaced registered backend constructor");
        }
    }

    /// Build the backend registered under `name`
    pub fn resolve(&self, name: &str, config: ExchangeConfig) -> ExchangeResult<Box<dyn ExchangeAdapter>> {
        // Clone the constructor out so the lock is not held while it runs
        let constructor = self.entries.read().get(name).cloned();
        match constructor {
            Some(constructor) => {
                let adapter = constructor(config)?;
                tracing::debug!(exchange = name, "Resolved exchange backend");
                Ok(adapter)
            }
            None => Err(ExchangeError::UnknownBackend {
                name: name.to_string(),
                supported: self.names().join(", "),
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("names", &self.names()).finish()
    }
}
