//! Configuration module for backend settings and YAML loading
//!
//! This module provides:
//! - Configuration types (`ExchangeConfig`, `AppConfig`)
//! - YAML loading functionality (`load_config`)
//! - Logging setup (`logging::init_logging`)

mod loader;
pub mod logging;
mod types;

// Re-export types
pub use types::{AppConfig, ExchangeConfig};

// Re-export loader functions
pub use loader::{load_config, load_config_from_str};
