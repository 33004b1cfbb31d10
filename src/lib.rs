//! swapdesk - instant-swap exchange adapters
//!
//! One uniform, async contract over heterogeneous swap backends:
//! - `adapters` - contract, registry, status canonicalization, backends
//! - `config` - per-backend settings, YAML loading, logging
//! - `error` - application-level error type

pub mod adapters;
pub mod config;
pub mod error;

pub use error::AppError;
