//! StealthEX Exchange Adapter
//!
//! - `types` - API request/response payloads
//! - `adapter` - Main StealthExAdapter implementation

mod adapter;
mod types;

pub use adapter::{canonical_status, StealthExAdapter, STATUS_TABLE, STEALTHEX_API_BASE};

use crate::adapters::registry::Registry;
use crate::adapters::traits::ExchangeAdapter;

/// Register the `stealthex` backend
pub fn register(registry: &Registry) {
    registry.register(adapter::EXCHANGE_NAME, |config| {
        Ok(Box::new(StealthExAdapter::new(config)?) as Box<dyn ExchangeAdapter>)
    });
}
