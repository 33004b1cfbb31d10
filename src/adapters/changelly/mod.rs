//! Changelly Exchange Adapter
//!
//! JSON-RPC backend with adapter-side HMAC-SHA512 signing.
//!
//! - `types` - JSON-RPC envelopes and result payloads
//! - `adapter` - Main ChangellyAdapter implementation

mod adapter;
mod types;

pub use adapter::{canonical_status, ChangellyAdapter, CHANGELLY_API_BASE, STATUS_TABLE};

use crate::adapters::registry::Registry;
use crate::adapters::traits::ExchangeAdapter;

/// Register the `changelly` backend
pub fn register(registry: &Registry) {
    registry.register(adapter::EXCHANGE_NAME, |config| {
        Ok(Box::new(ChangellyAdapter::new(config)?) as Box<dyn ExchangeAdapter>)
    });
}
