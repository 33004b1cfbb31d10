//! FixedFloat Exchange Adapter
//!
//! - `types` - `{code, msg, data}` envelope and data payloads
//! - `adapter` - Main FixedFloatAdapter implementation

mod adapter;
mod types;

pub use adapter::{canonical_status, FixedFloatAdapter, FIXEDFLOAT_API_BASE, STATUS_TABLE};

use crate::adapters::registry::Registry;
use crate::adapters::traits::ExchangeAdapter;

/// Register the `fixedfloat` backend
pub fn register(registry: &Registry) {
    registry.register(adapter::EXCHANGE_NAME, |config| {
        Ok(Box::new(FixedFloatAdapter::new(config)?) as Box<dyn ExchangeAdapter>)
    });
}
