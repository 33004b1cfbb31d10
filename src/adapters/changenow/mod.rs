//! ChangeNOW Exchange Adapter
//!
//! This module is organized into submodules:
//! - `types` - API request/response payloads
//! - `adapter` - Main ChangeNowAdapter implementation

mod adapter;
mod types;

pub use adapter::{canonical_status, ChangeNowAdapter, CHANGENOW_API_BASE, STATUS_TABLE};

use crate::adapters::registry::Registry;
use crate::adapters::traits::ExchangeAdapter;

/// Register the `changenow` backend
pub fn register(registry: &Registry) {
    registry.register(adapter::EXCHANGE_NAME, |config| {
        Ok(Box::new(ChangeNowAdapter::new(config)?) as Box<dyn ExchangeAdapter>)
    });
}
