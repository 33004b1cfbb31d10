//! Exchange adapters for ChangeNOW, Changelly, FixedFloat, StealthEX
//!
//! This module provides the uniform swap contract (`ExchangeAdapter`),
//! the runtime `Registry`, canonical order statuses, the paced rate
//! protocol and the HTTP transport port the backends talk through.

pub mod errors;
pub mod rate;
pub mod registry;
pub mod shared;
pub mod status;
pub mod traits;
pub mod transport;
pub mod types;

pub mod changelly;
pub mod changenow;
pub mod fixedfloat;
pub mod stealthex;

#[cfg(any(test, feature = "testkit"))]
pub mod test_utils;

// Re-export commonly used types for convenience
pub use errors::{ExchangeError, ExchangeResult};
pub use registry::{Constructor, Registry};
pub use status::OrderStatus;
pub use traits::ExchangeAdapter;
pub use transport::{HttpMethod, HttpTransport, ReqwestTransport, TransportError, TransportRequest};
pub use types::{
    ActiveCurrency, CreateOrder, CreateResultInfo, CurrencyType, EstimateAmount,
    ExchangeRateInfo, ExchangeRateRequest, OrderInfoResult, QueryLimits, QueryRate, UpdateOrder,
    UpdateOrderResultInfo,
};

pub use changelly::ChangellyAdapter;
pub use changenow::ChangeNowAdapter;
pub use fixedfloat::FixedFloatAdapter;
pub use stealthex::StealthExAdapter;
