//! Exchange adapter trait definition
//!
//! The ExchangeAdapter trait is the uniform contract every backend
//! satisfies. Operations a backend has no endpoint for are still
//! implemented and fail with `ExchangeError::CapabilityNotSupported`.

use async_trait::async_trait;

use crate::adapters::errors::ExchangeResult;
use crate::adapters::rate::paced_rate_info;
use crate::adapters::types::{
    ActiveCurrency, CreateOrder, CreateResultInfo, EstimateAmount, ExchangeRateInfo,
    ExchangeRateRequest, OrderInfoResult, QueryLimits, QueryRate, UpdateOrder,
    UpdateOrderResultInfo,
};

/// Common trait for all exchange adapters
///
/// Adapters hold no mutable state besides the debug flag, so every method
/// takes `&self` and one instance can serve concurrent callers.
///
/// # Example Implementation
///
/// ```ignore
/// #[async_trait]
/// impl ExchangeAdapter for MyBackend {
///     fn exchange_name(&self) -> &'static str { "mybackend" }
///
///     async fn query_rates(&self) -> ExchangeResult<Vec<QueryRate>> {
///         Err(ExchangeError::not_supported(self.exchange_name(), "query_rates"))
///     }
///     // ... other methods
/// }
/// ```
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    /// Registry name of the backend ("changenow", "changelly", ...)
    fn exchange_name(&self) -> &'static str;

    /// Toggle request/response dumping in the transport
    fn set_debug(&self, enabled: bool);

    /// Current state of the debug flag
    fn is_debug(&self) -> bool;

    /// Limits, a one second pause, then the estimate; the rate is
    /// `request.amount / estimate.estimated_amount`.
    ///
    /// Sub-call failures propagate unchanged.
    async fn get_exchange_rate_info(
        &self,
        request: &ExchangeRateRequest,
    ) -> ExchangeResult<ExchangeRateInfo> {
        paced_rate_info(self, request).await
    }

    /// Single-shot quote for a pair and amount
    async fn estimate_amount(&self, request: &ExchangeRateRequest) -> ExchangeResult<EstimateAmount>;

    /// Minimum / maximum tradable amount for a pair
    async fn query_limits(&self, from: &str, to: &str) -> ExchangeResult<QueryLimits>;

    /// Backend-wide rate listing
    async fn query_rates(&self) -> ExchangeResult<Vec<QueryRate>>;

    /// Currencies currently tradable on the backend
    async fn query_active_currencies(&self) -> ExchangeResult<Vec<ActiveCurrency>>;

    /// Submit a swap order
    ///
    /// Fails with `InvalidAmount` for a zero amount before any network call.
    async fn create_order(&self, order: &CreateOrder) -> ExchangeResult<CreateResultInfo>;

    /// Amend an existing order
    async fn update_order(&self, update: &UpdateOrder) -> ExchangeResult<UpdateOrderResultInfo>;

    /// Cancel an existing order
    async fn cancel_order(&self, order_id: &str) -> ExchangeResult<String>;

    /// Fetch the current status of an order, canonicalized.
    ///
    /// `extra` carries backend-specific lookup arguments (e.g. an order token).
    async fn order_info(&self, order_id: &str, extra: &[String]) -> ExchangeResult<OrderInfoResult>;
}
