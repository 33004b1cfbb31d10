//! Canonical data types shared by all exchange adapters
//!
//! These are the only shapes a caller should depend on. Raw backend
//! payloads are decoded into private DTOs inside each backend module and
//! normalized into these types before they leave the adapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::status::OrderStatus;

// =============================================================================
// Quotes
// =============================================================================

/// Quote request for a currency pair and an input amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateRequest {
    /// Currency the caller sends (e.g. "btc")
    pub from: String,
    /// Currency the caller receives (e.g. "ltc")
    pub to: String,
    /// Amount of `from` to exchange
    pub amount: f64,
}

impl ExchangeRateRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }
}

/// Derived quote: limits plus the rate implied by the estimate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateInfo {
    /// `requested amount / estimated amount`
    pub exchange_rate: f64,
    pub min: f64,
    /// Zero when the backend cannot report a maximum
    pub max: f64,
    pub estimated_amount: f64,
}

/// Single-shot estimate. Fields a backend does not report stay zero/empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimateAmount {
    pub estimated_amount: f64,
    pub network_fee: f64,
    pub service_commission: f64,
    pub transaction_speed_forecast: String,
    pub warning_message: String,
}

/// Tradable range for a pair. A backend that cannot report `max` leaves it zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryLimits {
    pub min: f64,
    pub max: f64,
}

/// One entry of a backend-wide rate listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRate {
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub min: f64,
    pub max: f64,
    pub miner_fee: f64,
}

/// Kind of an active currency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyType {
    #[default]
    Crypto,
    Fiat,
}

/// Currency currently tradable on a backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCurrency {
    /// Ticker as used by the backend (e.g. "btc")
    pub name: String,
    pub currency_type: CurrencyType,
}

// =============================================================================
// Orders
// =============================================================================

/// Swap order submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub from_currency: String,
    pub to_currency: String,
    /// Amount of `from_currency` the caller will deposit; must be > 0
    pub invoiced_amount: f64,
    /// Payout address for `to_currency`
    pub destination_address: String,
    /// Memo / destination tag for the payout address
    pub extra_id: Option<String>,
    pub refund_address: Option<String>,
    pub refund_extra_id: Option<String>,
}

impl CreateOrder {
    /// Reject zero, negative and non-finite amounts before any network call
    pub fn validate_amount(&self, exchange: &'static str) -> ExchangeResult<()> {
        if self.invoiced_amount == 0.0 {
            return Err(ExchangeError::InvalidAmount {
                exchange,
                reason: "invoiced amount is 0".to_string(),
            });
        }
        if !self.invoiced_amount.is_finite() || self.invoiced_amount < 0.0 {
            return Err(ExchangeError::InvalidAmount {
                exchange,
                reason: format!("invoiced amount must be positive (got {})", self.invoiced_amount),
            });
        }
        Ok(())
    }
}

/// Identity and deposit instructions of a freshly created order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateResultInfo {
    pub uuid: String,
    pub from_currency: String,
    pub to_currency: String,
    /// Where the caller sends `from_currency`
    pub deposit_address: String,
    pub destination_address: String,
    pub charged_fee: f64,
    /// Memo / tag required on the deposit
    pub extra_id: Option<String>,
    /// Memo / tag applied to the payout
    pub payout_extra_id: Option<String>,
    /// Per-order access token, for backends that require one to query the order
    pub token: Option<String>,
}

/// Order amendment request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateOrder {
    pub order_id: String,
    pub destination_address: Option<String>,
    pub refund_address: Option<String>,
}

/// Result of an order amendment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateOrderResultInfo {
    pub order_id: String,
    pub native_status: String,
    pub status: OrderStatus,
}

/// Point-in-time snapshot of an order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderInfoResult {
    /// Amount the caller receives (expected until the order completes, where the backend distinguishes)
    pub receive_amount: f64,
    pub confirmations: Option<u64>,
    pub tx_id: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
    /// Status token exactly as the backend reported it
    pub native_status: String,
    pub status: OrderStatus,
}

// =============================================================================
// Helpers
// =============================================================================

/// Format an amount the way backends expect it (8 decimals)
pub fn format_amount(amount: f64) -> String {
    format!("{:.8}", amount)
}

/// Percent-encode one URL path segment (order ids, tickers)
pub(crate) fn path_segment(raw: &str) -> String {
    // form encoding writes spaces as '+' and encodes a literal '+' as %2B
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Non-empty optional string, for wire fields where "" means absent
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// RFC 3339 timestamp, `None` when absent or malformed
pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
