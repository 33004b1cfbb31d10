//! FixedFloat Adapter Implementation
//!
//! Form-encoded POST API. Requests are signed by the transport hook
//! (`X-API-KEY` + HMAC-SHA256 of the body in `X-API-SIGN`), so key and
//! secret are both required at construction. Orders are looked up with
//! the per-order token returned at creation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::shared::wire::truthy;
use crate::adapters::shared::{BackendClient, HmacSha256Signer};
use crate::adapters::status::{canonicalize, OrderStatus, StatusTable};
use crate::adapters::traits::ExchangeAdapter;
use crate::adapters::transport::{HttpTransport, ReqwestTransport};
use crate::adapters::types::{
    format_amount, non_empty, ActiveCurrency, CreateOrder, CreateResultInfo, CurrencyType,
    EstimateAmount, ExchangeRateRequest, OrderInfoResult, QueryLimits, QueryRate, UpdateOrder,
    UpdateOrderResultInfo,
};
use crate::config::ExchangeConfig;

use super::types::{FfCurrency, FfEnvelope, FfOrder, FfOrderState, FfPrice};

// =============================================================================
// Constants
// =============================================================================

pub const FIXEDFLOAT_API_BASE: &str = "https://fixedfloat.com/api/v1/";

pub(crate) const EXCHANGE_NAME: &str = "fixedfloat";

/// Rate type requested for every quote and order
const RATE_TYPE: &str = "fixed";

/// Covers both the current status words and the legacy uppercase ones
/// (NEW, PENDING, EXCHANGE, WITHDRAW, DONE, EXPIRED, EMERGENCY).
pub const STATUS_TABLE: StatusTable = &[
    ("new", OrderStatus::New),
    ("wait", OrderStatus::WaitingForDeposit),
    ("confirmation", OrderStatus::DepositReceived),
    ("confirmed", OrderStatus::DepositReceived),
    ("pending", OrderStatus::DepositReceived),
    ("exchanging", OrderStatus::Exchanging),
    ("exchange", OrderStatus::Exchanging),
    ("sending", OrderStatus::Sending),
    ("sending_confirmation", OrderStatus::Sending),
    ("withdraw", OrderStatus::Sending),
    ("success", OrderStatus::Completed),
    ("done", OrderStatus::Completed),
    ("overdue", OrderStatus::Expired),
    ("expired", OrderStatus::Expired),
    ("error", OrderStatus::Failed),
    ("emergency", OrderStatus::Failed),
    ("refunded", OrderStatus::Refunded),
];

pub fn canonical_status(native: &str) -> OrderStatus {
    canonicalize(STATUS_TABLE, native)
}

fn upstream_error(body: &[u8]) -> Option<String> {
    let envelope: FfEnvelope = serde_json::from_slice(body).ok()?;
    (envelope.code != 0).then(|| format!("{} (code {})", envelope.msg, envelope.code))
}

fn required_credentials(config: &ExchangeConfig) -> ExchangeResult<(String, String)> {
    if !config.has_api_key() {
        return Err(ExchangeError::MissingCredential {
            exchange: EXCHANGE_NAME,
            credential: "api key",
        });
    }
    let secret = config.secret().ok_or(ExchangeError::MissingCredential {
        exchange: EXCHANGE_NAME,
        credential: "api secret",
    })?;
    Ok((config.api_key.clone(), secret.to_string()))
}

// =============================================================================
// FixedFloatAdapter
// =============================================================================

pub struct FixedFloatAdapter {
    client: BackendClient,
}

impl FixedFloatAdapter {
    /// Create an adapter whose transport signs every request
    pub fn new(config: ExchangeConfig) -> ExchangeResult<Self> {
        let (api_key, secret) = required_credentials(&config)?;
        let transport = ReqwestTransport::new(EXCHANGE_NAME)
            .with_signer(Arc::new(HmacSha256Signer::new(api_key, secret)));
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create an adapter over an injected transport. The transport is
    /// expected to apply the request signature itself.
    pub fn with_transport(config: ExchangeConfig, transport: Arc<dyn HttpTransport>) -> ExchangeResult<Self> {
        required_credentials(&config)?;
        let client = BackendClient::new(
            EXCHANGE_NAME,
            config.base_url_or(FIXEDFLOAT_API_BASE),
            transport,
            config.debug,
            upstream_error,
        );
        Ok(Self { client })
    }

    /// POST a form and unwrap the `{code, msg, data}` envelope
    async fn call(&self, method: &str, form: &[(&str, String)]) -> ExchangeResult<Value> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();

        let bytes = self.client.post_form(method, body).await?;
        let envelope: FfEnvelope = self.client.decode(&bytes)?;
        if envelope.code != 0 {
            return Err(ExchangeError::Upstream {
                exchange: EXCHANGE_NAME,
                message: format!("{} (code {})", envelope.msg, envelope.code),
            });
        }
        envelope
            .data
            .ok_or_else(|| ExchangeError::decode(EXCHANGE_NAME, format!("{} returned no data", method)))
    }

    fn data_as<T: DeserializeOwned>(&self, method: &str, data: Value) -> ExchangeResult<T> {
        serde_json::from_value(data)
            .map_err(|e| ExchangeError::decode(EXCHANGE_NAME, format!("{} data: {}", method, e)))
    }

    async fn price(&self, from: &str, to: &str, amount: Option<f64>) -> ExchangeResult<FfPrice> {
        let mut form = vec![
            ("fromCurrency", from.to_uppercase()),
            ("toCurrency", to.to_uppercase()),
            ("type", RATE_TYPE.to_string()),
        ];
        if let Some(amount) = amount {
            form.push(("fromQty", format_amount(amount)));
        }
        let data = self.call("getPrice", &form).await?;
        self.data_as("getPrice", data)
    }
}

#[async_trait]
impl ExchangeAdapter for FixedFloatAdapter {
    fn exchange_name(&self) -> &'static str {
        EXCHANGE_NAME
    }

    fn set_debug(&self, enabled: bool) {
        self.client.set_debug(enabled);
    }

    fn is_debug(&self) -> bool {
        self.client.is_debug()
    }

    async fn estimate_amount(&self, request: &ExchangeRateRequest) -> ExchangeResult<EstimateAmount> {
        let price = self
            .price(&request.from, &request.to, Some(request.amount))
            .await?;
        let estimated_amount = price
            .to
            .amount
            .and_then(|a| a.as_f64())
            .ok_or_else(|| ExchangeError::decode(EXCHANGE_NAME, "getPrice data has no to.amount"))?;

        Ok(EstimateAmount {
            estimated_amount,
            ..Default::default()
        })
    }

    async fn query_limits(&self, from: &str, to: &str) -> ExchangeResult<QueryLimits> {
        let price = self.price(from, to, None).await?;
        Ok(QueryLimits {
            min: price.from.min.and_then(|m| m.as_f64()).unwrap_or_default(),
            max: price.from.max.and_then(|m| m.as_f64()).unwrap_or_default(),
        })
    }

    async fn query_rates(&self) -> ExchangeResult<Vec<QueryRate>> {
        Err(ExchangeError::not_supported(EXCHANGE_NAME, "query_rates"))
    }

    async fn query_active_currencies(&self) -> ExchangeResult<Vec<ActiveCurrency>> {
        let data = self.call("getCurrencies", &[]).await?;
        let currencies: Vec<FfCurrency> = self.data_as("getCurrencies", data)?;

        Ok(currencies
            .into_iter()
            .filter(|c| truthy(&c.send) || truthy(&c.recv))
            .map(|c| ActiveCurrency {
                name: c.currency.to_lowercase(),
                currency_type: CurrencyType::Crypto,
            })
            .collect())
    }

    /// The refund fields have no counterpart on this API and are ignored.
    async fn create_order(&self, order: &CreateOrder) -> ExchangeResult<CreateResultInfo> {
        order.validate_amount(EXCHANGE_NAME)?;

        let mut form = vec![
            ("fromCurrency", order.from_currency.to_uppercase()),
            ("toCurrency", order.to_currency.to_uppercase()),
            ("fromQty", format_amount(order.invoiced_amount)),
            ("toAddress", order.destination_address.clone()),
            ("type", RATE_TYPE.to_string()),
        ];
        if let Some(extra) = non_empty(order.extra_id.clone()) {
            form.push(("extra", extra));
        }

        let data = self.call("createOrder", &form).await?;
        let created: FfOrder = self.data_as("createOrder", data)?;

        tracing::info!(exchange = EXCHANGE_NAME, order_id = %created.id, "Order created");

        Ok(CreateResultInfo {
            uuid: created.id,
            from_currency: created.from.currency.to_lowercase(),
            to_currency: created.to.currency.to_lowercase(),
            deposit_address: created.from.address,
            destination_address: created.to.address,
            charged_fee: 0.0,
            extra_id: non_empty(created.from.tag),
            payout_extra_id: non_empty(created.to.tag),
            token: non_empty(created.token),
        })
    }

    async fn update_order(&self, _update: &UpdateOrder) -> ExchangeResult<UpdateOrderResultInfo> {
        Err(ExchangeError::not_supported(EXCHANGE_NAME, "update_order"))
    }

    async fn cancel_order(&self, _order_id: &str) -> ExchangeResult<String> {
        Err(ExchangeError::not_supported(EXCHANGE_NAME, "cancel_order"))
    }

    /// `extra[0]` must be the order token from [`CreateResultInfo::token`].
    async fn order_info(&self, order_id: &str, extra: &[String]) -> ExchangeResult<OrderInfoResult> {
        let token = extra
            .first()
            .filter(|t| !t.is_empty())
            .ok_or(ExchangeError::MissingCredential {
                exchange: EXCHANGE_NAME,
                credential: "order token",
            })?;

        let form = [("id", order_id.to_string()), ("token", token.clone())];
        let data = self.call("getOrder", &form).await?;
        let state: FfOrderState = self.data_as("getOrder", data)?;

        let status = canonical_status(&state.status);
        if status == OrderStatus::Unknown {
            tracing::warn!(exchange = EXCHANGE_NAME, native_status = %state.status, "Unmapped order status");
        }

        let (receive_amount, tx_id) = match state.to {
            Some(to) => (
                to.amount.and_then(|a| a.as_f64()).unwrap_or_default(),
                to.tx.and_then(|tx| non_empty(tx.id)),
            ),
            None => (0.0, None),
        };

        Ok(OrderInfoResult {
            receive_amount,
            confirmations: state
                .from
                .and_then(|f| f.confirmations)
                .and_then(|c| c.as_f64())
                .map(|c| c as u64),
            tx_id,
            last_update: None,
            native_status: state.status,
            status,
        })
    }
}
