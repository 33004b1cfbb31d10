//! ChangeNOW Adapter Implementation
//!
//! Plain REST backend. The API key travels in the URL (query string or
//! path segment), so it is required at construction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::shared::BackendClient;
use crate::adapters::status::{canonicalize, OrderStatus, StatusTable};
use crate::adapters::traits::ExchangeAdapter;
use crate::adapters::transport::{HttpTransport, ReqwestTransport};
use crate::adapters::types::{
    format_amount, non_empty, parse_timestamp, path_segment, ActiveCurrency, CreateOrder,
    CreateResultInfo, CurrencyType, EstimateAmount, ExchangeRateRequest, OrderInfoResult,
    QueryLimits, QueryRate, UpdateOrder, UpdateOrderResultInfo,
};
use crate::config::ExchangeConfig;

use super::types::{
    CnCreateRequest, CnCreateResponse, CnCurrency, CnErrorBody, CnEstimate, CnMinAmount,
    CnTransaction,
};

// =============================================================================
// Constants
// =============================================================================

pub const CHANGENOW_API_BASE: &str = "https://changenow.io/api/v1/";

pub(crate) const EXCHANGE_NAME: &str = "changenow";

/// Native statuses: new waiting confirming exchanging sending finished failed refunded expired
pub const STATUS_TABLE: StatusTable = &[
    ("finished", OrderStatus::Completed),
    ("waiting", OrderStatus::WaitingForDeposit),
    ("confirming", OrderStatus::DepositReceived),
    ("refunded", OrderStatus::Refunded),
    ("expired", OrderStatus::Expired),
    ("new", OrderStatus::New),
    ("exchanging", OrderStatus::Exchanging),
    ("sending", OrderStatus::Sending),
    ("failed", OrderStatus::Failed),
];

pub fn canonical_status(native: &str) -> OrderStatus {
    canonicalize(STATUS_TABLE, native)
}

/// `{from}_{to}` pair segment, lowercased and escaped
fn pair_segment(from: &str, to: &str) -> String {
    format!(
        "{}_{}",
        path_segment(&from.to_lowercase()),
        path_segment(&to.to_lowercase())
    )
}

fn upstream_error(body: &[u8]) -> Option<String> {
    let parsed: CnErrorBody = serde_json::from_slice(body).ok()?;
    match (parsed.error, parsed.message) {
        (Some(code), Some(message)) => Some(format!("{}: {}", code, message)),
        (None, Some(message)) => Some(message),
        (Some(code), None) => Some(code),
        (None, None) => None,
    }
}

// =============================================================================
// ChangeNowAdapter
// =============================================================================

pub struct ChangeNowAdapter {
    api_key: String,
    client: BackendClient,
}

impl ChangeNowAdapter {
    /// Create an adapter talking to the real service (or `config.base_url`)
    pub fn new(config: ExchangeConfig) -> ExchangeResult<Self> {
        Self::with_transport(config, Arc::new(ReqwestTransport::new(EXCHANGE_NAME)))
    }

    /// Create an adapter over an injected transport
    pub fn with_transport(config: ExchangeConfig, transport: Arc<dyn HttpTransport>) -> ExchangeResult<Self> {
        if !config.has_api_key() {
            return Err(ExchangeError::MissingCredential {
                exchange: EXCHANGE_NAME,
                credential: "api key",
            });
        }

        let client = BackendClient::new(
            EXCHANGE_NAME,
            config.base_url_or(CHANGENOW_API_BASE),
            transport,
            config.debug,
            upstream_error,
        )
        .with_redacted(&config.api_key);

        Ok(Self {
            api_key: config.api_key,
            client,
        })
    }
}

#[async_trait]
impl ExchangeAdapter for ChangeNowAdapter {
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
        let path = format!(
            "exchange-amount/{}/{}?api_key={}",
            format_amount(request.amount),
            pair_segment(&request.from, &request.to),
            path_segment(&self.api_key)
        );
        let bytes = self.client.get(path).await?;
        let estimate: CnEstimate = self.client.decode(&bytes)?;

        Ok(EstimateAmount {
            estimated_amount: estimate.estimated_amount,
            network_fee: estimate.network_fee.unwrap_or_default(),
            service_commission: estimate.service_commission.unwrap_or_default(),
            transaction_speed_forecast: estimate.transaction_speed_forecast.unwrap_or_default(),
            warning_message: estimate.warning_message.unwrap_or_default(),
        })
    }

    /// Only the minimum is reported; `max` stays zero.
    async fn query_limits(&self, from: &str, to: &str) -> ExchangeResult<QueryLimits> {
        let path = format!("min-amount/{}", pair_segment(from, to));
        let bytes = self.client.get(path).await?;
        let limits: CnMinAmount = self.client.decode(&bytes)?;
        Ok(QueryLimits {
            min: limits.min_amount,
            max: 0.0,
        })
    }

    async fn query_rates(&self) -> ExchangeResult<Vec<QueryRate>> {
        Err(ExchangeError::not_supported(EXCHANGE_NAME, "query_rates"))
    }

    async fn query_active_currencies(&self) -> ExchangeResult<Vec<ActiveCurrency>> {
        let bytes = self.client.get("currencies?active=true").await?;
        let currencies: Vec<CnCurrency> = self.client.decode(&bytes)?;

        Ok(currencies
            .into_iter()
            .map(|c| ActiveCurrency {
                name: c.ticker.to_lowercase(),
                currency_type: if c.is_fiat {
                    CurrencyType::Fiat
                } else {
                    CurrencyType::Crypto
                },
            })
            .collect())
    }

    async fn create_order(&self, order: &CreateOrder) -> ExchangeResult<CreateResultInfo> {
        order.validate_amount(EXCHANGE_NAME)?;

        let body = CnCreateRequest {
            from: order.from_currency.to_lowercase(),
            to: order.to_currency.to_lowercase(),
            address: order.destination_address.clone(),
            amount: format_amount(order.invoiced_amount),
            extra_id: non_empty(order.extra_id.clone()),
            refund_address: non_empty(order.refund_address.clone()),
            refund_extra_id: non_empty(order.refund_extra_id.clone()),
        };
        let bytes = self
            .client
            .post_json(format!("transactions/{}", path_segment(&self.api_key)), &body)
            .await?;
        let created: CnCreateResponse = self.client.decode(&bytes)?;

        tracing::info!(exchange = EXCHANGE_NAME, order_id = %created.id, "Order created");

        Ok(CreateResultInfo {
            uuid: created.id,
            from_currency: created.from_currency,
            to_currency: created.to_currency,
            deposit_address: created.payin_address,
            destination_address: created.payout_address,
            charged_fee: 0.0,
            extra_id: non_empty(created.payin_extra_id),
            payout_extra_id: non_empty(created.payout_extra_id),
            token: None,
        })
    }

    async fn update_order(&self, _update: &UpdateOrder) -> ExchangeResult<UpdateOrderResultInfo> {
        Err(ExchangeError::not_supported(EXCHANGE_NAME, "update_order"))
    }

    async fn cancel_order(&self, _order_id: &str) -> ExchangeResult<String> {
        Err(ExchangeError::not_supported(EXCHANGE_NAME, "cancel_order"))
    }

    async fn order_info(&self, order_id: &str, _extra: &[String]) -> ExchangeResult<OrderInfoResult> {
        let path = format!(
            "transactions/{}/{}",
            path_segment(order_id),
            path_segment(&self.api_key)
        );
        let bytes = self.client.get(path).await?;
        let tx: CnTransaction = self.client.decode(&bytes)?;

        let status = canonical_status(&tx.status);
        if status == OrderStatus::Unknown {
            tracing::warn!(exchange = EXCHANGE_NAME, native_status = %tx.status, "Unmapped order status");
        }

        // The actual amount is only final once the order has finished
        let receive_amount = if status == OrderStatus::Completed {
            tx.amount_receive.unwrap_or_default()
        } else {
            tx.expected_receive_amount.unwrap_or_default()
        };

        Ok(OrderInfoResult {
            receive_amount,
            confirmations: tx.payin_confirmations,
            tx_id: non_empty(tx.payout_hash),
            last_update: parse_timestamp(tx.updated_at.as_deref()),
            native_status: tx.status,
            status,
        })
    }
}
