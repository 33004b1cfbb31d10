//! Changelly Adapter Implementation
//!
//! JSON-RPC 2.0 over a single POST endpoint. Every call is signed by the
//! adapter itself (HMAC-SHA512 of the body in the `sign` header) and sent
//! marked as pre-signed, so the credentials are checked per call rather
//! than at construction.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::shared::{hmac_sha512_hex, BackendClient};
use crate::adapters::status::{canonicalize, OrderStatus, StatusTable};
use crate::adapters::traits::ExchangeAdapter;
use crate::adapters::transport::{HttpTransport, ReqwestTransport};
use crate::adapters::types::{
    format_amount, non_empty, ActiveCurrency, CreateOrder, CreateResultInfo, EstimateAmount,
    ExchangeRateRequest, OrderInfoResult, QueryLimits, QueryRate, UpdateOrder,
    UpdateOrderResultInfo,
};
use crate::config::ExchangeConfig;

use super::types::{
    AmountParams, ClCreatedTransaction, ClTransaction, CreateTransactionParams, PairParams,
    RpcRequest, RpcResponse, TransactionLookupParams,
};

// =============================================================================
// Constants
// =============================================================================

pub const CHANGELLY_API_BASE: &str = "https://api.changelly.com/";

pub(crate) const EXCHANGE_NAME: &str = "changelly";

/// Changelly reports `waiting` once the deposit is being processed
pub const STATUS_TABLE: StatusTable = &[
    ("finished", OrderStatus::Completed),
    ("waiting", OrderStatus::Exchanging),
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

fn upstream_error(body: &[u8]) -> Option<String> {
    let response: RpcResponse = serde_json::from_slice(body).ok()?;
    response.error.map(|e| format!("{} (code {})", e.message, e.code))
}

// =============================================================================
// ChangellyAdapter
// =============================================================================

pub struct ChangellyAdapter {
    api_key: String,
    api_secret: Option<String>,
    client: BackendClient,
}

impl ChangellyAdapter {
    pub fn new(config: ExchangeConfig) -> ExchangeResult<Self> {
        Self::with_transport(config, Arc::new(ReqwestTransport::new(EXCHANGE_NAME)))
    }

    pub fn with_transport(config: ExchangeConfig, transport: Arc<dyn HttpTransport>) -> ExchangeResult<Self> {
        let client = BackendClient::new(
            EXCHANGE_NAME,
            config.base_url_or(CHANGELLY_API_BASE),
            transport,
            config.debug,
            upstream_error,
        );
        let api_secret = config.secret().map(str::to_string);

        Ok(Self {
            api_key: config.api_key,
            api_secret,
            client,
        })
    }

    fn credentials(&self) -> ExchangeResult<(&str, &str)> {
        if self.api_key.trim().is_empty() {
            return Err(ExchangeError::MissingCredential {
                exchange: EXCHANGE_NAME,
                credential: "api key",
            });
        }
        let secret = self.api_secret.as_deref().ok_or(ExchangeError::MissingCredential {
            exchange: EXCHANGE_NAME,
            credential: "api secret",
        })?;
        Ok((self.api_key.as_str(), secret))
    }

    /// Sign and send one RPC call, returning its `result` member
    async fn call<P: Serialize + Send>(&self, id_prefix: &str, method: &'static str, params: P) -> ExchangeResult<Value> {
        let (key, secret) = self.credentials()?;

        let body = self.client.encode_json(&RpcRequest {
            id: format!("{}{}", id_prefix, chrono::Utc::now().timestamp()),
            jsonrpc: "2.0",
            method,
            params,
        })?;
        let sign = hmac_sha512_hex(secret, &body).map_err(|source| ExchangeError::Transport {
            exchange: EXCHANGE_NAME,
            source,
        })?;

        tracing::debug!(exchange = EXCHANGE_NAME, method, "JSON-RPC call");
        let bytes = self
            .client
            .post_signed_json(
                "",
                body,
                vec![("api-key".to_string(), key.to_string()), ("sign".to_string(), sign)],
            )
            .await?;

        let response: RpcResponse = self.client.decode(&bytes)?;
        if let Some(err) = response.error {
            return Err(ExchangeError::Upstream {
                exchange: EXCHANGE_NAME,
                message: format!("{} (code {})", err.message, err.code),
            });
        }
        response
            .result
            .ok_or_else(|| ExchangeError::decode(EXCHANGE_NAME, format!("{} returned no result", method)))
    }

    fn result_as<T: DeserializeOwned>(&self, method: &str, result: Value) -> ExchangeResult<T> {
        serde_json::from_value(result)
            .map_err(|e| ExchangeError::decode(EXCHANGE_NAME, format!("{} result: {}", method, e)))
    }

    /// String-valued numeric result (`getMinAmount`, `getExchangeAmount`)
    async fn numeric_call<P: Serialize + Send>(
        &self,
        id_prefix: &str,
        method: &'static str,
        params: P,
    ) -> ExchangeResult<f64> {
        let result = self.call(id_prefix, method, params).await?;
        let raw: String = self.result_as(method, result)?;
        self.client.parse_number(method, &raw)
    }
}

#[async_trait]
impl ExchangeAdapter for ChangellyAdapter {
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
        let params = AmountParams {
            from: request.from.to_lowercase(),
            to: request.to.to_lowercase(),
            amount: format_amount(request.amount),
        };
        let estimated_amount = self
            .numeric_call("estimateAmount", "getExchangeAmount", params)
            .await?;

        Ok(EstimateAmount {
            estimated_amount,
            ..Default::default()
        })
    }

    async fn query_limits(&self, from: &str, to: &str) -> ExchangeResult<QueryLimits> {
        let params = PairParams {
            from: from.to_lowercase(),
            to: to.to_lowercase(),
        };
        let min = self.numeric_call("queryLimits", "getMinAmount", params).await?;
        Ok(QueryLimits { min, max: 0.0 })
    }

    async fn query_rates(&self) -> ExchangeResult<Vec<QueryRate>> {
        Err(ExchangeError::not_supported(EXCHANGE_NAME, "query_rates"))
    }

    async fn query_active_currencies(&self) -> ExchangeResult<Vec<ActiveCurrency>> {
        Err(ExchangeError::not_supported(EXCHANGE_NAME, "query_active_currencies"))
    }

    async fn create_order(&self, order: &CreateOrder) -> ExchangeResult<CreateResultInfo> {
        order.validate_amount(EXCHANGE_NAME)?;

        let params = CreateTransactionParams {
            from: order.from_currency.to_lowercase(),
            to: order.to_currency.to_lowercase(),
            address: order.destination_address.clone(),
            amount: format_amount(order.invoiced_amount),
            extra_id: non_empty(order.extra_id.clone()),
            refund_address: non_empty(order.refund_address.clone()),
            refund_extra_id: non_empty(order.refund_extra_id.clone()),
        };
        let result = self.call("createOrder", "createTransaction", params).await?;
        let created: ClCreatedTransaction = self.result_as("createTransaction", result)?;

        tracing::info!(exchange = EXCHANGE_NAME, order_id = %created.id, "Order created");

        Ok(CreateResultInfo {
            uuid: created.id,
            from_currency: created.currency_from,
            to_currency: created.currency_to,
            deposit_address: created.payin_address,
            destination_address: created.payout_address,
            charged_fee: created
                .changelly_fee
                .and_then(|fee| fee.as_f64())
                .unwrap_or_default(),
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

    /// `getTransactions` answers with a list; only the entry with the
    /// requested id is kept.
    async fn order_info(&self, order_id: &str, _extra: &[String]) -> ExchangeResult<OrderInfoResult> {
        let params = TransactionLookupParams {
            id: order_id.to_string(),
        };
        let result = self.call("orderInfo", "getTransactions", params).await?;
        let transactions: Vec<ClTransaction> = self.result_as("getTransactions", result)?;

        let tx = transactions
            .into_iter()
            .find(|tx| tx.id.as_deref() == Some(order_id))
            .ok_or_else(|| ExchangeError::OrderNotFound {
                exchange: EXCHANGE_NAME,
                order_id: order_id.to_string(),
            })?;

        let status = canonical_status(&tx.status);
        if status == OrderStatus::Unknown {
            tracing::warn!(exchange = EXCHANGE_NAME, native_status = %tx.status, "Unmapped order status");
        }

        Ok(OrderInfoResult {
            receive_amount: tx.amount_to.and_then(|a| a.as_f64()).unwrap_or_default(),
            confirmations: tx
                .payin_confirmations
                .and_then(|c| c.as_f64())
                .map(|c| c as u64),
            tx_id: non_empty(tx.payout_hash),
            last_update: None,
            native_status: tx.status,
            status,
        })
    }
}
