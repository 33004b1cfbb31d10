//! StealthEX Adapter Implementation
//!
//! REST backend authenticated by an `api_key` query parameter. Quotes
//! are always requested for the fixed-rate flow.

use std::sync::Arc;

use async_trait::async_trait;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::shared::{BackendClient, NumberOrString};
use crate::adapters::status::{canonicalize, OrderStatus, StatusTable};
use crate::adapters::traits::ExchangeAdapter;
use crate::adapters::transport::{HttpTransport, ReqwestTransport};
use crate::adapters::types::{
    format_amount, non_empty, parse_timestamp, path_segment, ActiveCurrency, CreateOrder,
    CreateResultInfo, CurrencyType, EstimateAmount, ExchangeRateRequest, OrderInfoResult,
    QueryLimits, QueryRate, UpdateOrder, UpdateOrderResultInfo,
};
use crate::config::ExchangeConfig;

use super::types::{SxCreateRequest, SxCurrency, SxErrorBody, SxEstimate, SxExchange, SxRange};

// =============================================================================
// Constants
// =============================================================================

pub const STEALTHEX_API_BASE: &str = "https://api.stealthex.io/api/v2/";

pub(crate) const EXCHANGE_NAME: &str = "stealthex";

/// `verifying` has no canonical equivalent and reads as Unknown
pub const STATUS_TABLE: StatusTable = &[
    ("waiting", OrderStatus::WaitingForDeposit),
    ("confirming", OrderStatus::DepositReceived),
    ("exchanging", OrderStatus::Exchanging),
    ("sending", OrderStatus::Sending),
    ("finished", OrderStatus::Completed),
    ("failed", OrderStatus::Failed),
    ("refunded", OrderStatus::Refunded),
    ("expired", OrderStatus::Expired),
];

pub fn canonical_status(native: &str) -> OrderStatus {
    canonicalize(STATUS_TABLE, native)
}

fn upstream_error(body: &[u8]) -> Option<String> {
    let parsed: SxErrorBody = serde_json::from_slice(body).ok()?;
    Some(match (parsed.err.kind.is_empty(), parsed.err.details.is_empty()) {
        (false, false) => format!("{}: {}", parsed.err.kind, parsed.err.details),
        (true, _) => parsed.err.details,
        (false, true) => parsed.err.kind,
    })
}

// =============================================================================
// StealthExAdapter
// =============================================================================

pub struct StealthExAdapter {
    api_key: String,
    client: BackendClient,
}

impl StealthExAdapter {
    pub fn new(config: ExchangeConfig) -> ExchangeResult<Self> {
        Self::with_transport(config, Arc::new(ReqwestTransport::new(EXCHANGE_NAME)))
    }

    pub fn with_transport(config: ExchangeConfig, transport: Arc<dyn HttpTransport>) -> ExchangeResult<Self> {
        if !config.has_api_key() {
            return Err(ExchangeError::MissingCredential {
                exchange: EXCHANGE_NAME,
                credential: "api key",
            });
        }

        let client = BackendClient::new(
            EXCHANGE_NAME,
            config.base_url_or(STEALTHEX_API_BASE),
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

    /// Currencies `from` can be exchanged into
    pub async fn pairs_for(&self, from: &str) -> ExchangeResult<Vec<String>> {
        let path = format!(
            "pairs/{}?api_key={}",
            path_segment(&from.to_lowercase()),
            path_segment(&self.api_key)
        );
        let bytes = self.client.get(path).await?;
        let pairs: Vec<String> = self.client.decode(&bytes)?;
        Ok(pairs.into_iter().map(|p| p.to_lowercase()).collect())
    }

    fn number(&self, field: &str, value: &NumberOrString) -> ExchangeResult<f64> {
        match value {
            NumberOrString::Number(n) => Ok(*n),
            NumberOrString::String(raw) => self.client.parse_number(field, raw),
        }
    }
}

#[async_trait]
impl ExchangeAdapter for StealthExAdapter {
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
            "estimate/{}/{}?api_key={}&fixed=true&amount={}",
            path_segment(&request.from.to_lowercase()),
            path_segment(&request.to.to_lowercase()),
            path_segment(&self.api_key),
            format_amount(request.amount)
        );
        let bytes = self.client.get(path).await?;
        let estimate: SxEstimate = self.client.decode(&bytes)?;

        Ok(EstimateAmount {
            estimated_amount: self.number("estimated_amount", &estimate.estimated_amount)?,
            ..Default::default()
        })
    }

    async fn query_limits(&self, from: &str, to: &str) -> ExchangeResult<QueryLimits> {
        let path = format!(
            "range/{}/{}?api_key={}&fixed=true",
            path_segment(&from.to_lowercase()),
            path_segment(&to.to_lowercase()),
            path_segment(&self.api_key)
        );
        let bytes = self.client.get(path).await?;
        let range: SxRange = self.client.decode(&bytes)?;

        let max = match &range.max_amount {
            Some(max) => self.number("max_amount", max)?,
            None => 0.0,
        };
        Ok(QueryLimits {
            min: self.number("min_amount", &range.min_amount)?,
            max,
        })
    }

    async fn query_rates(&self) -> ExchangeResult<Vec<QueryRate>> {
        Err(ExchangeError::not_supported(EXCHANGE_NAME, "query_rates"))
    }

    async fn query_active_currencies(&self) -> ExchangeResult<Vec<ActiveCurrency>> {
        let path = format!("currency?api_key={}&fixed=true", path_segment(&self.api_key));
        let bytes = self.client.get(path).await?;
        let currencies: Vec<SxCurrency> = self.client.decode(&bytes)?;

        tracing::debug!(exchange = EXCHANGE_NAME, count = currencies.len(), "Fetched currencies");
        Ok(currencies
            .into_iter()
            .map(|c| ActiveCurrency {
                name: c.symbol.to_lowercase(),
                currency_type: CurrencyType::Crypto,
            })
            .collect())
    }

    async fn create_order(&self, order: &CreateOrder) -> ExchangeResult<CreateResultInfo> {
        order.validate_amount(EXCHANGE_NAME)?;

        let body = SxCreateRequest {
            currency_from: order.from_currency.to_lowercase(),
            currency_to: order.to_currency.to_lowercase(),
            address_to: order.destination_address.clone(),
            extra_id_to: non_empty(order.extra_id.clone()),
            amount_from: format_amount(order.invoiced_amount),
            fixed: true,
            refund_address: non_empty(order.refund_address.clone()),
            refund_extra_id: non_empty(order.refund_extra_id.clone()),
        };
        let bytes = self
            .client
            .post_json(format!("exchange?api_key={}", path_segment(&self.api_key)), &body)
            .await?;
        let created: SxExchange = self.client.decode(&bytes)?;

        tracing::info!(exchange = EXCHANGE_NAME, order_id = %created.id, "Order created");

        Ok(CreateResultInfo {
            uuid: created.id,
            from_currency: created.currency_from,
            to_currency: created.currency_to,
            deposit_address: created.address_from,
            destination_address: created.address_to,
            charged_fee: 0.0,
            extra_id: non_empty(created.extra_id_from),
            payout_extra_id: non_empty(created.extra_id_to),
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
            "exchange/{}?api_key={}",
            path_segment(order_id),
            path_segment(&self.api_key)
        );
        let bytes = self.client.get(path).await?;
        let exchange: SxExchange = self.client.decode(&bytes)?;

        let status = canonical_status(&exchange.status);
        if status == OrderStatus::Unknown {
            tracing::warn!(exchange = EXCHANGE_NAME, native_status = %exchange.status, "Unmapped order status");
        }

        let actual = exchange.amount_to.as_ref().and_then(NumberOrString::as_f64);
        let expected = exchange.expected_amount.as_ref().and_then(NumberOrString::as_f64);
        let receive_amount = if status == OrderStatus::Completed {
            actual.or(expected)
        } else {
            expected.or(actual)
        }
        .unwrap_or_default();

        Ok(OrderInfoResult {
            receive_amount,
            confirmations: None,
            tx_id: non_empty(exchange.tx_to),
            last_update: parse_timestamp(exchange.updated_at.as_deref()),
            native_status: exchange.status,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_utils::MockTransport;
    use crate::adapters::transport::{HttpMethod, TransportError};

    fn adapter(mock: &Arc<MockTransport>) -> StealthExAdapter {
        StealthExAdapter::with_transport(ExchangeConfig::new("sx-key"), mock.clone()).unwrap()
    }

    #[test]
    fn test_new_requires_api_key() {
        let err = StealthExAdapter::new(ExchangeConfig::default()).err().unwrap();
        assert_eq!(err.to_string(), "stealthex: missing credential: api key");
    }

    #[test]
    fn test_status_table() {
        assert_eq!(canonical_status("finished"), OrderStatus::Completed);
        assert_eq!(canonical_status("Confirming"), OrderStatus::DepositReceived);
        assert_eq!(canonical_status("verifying"), OrderStatus::Unknown);
        assert_eq!(canonical_status("new"), OrderStatus::Unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exchange_rate_info() {
        let mock = MockTransport::shared();
        mock.push_json(r#"{"min_amount":"0.01","max_amount":null}"#);
        mock.push_json(r#"{"estimated_amount":"2.5"}"#);
        let started = tokio::time::Instant::now();

        let info = adapter(&mock)
            .get_exchange_rate_info(&ExchangeRateRequest::new("BTC", "LTC", 1.0))
            .await
            .unwrap();

        assert!(started.elapsed() >= crate::adapters::rate::RATE_PACING_DELAY);
        assert!((info.exchange_rate - 0.4).abs() < 1e-9);
        assert_eq!(info.min, 0.01);
        assert_eq!(info.max, 0.0);

        let sent = mock.requests();
        assert_eq!(sent[0].path, "range/btc/ltc?api_key=sx-key&fixed=true");
        assert_eq!(
            sent[1].path,
            "estimate/btc/ltc?api_key=sx-key&fixed=true&amount=1.00000000"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_estimate_is_invalid_quote() {
        let mock = MockTransport::shared();
        mock.push_json(r#"{"min_amount":"0.01","max_amount":"2"}"#);
        mock.push_json(r#"{"estimated_amount":"0"}"#);

        let err = adapter(&mock)
            .get_exchange_rate_info(&ExchangeRateRequest::new("btc", "ltc", 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidQuote { exchange: "stealthex", .. }));
    }

    #[tokio::test]
    async fn test_error_body_is_upstream() {
        let mock = MockTransport::shared();
        mock.push_error(TransportError::Status {
            status: 404,
            body: r#"{"err":{"kind":"NotFound","details":"Pair not found"}}"#.to_string(),
        });
        let err = adapter(&mock).query_limits("btc", "zzz").await.unwrap_err();
        assert_eq!(err.to_string(), "stealthex: upstream error: NotFound: Pair not found");
    }

    #[tokio::test]
    async fn test_order_id_is_path_escaped() {
        let mock = MockTransport::shared();
        mock.push_json(r#"{"id":"x","status":"waiting"}"#);
        adapter(&mock).order_info("x/../y?z", &[]).await.unwrap();
        assert_eq!(mock.requests()[0].path, "exchange/x%2F..%2Fy%3Fz?api_key=sx-key");
    }

    #[tokio::test]
    async fn test_pairs_for() {
        let mock = MockTransport::shared();
        mock.push_json(r#"["ETH","ltc","xmr"]"#);
        let pairs = adapter(&mock).pairs_for("BTC").await.unwrap();
        assert_eq!(pairs, vec!["eth", "ltc", "xmr"]);
        assert_eq!(mock.requests()[0].path, "pairs/btc?api_key=sx-key");
    }

    #[tokio::test]
    async fn test_create_order() {
        let mock = MockTransport::shared();
        mock.push_json(
            r#"{"id":"sx-42","status":"waiting","currency_from":"btc","currency_to":"xmr",
                "address_from":"bc1qdep","address_to":"4xmr","extra_id_from":null,"extra_id_to":""}"#,
        );
        let order = CreateOrder {
            from_currency: "btc".into(),
            to_currency: "xmr".into(),
            invoiced_amount: 0.02,
            destination_address: "4xmr".into(),
            ..Default::default()
        };

        let created = adapter(&mock).create_order(&order).await.unwrap();
        assert_eq!(created.uuid, "sx-42");
        assert_eq!(created.deposit_address, "bc1qdep");
        assert_eq!(created.payout_extra_id, None);

        let sent = &mock.requests()[0];
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.path, "exchange?api_key=sx-key");
        let body: serde_json::Value = serde_json::from_str(sent.body_str()).unwrap();
        assert_eq!(body["fixed"], true);
        assert_eq!(body["amount_from"], "0.02000000");
    }

    #[tokio::test]
    async fn test_order_info() {
        let mock = MockTransport::shared();
        mock.push_json(
            r#"{"id":"sx-42","status":"sending","expected_amount":"1.5","amount_to":"1.49",
                "tx_to":"","updated_at":"2024-05-02T08:00:00Z"}"#,
        );
        let info = adapter(&mock).order_info("sx-42", &[]).await.unwrap();
        assert_eq!(info.status, OrderStatus::Sending);
        assert_eq!(info.receive_amount, 1.5);
        assert_eq!(info.tx_id, None);
        assert!(info.last_update.is_some());
    }

    #[tokio::test]
    async fn test_create_order_zero_amount_no_network() {
        let mock = MockTransport::shared();
        let err = adapter(&mock)
            .create_order(&CreateOrder::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidAmount { .. }));
        assert_eq!(mock.call_count(), 0);
    }
}
