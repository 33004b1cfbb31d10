//! Backends over real HTTP against a local mock server
//!
//! Each adapter is resolved from the built-in registry with `base_url`
//! pointed at a mockito server, so the production `ReqwestTransport`
//! (including the FixedFloat signing hook) is exercised end to end.

use std::sync::Arc;

use mockito::Matcher;

use swapdesk::adapters::shared::{hmac_sha256_hex, HmacSha256Signer};
use swapdesk::adapters::test_utils::LogCapture;
use swapdesk::adapters::transport::RequestBody;
use swapdesk::adapters::{
    CreateOrder, ExchangeAdapter, ExchangeError, ExchangeRateRequest, HttpMethod, HttpTransport,
    OrderStatus, Registry, ReqwestTransport, TransportRequest,
};
use swapdesk::config::ExchangeConfig;

fn adapter_for(server: &mockito::ServerGuard, name: &str, config: ExchangeConfig) -> Box<dyn ExchangeAdapter> {
    Registry::with_builtin()
        .resolve(name, config.with_base_url(format!("{}/", server.url())))
        .unwrap()
}

#[tokio::test]
async fn test_changenow_rate_info_over_http() {
    let mut server = mockito::Server::new_async().await;

    let limits = server
        .mock("GET", "/min-amount/btc_ltc")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"minAmount": 0.01}"#)
        .create_async()
        .await;
    let estimate = server
        .mock("GET", "/exchange-amount/1.00000000/btc_ltc")
        .match_query(Matcher::UrlEncoded("api_key".into(), "cn-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"estimatedAmount": 2.5, "transactionSpeedForecast": "10-60"}"#)
        .create_async()
        .await;

    let adapter = adapter_for(&server, "changenow", ExchangeConfig::new("cn-key"));
    let info = adapter
        .get_exchange_rate_info(&ExchangeRateRequest::new("BTC", "LTC", 1.0))
        .await
        .unwrap();

    assert_eq!(info.min, 0.01);
    assert_eq!(info.max, 0.0);
    assert_eq!(info.estimated_amount, 2.5);
    assert!((info.exchange_rate - 0.4).abs() < 1e-9);

    limits.assert_async().await;
    estimate.assert_async().await;
}

#[tokio::test]
async fn test_changenow_error_body_becomes_upstream_error() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/min-amount/btc_xyz")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"pair_is_inactive","message":"Pair is inactive"}"#)
        .create_async()
        .await;

    let adapter = adapter_for(&server, "changenow", ExchangeConfig::new("cn-key"));
    let err = adapter.query_limits("btc", "xyz").await.unwrap_err();

    match err {
        ExchangeError::Upstream { exchange, message } => {
            assert_eq!(exchange, "changenow");
            assert_eq!(message, "pair_is_inactive: Pair is inactive");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_stealthex_order_info_over_http() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/exchange/sx-42")
        .match_query(Matcher::UrlEncoded("api_key".into(), "sx-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"id":"sx-42","status":"finished","amount_to":"1.95","expected_amount":"2.0",
                "tx_to":"0xabc","updated_at":"2024-03-01T12:30:00.000Z"}"#,
        )
        .create_async()
        .await;

    let adapter = adapter_for(&server, "stealthex", ExchangeConfig::new("sx-key"));
    let info = adapter.order_info("sx-42", &[]).await.unwrap();

    assert_eq!(info.status, OrderStatus::Completed);
    assert_eq!(info.native_status, "finished");
    assert_eq!(info.receive_amount, 1.95);
    assert_eq!(info.tx_id.as_deref(), Some("0xabc"));
    assert!(info.last_update.is_some());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_stealthex_error_envelope() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/exchange/missing")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"err":{"kind":"NOT_FOUND","details":"Exchange not found"}}"#)
        .create_async()
        .await;

    let adapter = adapter_for(&server, "stealthex", ExchangeConfig::new("sx-key"));
    let err = adapter.order_info("missing", &[]).await.unwrap_err();

    assert!(matches!(err, ExchangeError::Upstream { .. }));
    assert_eq!(err.to_string(), "stealthex: upstream error: NOT_FOUND: Exchange not found");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fixedfloat_requests_are_signed_by_transport() {
    let mut server = mockito::Server::new_async().await;

    let body = "fromCurrency=BTC&toCurrency=LTC&type=fixed";
    let signature = hmac_sha256_hex("ff-secret", body).unwrap();

    let mock = server
        .mock("POST", "/getPrice")
        .match_header("X-API-KEY", "ff-key")
        .match_header("X-API-SIGN", signature.as_str())
        .match_header("content-type", Matcher::Regex("x-www-form-urlencoded".into()))
        .match_body(body)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"code":0,"msg":"OK","data":{
                "from":{"min":"0.0005","max":"1.5"},
                "to":{"amount":"0.25"}}}"#,
        )
        .create_async()
        .await;

    let adapter = adapter_for(
        &server,
        "fixedfloat",
        ExchangeConfig::new("ff-key").with_secret("ff-secret"),
    );
    let limits = adapter.query_limits("btc", "ltc").await.unwrap();

    assert_eq!(limits.min, 0.0005);
    assert_eq!(limits.max, 1.5);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fixedfloat_nonzero_code_is_upstream_error() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/getCurrencies")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"code":301,"msg":"Invalid signature","data":null}"#)
        .create_async()
        .await;

    let adapter = adapter_for(
        &server,
        "fixedfloat",
        ExchangeConfig::new("ff-key").with_secret("wrong"),
    );
    let err = adapter.query_active_currencies().await.unwrap_err();

    assert_eq!(err.to_string(), "fixedfloat: upstream error: Invalid signature (code 301)");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_changelly_json_rpc_carries_key_and_signature() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_header("api-key", "cl-key")
        .match_header("sign", Matcher::Regex("^[0-9a-f]{128}$".into()))
        .match_body(Matcher::PartialJsonString(
            r#"{"jsonrpc":"2.0","method":"getTransactions","params":{"id":"abc123"}}"#.into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"jsonrpc":"2.0","id":"orderInfo1","result":[
                {"id":"other","status":"waiting"},
                {"id":"abc123","status":"sending","amountTo":"0.75","payinConfirmations":"3"}]}"#,
        )
        .create_async()
        .await;

    let adapter = adapter_for(
        &server,
        "changelly",
        ExchangeConfig::new("cl-key").with_secret("cl-secret"),
    );
    let info = adapter.order_info("abc123", &[]).await.unwrap();

    assert_eq!(info.status, OrderStatus::Sending);
    assert_eq!(info.receive_amount, 0.75);
    assert_eq!(info.confirmations, Some(3));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_changelly_without_secret_fails_before_sending() {
    let mut server = mockito::Server::new_async().await;

    let mock = server.mock("POST", "/").expect(0).create_async().await;

    let adapter = adapter_for(&server, "changelly", ExchangeConfig::new("cl-key"));
    let err = adapter
        .estimate_amount(&ExchangeRateRequest::new("btc", "eth", 1.0))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExchangeError::MissingCredential { credential: "api secret", .. }
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_zero_amount_order_never_reaches_server() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let adapter = adapter_for(&server, "changenow", ExchangeConfig::new("cn-key"));
    let order = CreateOrder {
        from_currency: "btc".into(),
        to_currency: "ltc".into(),
        invoiced_amount: 0.0,
        destination_address: "Laddr".into(),
        ..Default::default()
    };

    let err = adapter.create_order(&order).await.unwrap_err();
    assert_eq!(err.to_string(), "changenow: invalid amount: invoiced amount is 0");
    mock.assert_async().await;
}

fn signing_transport() -> ReqwestTransport {
    ReqwestTransport::new("signing-test")
        .with_signer(Arc::new(HmacSha256Signer::new("hook-key", "hook-secret")))
}

#[tokio::test]
async fn test_transport_does_not_resign_presigned_request() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/rpc")
        .match_header("X-API-KEY", Matcher::Missing)
        .match_header("X-API-SIGN", Matcher::Missing)
        .match_header("sign", "adapter-signature")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let request = TransportRequest::new(HttpMethod::Post, format!("{}/", server.url()), "rpc")
        .with_body(RequestBody::Json("{}".to_string()))
        .with_header("sign", "adapter-signature")
        .signed(true);
    signing_transport().execute(request).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_transport_signs_unsigned_request() {
    let mut server = mockito::Server::new_async().await;

    let body = "a=1&b=2";
    let signature = hmac_sha256_hex("hook-secret", body).unwrap();

    let mock = server
        .mock("POST", "/form")
        .match_header("X-API-KEY", "hook-key")
        .match_header("X-API-SIGN", signature.as_str())
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let request = TransportRequest::new(HttpMethod::Post, format!("{}/", server.url()), "form")
        .with_body(RequestBody::Form(body.to_string()));
    signing_transport().execute(request).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_debug_dump_masks_api_key() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/currency")
        .match_query(Matcher::UrlEncoded("api_key".into(), "SECRET-KEY-123".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"symbol":"btc"}]"#)
        .create_async()
        .await;

    let adapter = adapter_for(
        &server,
        "stealthex",
        ExchangeConfig::new("SECRET-KEY-123").with_debug(true),
    );

    let logs = LogCapture::new();
    let guard = logs.install();
    let currencies = adapter.query_active_currencies().await.unwrap();
    drop(guard);

    assert_eq!(currencies.len(), 1);
    let output = logs.contents();
    assert!(output.contains("HTTP request"), "debug dump missing: {output}");
    assert!(output.contains("api_key=SECR...REDACTED"));
    assert!(!output.contains("SECRET-KEY-123"), "api key leaked: {output}");
    mock.assert_async().await;
}
