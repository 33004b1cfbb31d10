//! Changelly JSON-RPC payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapters::shared::NumberOrString;

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<P: Serialize> {
    pub id: String,
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: P,
}

/// JSON-RPC 2.0 response envelope. `result` is decoded per method.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PairParams {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AmountParams {
    pub from: String,
    pub to: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionParams {
    pub from: String,
    pub to: String,
    pub address: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_extra_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionLookupParams {
    pub id: String,
}

/// `createTransaction` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClCreatedTransaction {
    pub id: String,
    pub payin_address: String,
    pub payout_address: String,
    pub currency_from: String,
    pub currency_to: String,
    #[serde(default)]
    pub changelly_fee: Option<NumberOrString>,
    #[serde(default)]
    pub payin_extra_id: Option<String>,
    #[serde(default)]
    pub payout_extra_id: Option<String>,
}

/// One entry of the `getTransactions` result list
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClTransaction {
    /// Missing or null on malformed entries, which then never match a lookup
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub amount_to: Option<NumberOrString>,
    #[serde(default)]
    pub payin_confirmations: Option<NumberOrString>,
    #[serde(default)]
    pub payout_hash: Option<String>,
}
