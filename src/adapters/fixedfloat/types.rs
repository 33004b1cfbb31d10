//! FixedFloat API payloads
//!
//! Every answer is wrapped in `{code, msg, data}`; `code != 0` is an error.

use serde::Deserialize;
use serde_json::Value;

use crate::adapters::shared::NumberOrString;

#[derive(Debug, Clone, Deserialize)]
pub struct FfEnvelope {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// `getPrice` data
#[derive(Debug, Clone, Deserialize)]
pub struct FfPrice {
    pub from: FfPriceSide,
    pub to: FfPriceSide,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FfPriceSide {
    #[serde(default)]
    pub amount: Option<NumberOrString>,
    #[serde(default)]
    pub min: Option<NumberOrString>,
    #[serde(default)]
    pub max: Option<NumberOrString>,
}

/// Entry of `getCurrencies` data
#[derive(Debug, Clone, Deserialize)]
pub struct FfCurrency {
    pub currency: String,
    #[serde(default)]
    pub send: Value,
    #[serde(default)]
    pub recv: Value,
}

/// `createOrder` data
#[derive(Debug, Clone, Deserialize)]
pub struct FfOrder {
    pub id: String,
    #[serde(default)]
    pub token: Option<String>,
    pub from: FfOrderSide,
    pub to: FfOrderSide,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FfOrderSide {
    pub currency: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub tag: Option<String>,
}

/// `getOrder` data
#[derive(Debug, Clone, Deserialize)]
pub struct FfOrderState {
    pub status: String,
    #[serde(default)]
    pub from: Option<FfStateFrom>,
    #[serde(default)]
    pub to: Option<FfStateTo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FfStateFrom {
    #[serde(default)]
    pub confirmations: Option<NumberOrString>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FfStateTo {
    #[serde(default)]
    pub amount: Option<NumberOrString>,
    #[serde(default)]
    pub tx: Option<FfTx>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FfTx {
    #[serde(default)]
    pub id: Option<String>,
}
