//! StealthEX API payloads

use serde::{Deserialize, Serialize};

use crate::adapters::shared::NumberOrString;

/// `GET range/{from}/{to}`; `max_amount` is null for uncapped pairs
#[derive(Debug, Clone, Deserialize)]
pub struct SxRange {
    pub min_amount: NumberOrString,
    #[serde(default)]
    pub max_amount: Option<NumberOrString>,
}

/// `GET estimate/{from}/{to}`
#[derive(Debug, Clone, Deserialize)]
pub struct SxEstimate {
    pub estimated_amount: NumberOrString,
}

/// Entry of `GET currency`
#[derive(Debug, Clone, Deserialize)]
pub struct SxCurrency {
    pub symbol: String,
}

/// Body of `POST exchange`
#[derive(Debug, Clone, Serialize)]
pub struct SxCreateRequest {
    pub currency_from: String,
    pub currency_to: String,
    pub address_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_id_to: Option<String>,
    pub amount_from: String,
    pub fixed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_extra_id: Option<String>,
}

/// `POST exchange` answer and `GET exchange/{id}` record
#[derive(Debug, Clone, Deserialize)]
pub struct SxExchange {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub currency_from: String,
    #[serde(default)]
    pub currency_to: String,
    #[serde(default)]
    pub address_from: String,
    #[serde(default)]
    pub address_to: String,
    #[serde(default)]
    pub extra_id_from: Option<String>,
    #[serde(default)]
    pub extra_id_to: Option<String>,
    #[serde(default)]
    pub amount_to: Option<NumberOrString>,
    #[serde(default)]
    pub expected_amount: Option<NumberOrString>,
    #[serde(default)]
    pub tx_to: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Error body: `{"err": {"kind": "...", "details": "..."}}`
#[derive(Debug, Clone, Deserialize)]
pub struct SxErrorBody {
    pub err: SxErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SxErrorDetail {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub details: String,
}
