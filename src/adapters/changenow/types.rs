//! ChangeNOW API response types

use serde::{Deserialize, Serialize};

/// `GET exchange-amount/{amount}/{from}_{to}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CnEstimate {
    pub estimated_amount: f64,
    #[serde(default)]
    pub network_fee: Option<f64>,
    #[serde(default)]
    pub service_commission: Option<f64>,
    #[serde(default)]
    pub transaction_speed_forecast: Option<String>,
    #[serde(default)]
    pub warning_message: Option<String>,
}

/// `GET min-amount/{from}_{to}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CnMinAmount {
    pub min_amount: f64,
}

/// Entry of `GET currencies?active=true`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CnCurrency {
    pub ticker: String,
    #[serde(default)]
    pub is_fiat: bool,
}

/// Body of `POST transactions/{api_key}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CnCreateRequest {
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

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CnCreateResponse {
    pub id: String,
    pub payin_address: String,
    pub payout_address: String,
    #[serde(default)]
    pub payin_extra_id: Option<String>,
    #[serde(default)]
    pub payout_extra_id: Option<String>,
    pub from_currency: String,
    pub to_currency: String,
}

/// `GET transactions/{id}/{api_key}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CnTransaction {
    pub status: String,
    #[serde(default)]
    pub amount_receive: Option<f64>,
    #[serde(default)]
    pub expected_receive_amount: Option<f64>,
    #[serde(default)]
    pub payout_hash: Option<String>,
    #[serde(default)]
    pub payin_confirmations: Option<u64>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Error body: `{"error": "...", "message": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct CnErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
