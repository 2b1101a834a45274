use cpg_common::Amount;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Everything the client needs to open a hosted checkout for one order.
///
/// The caller supplies order data and host URLs; the merchant project id, nonce, timestamp and signature are added by
/// the client when the request is sent.
#[derive(Debug, Clone, Default)]
pub struct CheckoutRequest {
    pub amount: Amount,
    pub currency: String,
    pub payer_id: String,
    pub payer_name: String,
    pub payer_email: String,
    /// Minutes until the checkout order expires.
    pub valid_time: u32,
    pub callback_url: String,
    pub success_url: String,
    pub cancel_url: String,
    pub remark: Option<String>,
    /// Tokens the customer may pay with. Empty means the processor offers all of them.
    pub tokens: Vec<String>,
    pub language: Option<String>,
    pub order_details: Option<OrderDetails>,
    pub accept_partial_payment: Option<bool>,
    pub accept_over_payment: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_id: String,
    pub item_name: String,
    pub item_price: f64,
    pub price_currency: String,
    pub item_quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub items: Vec<OrderItem>,
    pub shopping_cost: f64,
    pub tax_cost: f64,
}

/// The processor-assigned handle for a created checkout order.
///
/// Persisted as order metadata once, and only replaced by a new create attempt for the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOrderReference {
    pub cregis_id: String,
    pub checkout_url: String,
    #[serde(deserialize_with = "string_or_number")]
    pub created_time: String,
    #[serde(deserialize_with = "string_or_number")]
    pub expire_time: String,
}

/// The processor is inconsistent about whether timestamps arrive as strings or numbers, so accept either.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("expected string or number, got {other}"))),
    }
}
