use std::{fmt::Display, str::FromStr};

use cpg_common::Amount;
use log::error;
use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------    OrderStatus      ---------------------------------------------------------
/// The host platform order states this engine reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// The order exists and is awaiting payment.
    Pending,
    /// A partial payment has been received; the order is parked for manual review.
    OnHold,
    /// Payment received in full; the order is being fulfilled.
    Processing,
    /// The order has been fulfilled.
    Completed,
    /// The order was cancelled, e.g. because its checkout expired.
    Cancelled,
    Failed,
}

impl OrderStatus {
    /// Whether the order has been paid for. Further payment notifications for a paid order are no-ops.
    pub fn is_paid(&self) -> bool {
        matches!(self, OrderStatus::Processing | OrderStatus::Completed)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::OnHold => "on-hold",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct StatusConversionError(String);

impl FromStr for OrderStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "on-hold" => Ok(Self::OnHold),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "failed" => Ok(Self::Failed),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. Defaulting to Pending");
            OrderStatus::Pending
        })
    }
}

//--------------------------------------       Order         ---------------------------------------------------------
/// A read snapshot of one order in the host platform's store.
///
/// The store owns the record. A snapshot is only held for the duration of a single operation; mutations go back
/// through [`crate::traits::OrderStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// The store's internal numeric id.
    pub id: i64,
    /// The human-facing order number. This is the identifier the processor echoes back in webhook events.
    pub order_number: String,
    /// The order access key, an opaque secondary lookup handle.
    pub order_key: String,
    pub status: OrderStatus,
    pub total: Amount,
    pub currency: String,
    pub customer_id: Option<i64>,
    pub billing_name: String,
    pub billing_email: String,
    pub line_items: Vec<LineItem>,
    pub shipping_total: f64,
    pub tax_total: f64,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.status.is_paid()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: i64,
    pub name: String,
    pub quantity: u32,
    /// The line total (unit price times quantity, after discounts).
    pub total: f64,
}

//--------------------------------------    Metadata keys    ---------------------------------------------------------
/// Fixed keys under which payment state is recorded in the order metadata map. Values are appended or overwritten
/// across webhook deliveries, never deleted.
pub mod meta {
    pub const CREGIS_ID: &str = "_cregis_id";
    pub const CHECKOUT_URL: &str = "_cregis_checkout_url";
    pub const CREATED_TIME: &str = "_cregis_created_time";
    pub const EXPIRE_TIME: &str = "_cregis_expire_time";
    pub const TRANSACTION_HASH: &str = "_cregis_transaction_hash";
    pub const PAY_AMOUNT: &str = "_cregis_pay_amount";
    pub const PAY_CURRENCY: &str = "_cregis_pay_currency";
    pub const PAYMENT_ADDRESS: &str = "_cregis_payment_address";
    pub const TRANSACT_TIME: &str = "_cregis_transact_time";
    pub const STATUS: &str = "_cregis_status";
    pub const REFUND_ID: &str = "_cregis_refund_id";
    pub const REFUND_AMOUNT: &str = "_cregis_refund_amount";
    pub const REFUND_TX_ID: &str = "_cregis_refund_tx_id";
    pub const ADDITIONAL_PAYMENT: &str = "_cregis_additional_payment";
    pub const ADDITIONAL_TX_ID: &str = "_cregis_additional_tx_id";
}
