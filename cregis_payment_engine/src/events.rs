use std::fmt::Display;

use serde::Deserialize;
use serde_json::{Map, Value};

/// The only `event_name` that drives order state. Everything else is acknowledged and ignored.
pub const ORDER_EVENT: &str = "order";

/// A webhook delivery from the payment processor.
///
/// All fields default, because the processor's payloads are only loosely specified: dispatching decides what is
/// actionable, and missing `data` fields read as empty strings rather than failing the whole delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEvent {
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub sign: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl PaymentEvent {
    /// The typed event kind. Anything unrecognized maps to [`PaymentEventType::Unknown`] so dispatch stays
    /// exhaustive without silently dropping new event types.
    pub fn kind(&self) -> PaymentEventType {
        PaymentEventType::from(self.event_type.as_str())
    }

    /// A `data` field as text. Missing or null fields read as empty, matching the tolerant handling the processor's
    /// payloads require; non-string scalars are rendered as their JSON text.
    pub fn field(&self, key: &str) -> String {
        match self.data.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// The order lifecycle transitions the processor can announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEventType {
    Paid,
    PaidPartial,
    PaidOver,
    Expired,
    Refunded,
    PaidRemain,
    /// An event type this engine does not recognize. Logged and acknowledged, never acted on.
    Unknown(String),
}

impl From<&str> for PaymentEventType {
    fn from(value: &str) -> Self {
        match value {
            "paid" => Self::Paid,
            "paid_partial" => Self::PaidPartial,
            "paid_over" => Self::PaidOver,
            "expired" => Self::Expired,
            "refunded" => Self::Refunded,
            "paid_remain" => Self::PaidRemain,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl Display for PaymentEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paid => write!(f, "paid"),
            Self::PaidPartial => write!(f, "paid_partial"),
            Self::PaidOver => write!(f, "paid_over"),
            Self::Expired => write!(f, "expired"),
            Self::Refunded => write!(f, "refunded"),
            Self::PaidRemain => write!(f, "paid_remain"),
            Self::Unknown(other) => write!(f, "{other}"),
        }
    }
}
