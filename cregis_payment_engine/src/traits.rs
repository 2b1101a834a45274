//! The seams between this engine and the host commerce platform.
//!
//! The platform exclusively owns its order records and checkout session. The engine only touches them through the
//! narrow contracts here, which keeps the reconciler and gateway testable without a live commerce backend.

use thiserror::Error;

use crate::order_types::{Order, OrderStatus};

/// Read/write access to the host platform's order records.
///
/// Per-entity update semantics are the store's responsibility. The engine performs no locking of its own, so the
/// idempotence checks layered on top of this trait are best-effort guards, not hard locks.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// Find the order whose human-facing order number equals `number`.
    async fn find_by_order_number(&self, number: &str) -> Result<Option<Order>, OrderStoreError>;

    /// Find the order whose access key equals `key`.
    async fn find_by_order_key(&self, key: &str) -> Result<Option<Order>, OrderStoreError>;

    /// Find the order with the store's internal numeric id.
    async fn find_by_internal_id(&self, id: i64) -> Result<Option<Order>, OrderStoreError>;

    /// Read one metadata value for the order, or `None` if the key has never been written.
    async fn read_meta(&self, order: &Order, key: &str) -> Result<Option<String>, OrderStoreError>;

    /// Write (or overwrite) one metadata value for the order.
    async fn write_meta(&self, order: &Order, key: &str, value: &str) -> Result<(), OrderStoreError>;

    /// Flush pending metadata writes. Stores with write-through semantics may treat this as a no-op.
    async fn save(&self, order: &Order) -> Result<(), OrderStoreError>;

    /// Transition the order to `status`, attaching `note` to the order history.
    async fn set_status(&self, order: &Order, status: OrderStatus, note: &str) -> Result<(), OrderStoreError>;

    /// Mark the order fully paid, recording `tx_ref` as the payment reference. Implementations run their own
    /// completion side effects (stock reduction, confirmation mail) and must tolerate repeated calls.
    async fn mark_paid(&self, order: &Order, tx_ref: &str) -> Result<(), OrderStoreError>;

    /// Append a free-text note to the order history.
    async fn add_note(&self, order: &Order, note: &str) -> Result<(), OrderStoreError>;
}

/// User-visible messaging and checkout-session plumbing on the host platform.
#[allow(async_fn_in_trait)]
pub trait Storefront {
    /// The publicly reachable URL the processor should deliver webhook events to.
    fn webhook_url(&self) -> String;

    /// Where the customer lands after completing payment for `order`.
    fn return_url(&self, order: &Order) -> String;

    /// Where the customer lands when they abandon the hosted checkout.
    fn checkout_url(&self) -> String;

    /// Surface a single human-readable error message to the customer.
    async fn error_notice(&self, message: &str);

    /// Empty the active cart after a checkout order has been opened.
    async fn clear_cart(&self);
}

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("The order store backend failed: {0}")]
    Backend(String),
}
