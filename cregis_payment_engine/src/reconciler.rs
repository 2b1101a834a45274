use log::*;
use serde_json::Value;
use thiserror::Error;

use crate::{
    events::{PaymentEvent, PaymentEventType, ORDER_EVENT},
    order_types::{meta, Order, OrderStatus},
    traits::{OrderStore, OrderStoreError},
};

/// Applies verified processor events to the order store.
///
/// One event maps to one idempotent state transition; duplicate deliveries of a completed payment are no-ops.
/// The reconciler trusts its input: callers verify webhook signatures before handing events over.
pub struct OrderReconciler<B> {
    store: B,
    debug: bool,
}

impl<B> OrderReconciler<B>
where B: OrderStore
{
    pub fn new(store: B, debug: bool) -> Self {
        Self { store, debug }
    }

    /// Apply a single verified webhook event.
    ///
    /// Events with any `event_name` other than `order` are acknowledged without touching the store, as are `order`
    /// events of a type this engine does not recognize. An order lookup failure for a recognized event type is fatal
    /// for the delivery and is returned as [`ReconcilerError::OrderNotFound`].
    pub async fn process_event(&self, event: &PaymentEvent) -> Result<(), ReconcilerError> {
        if self.debug {
            debug!("Webhook event payload: {}", Value::Object(event.data.clone()));
        }
        if event.event_name != ORDER_EVENT {
            debug!("Ignoring {} event ({})", event.event_name, event.event_type);
            return Ok(());
        }
        match event.kind() {
            PaymentEventType::Paid => self.handle_paid(event).await,
            PaymentEventType::PaidPartial => self.handle_partial_paid(event).await,
            PaymentEventType::PaidOver => self.handle_overpaid(event).await,
            PaymentEventType::Expired => self.handle_expired(event).await,
            PaymentEventType::Refunded => self.handle_refunded(event).await,
            PaymentEventType::PaidRemain => self.handle_additional_payment(event).await,
            PaymentEventType::Unknown(other) => {
                info!("Unknown event type: {other}");
                Ok(())
            },
        }
    }

    async fn handle_paid(&self, event: &PaymentEvent) -> Result<(), ReconcilerError> {
        let order = self.order_for_event(event).await?;
        if order.is_paid() {
            // The guard only inspects the current status. A second transaction landing before this delivery
            // completes can still mark the order paid twice; the store's own update semantics are the last line.
            info!("Order {} is already paid. Ignoring duplicate payment notification.", order.order_number);
            return Ok(());
        }
        let tx_id = event.field("tx_id");
        self.store.write_meta(&order, meta::TRANSACTION_HASH, &tx_id).await?;
        self.store.write_meta(&order, meta::PAY_AMOUNT, &event.field("pay_amount")).await?;
        self.store.write_meta(&order, meta::PAY_CURRENCY, &event.field("pay_currency")).await?;
        self.store.write_meta(&order, meta::PAYMENT_ADDRESS, &event.field("payment_address")).await?;
        self.store.write_meta(&order, meta::TRANSACT_TIME, &event.field("transact_time")).await?;
        self.store.save(&order).await?;
        self.store.mark_paid(&order, &tx_id).await?;
        self.store
            .add_note(&order, &format!("Cryptocurrency payment received. Transaction hash: {tx_id}"))
            .await?;
        info!("Payment for order {} completed. tx: {tx_id}", order.order_number);
        Ok(())
    }

    async fn handle_partial_paid(&self, event: &PaymentEvent) -> Result<(), ReconcilerError> {
        let order = self.order_for_event(event).await?;
        let tx_id = event.field("tx_id");
        let amount = event.field("pay_amount");
        let currency = event.field("pay_currency");
        self.store.write_meta(&order, meta::STATUS, "partial_paid").await?;
        self.store.write_meta(&order, meta::TRANSACTION_HASH, &tx_id).await?;
        self.store.write_meta(&order, meta::PAY_AMOUNT, &amount).await?;
        self.store.write_meta(&order, meta::PAY_CURRENCY, &currency).await?;
        self.store.save(&order).await?;
        self.store.set_status(&order, OrderStatus::OnHold, "Partial cryptocurrency payment received").await?;
        self.store
            .add_note(&order, &format!("Partial payment received: {amount} {currency}. Transaction hash: {tx_id}"))
            .await?;
        info!("Partial payment of {amount} {currency} received for order {}", order.order_number);
        Ok(())
    }

    async fn handle_overpaid(&self, event: &PaymentEvent) -> Result<(), ReconcilerError> {
        let order = self.order_for_event(event).await?;
        let tx_id = event.field("tx_id");
        let amount = event.field("pay_amount");
        let currency = event.field("pay_currency");
        self.store.write_meta(&order, meta::STATUS, "overpaid").await?;
        self.store.write_meta(&order, meta::TRANSACTION_HASH, &tx_id).await?;
        self.store.write_meta(&order, meta::PAY_AMOUNT, &amount).await?;
        self.store.write_meta(&order, meta::PAY_CURRENCY, &currency).await?;
        self.store.save(&order).await?;
        if !order.is_paid() {
            self.store.mark_paid(&order, &tx_id).await?;
        }
        self.store
            .add_note(&order, &format!("Overpayment received: {amount} {currency}. Transaction hash: {tx_id}"))
            .await?;
        info!("Overpayment of {amount} {currency} received for order {}", order.order_number);
        Ok(())
    }

    async fn handle_expired(&self, event: &PaymentEvent) -> Result<(), ReconcilerError> {
        let order = self.order_for_event(event).await?;
        if order.is_paid() {
            debug!("Checkout for order {} expired after payment. Nothing to do.", order.order_number);
            return Ok(());
        }
        self.store.set_status(&order, OrderStatus::Cancelled, "Cryptocurrency payment expired").await?;
        self.store.add_note(&order, "Payment order expired without payment").await?;
        info!("Checkout for order {} expired", order.order_number);
        Ok(())
    }

    async fn handle_refunded(&self, event: &PaymentEvent) -> Result<(), ReconcilerError> {
        let order = self.order_for_event(event).await?;
        let refund_tx_id = event.field("refund_tx_id");
        self.store.write_meta(&order, meta::REFUND_ID, &event.field("refund_id")).await?;
        self.store.write_meta(&order, meta::REFUND_AMOUNT, &event.field("refund_amount")).await?;
        self.store.write_meta(&order, meta::REFUND_TX_ID, &refund_tx_id).await?;
        self.store.save(&order).await?;
        let note = format!(
            "Refund processed: {} {}. Transaction hash: {refund_tx_id}",
            event.field("actual_refund_amount"),
            event.field("refund_currency")
        );
        self.store.add_note(&order, &note).await?;
        info!("Refund recorded for order {}", order.order_number);
        Ok(())
    }

    async fn handle_additional_payment(&self, event: &PaymentEvent) -> Result<(), ReconcilerError> {
        let order = self.order_for_event(event).await?;
        let amount = event.field("additional_pay_amount");
        let tx_id = event.field("additional_payment_tx_id");
        self.store.write_meta(&order, meta::ADDITIONAL_PAYMENT, &amount).await?;
        self.store.write_meta(&order, meta::ADDITIONAL_TX_ID, &tx_id).await?;
        self.store.save(&order).await?;
        if !order.is_paid() {
            self.store.mark_paid(&order, &tx_id).await?;
        }
        let note = format!(
            "Additional payment received: {amount} {}. Transaction hash: {tx_id}",
            event.field("additional_pay_currency")
        );
        self.store.add_note(&order, &note).await?;
        info!("Additional payment of {amount} received for order {}", order.order_number);
        Ok(())
    }

    async fn order_for_event(&self, event: &PaymentEvent) -> Result<Order, ReconcilerError> {
        let order_id = event.field("order_id");
        self.find_order(&order_id).await?.ok_or(ReconcilerError::OrderNotFound(order_id))
    }

    /// Resolve the order an event refers to. The identifier is tried as a human-facing order number first, then as
    /// an order access key, and finally as a raw internal numeric id. First match wins.
    async fn find_order(&self, order_id: &str) -> Result<Option<Order>, ReconcilerError> {
        if let Some(order) = self.store.find_by_order_number(order_id).await? {
            return Ok(Some(order));
        }
        if let Some(order) = self.store.find_by_order_key(order_id).await? {
            return Ok(Some(order));
        }
        if let Ok(id) = order_id.parse::<i64>() {
            if let Some(order) = self.store.find_by_internal_id(id).await? {
                return Ok(Some(order));
            }
        }
        Ok(None)
    }
}

#[derive(Debug, Clone, Error)]
pub enum ReconcilerError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),
    #[error("{0}")]
    StoreError(#[from] OrderStoreError),
}
