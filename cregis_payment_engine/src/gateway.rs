use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use cregis_tools::{CheckoutRequest, CregisApi, CregisApiError, OrderDetails, OrderItem, PaymentOrderReference};

use crate::{
    order_types::{meta, Order, OrderStatus},
    traits::{OrderStore, OrderStoreError, Storefront},
};

/// Merchant-level settings applied to every checkout order this gateway opens.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Minutes until an unpaid checkout order expires.
    pub valid_time: u32,
    /// Tokens the customer may pay with. Empty means all tokens the processor supports.
    pub accepted_tokens: Vec<String>,
    /// Language for the hosted checkout page.
    pub language: String,
    pub accept_partial: bool,
    pub accept_over: bool,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            valid_time: 60,
            accepted_tokens: Vec::new(),
            language: "en".to_string(),
            accept_partial: true,
            accept_over: true,
        }
    }
}

/// Outcome handed back to the host checkout flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum PaymentResult {
    /// A checkout order was opened; send the customer to `redirect`.
    Success { redirect: String },
    /// The checkout could not be opened. The customer-facing notice has already been delivered.
    Failure,
}

/// Sequences checkout creation: collect order data, open a checkout order with the processor, persist the returned
/// reference, and hand back the redirect target.
pub struct PaymentGateway<B, S> {
    store: B,
    shopfront: S,
    api: CregisApi,
    options: GatewayOptions,
}

impl<B, S> PaymentGateway<B, S>
where
    B: OrderStore,
    S: Storefront,
{
    pub fn new(store: B, shopfront: S, api: CregisApi, options: GatewayOptions) -> Self {
        Self { store, shopfront, api, options }
    }

    /// Kick off payment for the order with internal id `order_id`.
    ///
    /// On failure the customer receives a single human-readable notice, the failure result is returned, and no order
    /// state has been mutated. Diagnostic detail goes to the log only.
    pub async fn process_payment(&self, order_id: i64) -> PaymentResult {
        match self.try_process_payment(order_id).await {
            Ok(reference) => PaymentResult::Success { redirect: reference.checkout_url },
            Err(e) => {
                warn!("Payment creation for order {order_id} failed. {e}");
                self.shopfront.error_notice(&e.user_message()).await;
                PaymentResult::Failure
            },
        }
    }

    async fn try_process_payment(&self, order_id: i64) -> Result<PaymentOrderReference, GatewayError> {
        let order =
            self.store.find_by_internal_id(order_id).await?.ok_or(GatewayError::OrderNotFound(order_id))?;
        let request = self.checkout_request_for(&order);
        let reference = self.api.create_payment(&order.order_number, &request).await?;
        self.store.write_meta(&order, meta::CREGIS_ID, &reference.cregis_id).await?;
        self.store.write_meta(&order, meta::CHECKOUT_URL, &reference.checkout_url).await?;
        self.store.write_meta(&order, meta::CREATED_TIME, &reference.created_time).await?;
        self.store.write_meta(&order, meta::EXPIRE_TIME, &reference.expire_time).await?;
        self.store.save(&order).await?;
        self.store.set_status(&order, OrderStatus::Pending, "Awaiting cryptocurrency payment").await?;
        self.shopfront.clear_cart().await;
        info!("Created checkout {} for order {}", reference.cregis_id, order.order_number);
        Ok(reference)
    }

    /// The current payment state of an order, straight from the processor. Prefers the stored checkout reference and
    /// falls back to querying by order number.
    pub async fn payment_status(&self, order_id: i64) -> Result<Value, GatewayError> {
        let order =
            self.store.find_by_internal_id(order_id).await?.ok_or(GatewayError::OrderNotFound(order_id))?;
        let cregis_id = self.store.read_meta(&order, meta::CREGIS_ID).await?;
        let data = match cregis_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => self.api.query_payment(Some(id), None).await?,
            None => self.api.query_payment(None, Some(&order.order_number)).await?,
        };
        Ok(data)
    }

    fn checkout_request_for(&self, order: &Order) -> CheckoutRequest {
        let payer_id = order
            .customer_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| order.billing_email.clone());
        let items = order
            .line_items
            .iter()
            .map(|item| OrderItem {
                item_id: item.product_id.to_string(),
                item_name: item.name.clone(),
                item_price: if item.quantity == 0 { 0.0 } else { item.total / f64::from(item.quantity) },
                price_currency: order.currency.clone(),
                item_quantity: item.quantity,
            })
            .collect::<Vec<OrderItem>>();
        let order_details = (!items.is_empty()).then(|| OrderDetails {
            items,
            shopping_cost: order.shipping_total,
            tax_cost: order.tax_total,
        });
        CheckoutRequest {
            amount: order.total.clone(),
            currency: order.currency.clone(),
            payer_id,
            payer_name: order.billing_name.clone(),
            payer_email: order.billing_email.clone(),
            valid_time: self.options.valid_time,
            callback_url: self.shopfront.webhook_url(),
            success_url: self.shopfront.return_url(order),
            cancel_url: self.shopfront.checkout_url(),
            remark: Some(format!("Order #{}", order.order_number)),
            tokens: self.options.accepted_tokens.clone(),
            language: Some(self.options.language.clone()),
            order_details,
            accept_partial_payment: Some(self.options.accept_partial),
            accept_over_payment: Some(self.options.accept_over),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Order {0} not found")]
    OrderNotFound(i64),
    #[error("{0}")]
    StoreError(#[from] OrderStoreError),
    #[error("{0}")]
    ApiError(#[from] CregisApiError),
}

impl GatewayError {
    /// The message shown to the end customer. The processor's own rejection message is passed through; everything
    /// else collapses to a generic line so internal diagnostics stay out of the storefront.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::OrderNotFound(_) => "Order not found".to_string(),
            GatewayError::ApiError(CregisApiError::ApiError { message, .. }) => message.clone(),
            _ => "Failed to create payment".to_string(),
        }
    }
}
