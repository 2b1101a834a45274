use cregis_payment_engine::{order_types::Order, traits::Storefront};
use log::*;

/// Storefront wiring for running the gateway without a host commerce platform.
///
/// Notices go to the log, clearing the cart is a no-op, and customer-facing URLs are derived from the server's own
/// address. A real deployment replaces this with a bridge into the platform's session and notice machinery.
#[derive(Debug, Clone)]
pub struct StandaloneStorefront {
    base_url: String,
}

impl StandaloneStorefront {
    pub fn new(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string() }
    }
}

impl Storefront for StandaloneStorefront {
    fn webhook_url(&self) -> String {
        format!("{}/webhook/cregis", self.base_url)
    }

    fn return_url(&self, order: &Order) -> String {
        format!("{}/checkout/status/{}", self.base_url, order.id)
    }

    fn checkout_url(&self) -> String {
        self.base_url.clone()
    }

    async fn error_notice(&self, message: &str) {
        warn!("Checkout notice: {message}");
    }

    async fn clear_cart(&self) {}
}
