//! Cregis Payment Engine
//!
//! The core logic for reconciling a host commerce platform's orders with the Cregis payment processor. It is
//! host-agnostic: the commerce platform is reached exclusively through the [`traits::OrderStore`] and
//! [`traits::Storefront`] traits, so the engine can be driven by any backend (including the in-memory store in
//! [`stores`], which the tests and the development server use).
//!
//! The library is divided into two flows:
//! 1. Outbound checkout creation ([`PaymentGateway`]): collect order data, open a checkout order with the processor,
//!    persist the returned reference and hand the customer a redirect.
//! 2. Inbound reconciliation ([`OrderReconciler`]): apply verified webhook events to the order store as idempotent
//!    state transitions. Callers must verify webhook signatures (via
//!    [`cregis_tools::CregisApi::verify_webhook_signature`]) before handing events to the reconciler.

mod gateway;
mod reconciler;

pub mod events;
pub mod order_types;
pub mod stores;
pub mod traits;

pub use gateway::{GatewayError, GatewayOptions, PaymentGateway, PaymentResult};
pub use reconciler::{OrderReconciler, ReconcilerError};
