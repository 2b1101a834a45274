//! # Cregis payment gateway server
//!
//! This crate hosts the HTTP edge of the gateway. It is responsible for:
//! * Receiving webhook notifications from the payment processor, verifying their signatures, and handing them to the
//!   reconciler.
//! * Exposing a checkout endpoint that opens payment orders via the processor API.
//!
//! ## Configuration
//! The server is configured via `CPG_*` environment variables. See [config](config/index.html) for details.
//!
//! ## Routes
//! * `/health`: liveness check.
//! * `POST /webhook/cregis`: the processor's asynchronous notification endpoint.
//! * `POST /checkout/{order_id}`: open a checkout order and return the redirect target.
//! * `GET /checkout/status/{order_id}`: the processor's current view of an order's payment state.

pub mod cli;
pub mod config;
pub mod errors;
pub mod routes;
pub mod server;
pub mod storefront;

#[cfg(test)]
mod endpoint_tests;
