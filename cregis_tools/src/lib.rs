mod api;
mod config;
mod error;
mod signing;

mod data_objects;

pub mod helpers;

pub use api::{CregisApi, CHECKOUT_ENDPOINT, CHECKOUT_QUERY_ENDPOINT, SUCCESS_CODE};
pub use config::CregisConfig;
pub use data_objects::{CheckoutRequest, OrderDetails, OrderItem, PaymentOrderReference};
pub use error::CregisApiError;
pub use signing::{sign_params, verify_signature, SIGN_FIELD};
