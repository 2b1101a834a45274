mod amount;
mod secret;

pub mod helpers;

pub use amount::{Amount, AmountError};
pub use helpers::parse_boolean_flag;
pub use secret::Secret;
