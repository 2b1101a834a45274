use thiserror::Error;

/// Failures raised by [`crate::CregisApi`].
///
/// Transport, protocol and application failures are all expected in normal operation and are reported as values, not
/// panics. Each variant carries the endpoint so a log line is enough to diagnose the call without replaying secrets.
#[derive(Debug, Clone, Error)]
pub enum CregisApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Request to {endpoint} did not complete: {message}")]
    Transport { endpoint: String, message: String },
    #[error("Request to {endpoint} failed. HTTP {status}. {body}")]
    ResponseError { endpoint: String, status: u16, body: String },
    #[error("Could not deserialize response from {endpoint}: {message}")]
    JsonError { endpoint: String, message: String },
    #[error("{endpoint} returned error code {code}: {message}")]
    ApiError { endpoint: String, code: String, message: String },
    #[error("At least one of cregis_id or order_id must be supplied")]
    MissingIdentifier,
}
