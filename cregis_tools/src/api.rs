use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde_json::{json, Map, Value};

use crate::{
    config::CregisConfig,
    data_objects::{CheckoutRequest, PaymentOrderReference},
    helpers::{generate_nonce, unix_time_millis, NONCE_LENGTH},
    signing,
    CregisApiError,
};

pub const CHECKOUT_ENDPOINT: &str = "api/v2/checkout";
pub const CHECKOUT_QUERY_ENDPOINT: &str = "api/v2/checkout/query";
/// The `code` value the processor places in a response body to indicate success.
pub const SUCCESS_CODE: &str = "00000";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Cregis checkout API.
///
/// Every call signs its parameters with the merchant API key, performs exactly one network round trip and reports
/// failures as [`CregisApiError`] values. Retry policy, if any, belongs to the caller.
#[derive(Clone)]
pub struct CregisApi {
    config: CregisConfig,
    client: Arc<Client>,
}

impl CregisApi {
    pub fn new(config: CregisConfig) -> Result<Self, CregisApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CregisApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.config.api_url.trim_end_matches('/'))
    }

    /// Create a checkout order for `order_id` and return the processor's reference to it.
    pub async fn create_payment(
        &self,
        order_id: &str,
        request: &CheckoutRequest,
    ) -> Result<PaymentOrderReference, CregisApiError> {
        let mut params = Map::new();
        params.insert("pid".into(), json!(self.config.pid));
        params.insert("order_id".into(), json!(order_id));
        params.insert("order_amount".into(), json!(request.amount.as_str()));
        params.insert("order_currency".into(), json!(request.currency));
        params.insert("payer_id".into(), json!(request.payer_id));
        params.insert("payer_name".into(), json!(request.payer_name));
        params.insert("payer_email".into(), json!(request.payer_email));
        params.insert("valid_time".into(), json!(request.valid_time));
        params.insert("callback_url".into(), json!(request.callback_url));
        params.insert("success_url".into(), json!(request.success_url));
        params.insert("cancel_url".into(), json!(request.cancel_url));
        if let Some(remark) = request.remark.as_deref().filter(|r| !r.is_empty()) {
            params.insert("remark".into(), json!(remark));
        }
        if !request.tokens.is_empty() {
            params.insert("tokens".into(), Value::String(encode_composite(&request.tokens, CHECKOUT_ENDPOINT)?));
        }
        if let Some(language) = request.language.as_deref().filter(|l| !l.is_empty()) {
            params.insert("language".into(), json!(language));
        }
        if let Some(details) = &request.order_details {
            params.insert("order_details".into(), Value::String(encode_composite(details, CHECKOUT_ENDPOINT)?));
        }
        if let Some(accept) = request.accept_partial_payment {
            params.insert("accept_partial_payment".into(), json!(bool_literal(accept)));
        }
        if let Some(accept) = request.accept_over_payment {
            params.insert("accept_over_payment".into(), json!(bool_literal(accept)));
        }
        params.insert("nonce".into(), json!(generate_nonce(NONCE_LENGTH)));
        params.insert("timestamp".into(), json!(unix_time_millis()));

        debug!("Creating checkout order for order {order_id}");
        let data = self.post_signed(CHECKOUT_ENDPOINT, params).await?;
        let reference: PaymentOrderReference = serde_json::from_value(data)
            .map_err(|e| CregisApiError::JsonError { endpoint: CHECKOUT_ENDPOINT.into(), message: e.to_string() })?;
        info!("Created checkout order {} for order {order_id}", reference.cregis_id);
        Ok(reference)
    }

    /// Look up a checkout order by the processor's id, the merchant's order id, or both.
    pub async fn query_payment(
        &self,
        cregis_id: Option<&str>,
        order_id: Option<&str>,
    ) -> Result<Value, CregisApiError> {
        if cregis_id.is_none() && order_id.is_none() {
            return Err(CregisApiError::MissingIdentifier);
        }
        let mut params = Map::new();
        params.insert("pid".into(), json!(self.config.pid));
        params.insert("nonce".into(), json!(generate_nonce(NONCE_LENGTH)));
        params.insert("timestamp".into(), json!(unix_time_millis()));
        if let Some(id) = cregis_id {
            params.insert("cregis_id".into(), json!(id));
        }
        if let Some(id) = order_id {
            params.insert("order_id".into(), json!(id));
        }
        self.post_signed(CHECKOUT_QUERY_ENDPOINT, params).await
    }

    /// Check the signature on an inbound webhook payload.
    pub fn verify_webhook_signature(&self, payload: &Map<String, Value>) -> bool {
        signing::verify_signature(payload, self.config.api_key.reveal())
    }

    /// Sign the parameters, POST them, and normalize the response down to its `data` payload.
    async fn post_signed(&self, endpoint: &str, mut params: Map<String, Value>) -> Result<Value, CregisApiError> {
        let sign = signing::sign_params(&params, self.config.api_key.reveal());
        params.insert(signing::SIGN_FIELD.into(), Value::String(sign));
        let url = self.url(endpoint);
        if self.config.debug {
            debug!("POST {url}: {}", Value::Object(params.clone()));
        }
        let response = self.client.post(&url).json(&params).send().await.map_err(|e| {
            error!("Request to {endpoint} did not complete. {e}");
            CregisApiError::Transport { endpoint: endpoint.to_string(), message: e.to_string() }
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Could not read response body from {endpoint}. {e}");
            CregisApiError::Transport { endpoint: endpoint.to_string(), message: e.to_string() }
        })?;
        if !status.is_success() {
            error!("{endpoint} returned HTTP {status}. {body}");
            return Err(CregisApiError::ResponseError { endpoint: endpoint.to_string(), status: status.as_u16(), body });
        }
        let body: Value = serde_json::from_str(&body).map_err(|e| {
            error!("Could not parse response from {endpoint}. {e}");
            CregisApiError::JsonError { endpoint: endpoint.to_string(), message: e.to_string() }
        })?;
        if self.config.debug {
            debug!("{endpoint} response: {body}");
        }
        if let Some(code) = body.get("code").and_then(Value::as_str) {
            if code != SUCCESS_CODE {
                let message = body.get("msg").and_then(Value::as_str).unwrap_or("Unknown error").to_string();
                error!("{endpoint} returned error code {code}: {message}");
                return Err(CregisApiError::ApiError { endpoint: endpoint.to_string(), code: code.to_string(), message });
            }
        }
        Ok(body.get("data").cloned().unwrap_or_else(|| Value::Object(Map::new())))
    }
}

fn bool_literal(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Composite request fields travel as compact JSON strings, both on the wire and under the signature.
fn encode_composite<T: serde::Serialize>(value: &T, endpoint: &str) -> Result<String, CregisApiError> {
    serde_json::to_string(value)
        .map_err(|e| CregisApiError::JsonError { endpoint: endpoint.to_string(), message: e.to_string() })
}
