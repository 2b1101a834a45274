//! Canonical request signing.
//!
//! Both outbound checkout requests and inbound webhook notifications carry a `sign` field computed over the rest of
//! the payload with the merchant API key. The calculation here is the single trust boundary between this gateway and
//! the processor, so the exact same routine is used for signing and for verification.
//!
//! The signature over a parameter map is computed as follows:
//! 1. Remove the `sign` entry, if any.
//! 2. Drop entries whose value is null or the empty string.
//! 3. Sort the remaining keys in ascending byte order.
//! 4. Concatenate the API key, then each key followed by its canonical value.
//! 5. The signature is the lowercase hex MD5 digest of that string.

use md5::{Digest, Md5};
use serde_json::{Map, Value};
use subtle::ConstantTimeEq;

/// The parameter key that carries the signature itself.
pub const SIGN_FIELD: &str = "sign";

/// Canonical text for a single value. `None` means the entry is excluded from the signature.
///
/// Booleans must render as the literals `true`/`false`, and composite values as compact JSON in their stored key
/// order, or the two sides of the trust boundary will disagree.
fn canonical_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Compute the signature for the given parameter map.
pub fn sign_params(params: &Map<String, Value>, api_key: &str) -> String {
    let mut pairs = params
        .iter()
        .filter(|(key, _)| key.as_str() != SIGN_FIELD)
        .filter_map(|(key, value)| canonical_value(value).map(|v| (key.as_str(), v)))
        .collect::<Vec<(&str, String)>>();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    let mut payload = String::from(api_key);
    for (key, value) in pairs {
        payload.push_str(key);
        payload.push_str(&value);
    }
    hex::encode(Md5::digest(payload.as_bytes()))
}

/// Check the `sign` field of an inbound payload against the signature recomputed from its other fields.
///
/// Returns `false` when no `sign` field is present. The comparison is constant-time; an early-out string compare
/// would leak the matching prefix length through response timing.
pub fn verify_signature(payload: &Map<String, Value>, api_key: &str) -> bool {
    let received = match payload.get(SIGN_FIELD).and_then(Value::as_str) {
        Some(s) => s,
        None => return false,
    };
    let calculated = sign_params(payload, api_key);
    calculated.as_bytes().ct_eq(received.as_bytes()).into()
}
