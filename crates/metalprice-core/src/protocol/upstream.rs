//! `/v1/latest` response body.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{PriceProxyError, Result};

const UNKNOWN_ERROR: &str = "unknown upstream error";

/// Upstream body, e.g.
/// `{"success": true, "base": "USD", "timestamp": 1700000000, "rates": {"XAU": 0.0005}}`.
///
/// Rates are kept as raw JSON values; a non-numeric rate is treated as absent
/// by the transformer rather than failing the whole body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rates: HashMap<String, Value>,
    /// String, or an object such as `{"statusCode": 101, "message": "..."}`.
    #[serde(default)]
    pub error: Option<Value>,
}

/// `null` reads as the field's default, same as a missing field.
fn null_as_default<'de, D, T>(de: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

impl UpstreamResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| PriceProxyError::UpstreamContract {
            reason: format!("malformed upstream body: {e}"),
            body: None,
        })
    }

    /// Numeric rate for `code`, or None when missing or not a number.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).and_then(Value::as_f64)
    }

    /// Human-readable upstream error message.
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Object(obj)) => ["message", "info", "type"]
                .iter()
                .find_map(|k| obj.get(*k).and_then(Value::as_str))
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(obj.clone()).to_string()),
            _ => UNKNOWN_ERROR.to_string(),
        }
    }

    /// Ok when the upstream reported success, otherwise its message as
    /// `UpstreamRejected`.
    pub fn ensure_success(&self) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(PriceProxyError::UpstreamRejected(self.error_message()))
        }
    }
}
