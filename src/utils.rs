use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{BrowseError, Result};

/// Parse a response body, surfacing `{"error": ...}` payloads by their message
pub fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    let value: Value = serde_json::from_str(body)?;
    if let Some(error) = value.get("error") {
        let message = error
            .as_str()
            .or_else(|| error.get("message").and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(BrowseError::InvalidResponse(message));
    }
    Ok(serde_json::from_value(value)?)
}
