use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    RateLimited,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 => ErrorCode::NotFound,
            400 | 409 | 422 => ErrorCode::Validation,
            429 => ErrorCode::RateLimited,
            _ => ErrorCode::Internal,
        }
    }
}

/// Error body returned by the backend.
///
/// `detail` is usually a human readable string. Request validation failures
/// instead carry a list of `{loc, msg, type}` objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ApiErrorBody {
    pub fn parse(raw: &[u8]) -> Self {
        serde_json::from_slice(raw).unwrap_or_default()
    }

    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            Value::Array(items) => items
                .iter()
                .find_map(|item| item.get("msg").and_then(Value::as_str))
                .map(str::to_string),
            Value::Object(map) => map
                .get("msg")
                .or_else(|| map.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_detail() {
        let body = ApiErrorBody::parse(br#"{"detail":"Invalid OTP."}"#);
        assert_eq!(body.message().as_deref(), Some("Invalid OTP."));
    }

    #[test]
    fn extracts_first_validation_message() {
        let body = ApiErrorBody::parse(
            br#"{"detail":[{"loc":["body","barcode"],"msg":"field required","type":"value_error.missing"}]}"#,
        );
        assert_eq!(body.message().as_deref(), Some("field required"));
    }

    #[test]
    fn missing_or_unparseable_detail_yields_none() {
        assert_eq!(ApiErrorBody::parse(b"").message(), None);
        assert_eq!(ApiErrorBody::parse(b"<html>bad gateway</html>").message(), None);
        assert_eq!(ApiErrorBody::parse(br#"{"error":"x"}"#).message(), None);
    }

    #[test]
    fn maps_status_codes() {
        assert_eq!(ErrorCode::from_status(401), ErrorCode::Unauthorized);
        assert_eq!(ErrorCode::from_status(422), ErrorCode::Validation);
        assert_eq!(ErrorCode::from_status(502), ErrorCode::Internal);
    }
}
