use shared::error::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{}", describe_rejection(.status, .detail))]
    Api {
        status: u16,
        code: ErrorCode,
        detail: Option<String>,
    },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("local storage error: {0}")]
    Storage(String),
    #[error("{0}")]
    Validation(String),
    #[error("not signed in")]
    NotAuthenticated,
    #[error("invalid api base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

fn describe_rejection(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => detail.clone(),
        None => format!("request failed with status code {status}"),
    }
}

impl WalletError {
    /// Server-provided `detail` when there is one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            WalletError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Text for a notification: the backend `detail`, a local validation
    /// message, or `fallback` for everything else.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            WalletError::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            WalletError::Validation(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            WalletError::Api {
                code: ErrorCode::Unauthorized,
                ..
            } | WalletError::NotAuthenticated
        )
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_without_detail_mentions_status() {
        let err = WalletError::Api {
            status: 500,
            code: ErrorCode::Internal,
            detail: None,
        };
        assert_eq!(err.to_string(), "request failed with status code 500");
        assert_eq!(err.user_message("Failed to save coupon"), "Failed to save coupon");
    }

    #[test]
    fn rejection_with_detail_prefers_detail() {
        let err = WalletError::Api {
            status: 401,
            code: ErrorCode::Unauthorized,
            detail: Some("Incorrect email or password".into()),
        };
        assert_eq!(err.to_string(), "Incorrect email or password");
        assert_eq!(err.user_message("fallback"), "Incorrect email or password");
        assert!(err.is_unauthorized());
    }
}
