//! Typed HTTP client for the wallet backend.
//!
//! Every call is a single request; no retries, no timeouts beyond the
//! transport defaults. A bearer token, once set, is attached to every request.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{Coupon, CouponFilter, CouponId, User},
    error::{ApiErrorBody, ErrorCode},
    protocol::{
        coupon_path, mark_used_path, BarcodeData, EmailRequest, MessageResponse,
        ResetPasswordRequest, SigninRequest, SigninResponse, SignupRequest, VerifyOtpRequest,
        COUPONS_PATH, ME_PATH, REQUEST_PASSWORD_RESET_PATH, RESEND_OTP_PATH, RESET_PASSWORD_PATH,
        SIGNIN_PATH, SIGNUP_PATH, VERIFY_OTP_PATH,
    },
};
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::error::{Result, WalletError};

pub struct ApiClient {
    http: Client,
    base_url: Url,
    bearer: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_http_client(Client::new(), base_url)
    }

    pub fn with_http_client(http: Client, base_url: &str) -> Result<Self> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            bearer: RwLock::new(None),
        })
    }

    pub async fn set_bearer(&self, token: Option<String>) {
        *self.bearer.write().await = token;
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<MessageResponse> {
        self.send_json(Method::POST, SIGNUP_PATH, Some(request))
            .await
    }

    pub async fn signin(&self, request: &SigninRequest) -> Result<SigninResponse> {
        self.send_json(Method::POST, SIGNIN_PATH, Some(request))
            .await
    }

    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<MessageResponse> {
        self.send_json(Method::POST, VERIFY_OTP_PATH, Some(request))
            .await
    }

    pub async fn resend_otp(&self, request: &EmailRequest) -> Result<MessageResponse> {
        self.send_json(Method::POST, RESEND_OTP_PATH, Some(request))
            .await
    }

    pub async fn request_password_reset(&self, request: &EmailRequest) -> Result<MessageResponse> {
        self.send_json(Method::POST, REQUEST_PASSWORD_RESET_PATH, Some(request))
            .await
    }

    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<MessageResponse> {
        self.send_json(Method::POST, RESET_PASSWORD_PATH, Some(request))
            .await
    }

    pub async fn me(&self) -> Result<User> {
        self.send_json(Method::GET, ME_PATH, None::<&()>).await
    }

    pub async fn list_coupons(&self, filter: CouponFilter) -> Result<Vec<Coupon>> {
        let mut url = self.endpoint(COUPONS_PATH)?;
        if let Some(used) = filter.used_param() {
            url.query_pairs_mut()
                .append_pair("used", if used { "true" } else { "false" });
        }
        let response = self.execute(self.http.get(url)).await?;
        decode_json(response).await
    }

    pub async fn create_coupon(&self, barcode: &BarcodeData) -> Result<Coupon> {
        self.send_json(Method::POST, COUPONS_PATH, Some(barcode))
            .await
    }

    pub async fn mark_coupon_used(&self, coupon_id: CouponId) -> Result<Coupon> {
        self.send_json(
            Method::PUT,
            &mark_used_path(&coupon_id.to_string()),
            None::<&()>,
        )
        .await
    }

    pub async fn delete_coupon(&self, coupon_id: CouponId) -> Result<()> {
        let url = self.endpoint(&coupon_path(&coupon_id.to_string()))?;
        self.execute(self.http.delete(url)).await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|err| WalletError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: err.to_string(),
            })
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.execute(builder).await?;
        decode_json(response).await
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let builder = match self.bearer.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        let request = builder.build()?;
        debug!(method = %request.method(), url = %request.url(), "api: sending request");

        let response = self.http.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.bytes().await.unwrap_or_default();
        let detail = ApiErrorBody::parse(&raw).message();
        debug!(status = status.as_u16(), ?detail, "api: request rejected");
        Err(WalletError::Api {
            status: status.as_u16(),
            code: ErrorCode::from_status(status.as_u16()),
            detail,
        })
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let raw = response.bytes().await?;
    serde_json::from_slice(&raw).map_err(|err| WalletError::Decode(err.to_string()))
}

fn normalize_base_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| WalletError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https".into()));
    }
    // Relative joins replace the last path segment unless the base ends in '/'.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash_so_prefixes_survive_join() {
        let url = normalize_base_url("https://wallet.example.com/backend").expect("url");
        assert_eq!(
            url.join(SIGNIN_PATH).expect("join").as_str(),
            "https://wallet.example.com/backend/api/auth/signin"
        );
    }

    #[test]
    fn bare_host_joins_to_root_api() {
        let url = normalize_base_url("http://127.0.0.1:8000").expect("url");
        assert_eq!(
            url.join(COUPONS_PATH).expect("join").as_str(),
            "http://127.0.0.1:8000/api/coupons"
        );
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(matches!(
            normalize_base_url("ftp://example.com"),
            Err(WalletError::InvalidBaseUrl { .. })
        ));
        assert!(normalize_base_url("not a url").is_err());
    }
}
