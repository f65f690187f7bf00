use serde::{Deserialize, Serialize};

use crate::domain::User;

pub const SIGNUP_PATH: &str = "api/auth/signup";
pub const SIGNIN_PATH: &str = "api/auth/signin";
pub const VERIFY_OTP_PATH: &str = "api/auth/verify-otp";
pub const RESEND_OTP_PATH: &str = "api/auth/resend-otp";
pub const REQUEST_PASSWORD_RESET_PATH: &str = "api/auth/request-password-reset";
pub const RESET_PASSWORD_PATH: &str = "api/auth/reset-password";
pub const ME_PATH: &str = "api/auth/me";
pub const COUPONS_PATH: &str = "api/coupons";

pub fn coupon_path(coupon_id: &str) -> String {
    format!("{COUPONS_PATH}/{coupon_id}")
}

pub fn mark_used_path(coupon_id: &str) -> String {
    format!("{COUPONS_PATH}/{coupon_id}/mark-used")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigninResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Body shared by resend-otp and request-password-reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

/// Informational `{msg}` body returned by the auth endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarcodeData {
    pub barcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl BarcodeData {
    pub fn new(barcode: impl Into<String>) -> Self {
        Self {
            barcode: barcode.into(),
            value: None,
            currency: None,
        }
    }

    pub fn with_value(mut self, value: f64, currency: Option<String>) -> Self {
        self.value = Some(value);
        self.currency = currency;
        self
    }
}
