//! Checks the forms run before handing input to a store.

use crate::error::{Result, WalletError};

pub const MIN_PASSWORD_LEN: usize = 8;

fn require(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WalletError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

pub fn email(value: &str) -> Result<String> {
    let email = require(value, "Please enter your email")?;
    if !email.contains('@') {
        return Err(WalletError::Validation(
            "Please enter a valid email address".into(),
        ));
    }
    Ok(email)
}

pub fn otp(value: &str) -> Result<String> {
    require(value, "Please enter the verification code")
}

pub fn barcode(value: &str) -> Result<String> {
    require(value, "Please enter a valid barcode")
}

/// Passwords are not trimmed; the length rule counts characters.
pub fn new_password(password: &str, confirmation: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(WalletError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password != confirmation {
        return Err(WalletError::Validation("Passwords do not match".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barcode_is_trimmed_and_blank_rejected() {
        assert_eq!(barcode("  4006381333931 \n").expect("ok"), "4006381333931");
        let err = barcode("   ").expect_err("blank");
        assert_eq!(err.to_string(), "Please enter a valid barcode");
    }

    #[test]
    fn password_rules() {
        assert!(new_password("short", "short").is_err());
        assert!(new_password("long enough", "long enougH").is_err());
        assert!(new_password("long enough", "long enough").is_ok());
    }

    #[test]
    fn email_needs_at_sign() {
        assert!(email("alice").is_err());
        assert_eq!(email(" alice@example.com ").expect("ok"), "alice@example.com");
    }

    #[test]
    fn otp_must_not_be_empty() {
        assert!(otp("").is_err());
        assert_eq!(otp(" 123456 ").expect("ok"), "123456");
    }
}
