//! One function per screen. Each prints what the page would show and where
//! the user goes next.

use anyhow::{bail, Context, Result};
use client_core::{
    forms,
    navigation::destination,
    scanner::save_manual_entry,
    Action, BarcodeSource, Route, RouteDecision, ScanOutcome, WalletClient, WalletError,
    WalletEvent,
};
use shared::domain::{Coupon, CouponFilter, CouponId};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::{render, scanner_input::LineBarcodeSource};

fn next(action: Action) {
    println!("next: {}", destination(action).path());
}

fn notify(client: &WalletClient, message: &str) {
    let _ = client.events().send(WalletEvent::success(message));
}

async fn require(client: &WalletClient, route: Route) -> Result<()> {
    match client.open(route).await {
        RouteDecision::Render(_) => Ok(()),
        RouteDecision::Redirect(target) => {
            info!(redirect = target.path(), "view requires a session");
            Err(WalletError::NotAuthenticated.into())
        }
        RouteDecision::Loading => bail!("session could not be resolved"),
    }
}

pub async fn signup(
    client: &WalletClient,
    email: &str,
    name: Option<&str>,
    password: &str,
    confirm_password: &str,
) -> Result<()> {
    forms::new_password(password, confirm_password)?;
    client.session.signup(email, password, name).await?;
    println!("Signup successful. Check your email for the verification code.");
    next(Action::SignedUp {
        email: email.trim().to_string(),
    });
    Ok(())
}

pub async fn verify_otp(client: &WalletClient, email: &str, otp: &str) -> Result<()> {
    client.session.verify_otp(email, otp).await?;
    println!("Email verified. You may now sign in.");
    next(Action::OtpVerified);
    Ok(())
}

pub async fn resend_otp(client: &WalletClient, email: &str) -> Result<()> {
    client.session.resend_otp(email).await?;
    println!("A new code was sent to {email}.");
    Ok(())
}

pub async fn signin(client: &WalletClient, email: &str, password: &str) -> Result<()> {
    let user = client.session.signin(email, password).await?;
    println!("Signed in as {}.", user.display_name());
    next(Action::SignedIn);
    Ok(())
}

pub async fn forgot_password(client: &WalletClient, email: &str) -> Result<()> {
    client.session.request_password_reset(email).await?;
    println!("A reset code was sent to {email}.");
    next(Action::PasswordResetRequested {
        email: email.trim().to_string(),
    });
    Ok(())
}

pub async fn reset_password(
    client: &WalletClient,
    email: &str,
    otp: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<()> {
    forms::new_password(new_password, confirm_password)?;
    client.session.reset_password(email, otp, new_password).await?;
    println!("Password reset. You may now sign in.");
    next(Action::PasswordReset);
    Ok(())
}

pub async fn logout(client: &WalletClient) -> Result<()> {
    client.session.logout().await;
    println!("Signed out.");
    next(Action::LoggedOut);
    Ok(())
}

pub async fn whoami(client: &WalletClient) -> Result<()> {
    if !client.session.check_auth().await {
        return Err(WalletError::NotAuthenticated.into());
    }
    let state = client.session.auth_state().await;
    if let Some(user) = state.user() {
        println!("{}", render::user(user));
    }
    Ok(())
}

pub async fn home(client: &WalletClient) -> Result<()> {
    require(client, Route::Home).await?;
    client.coupons.fetch_coupons(CouponFilter::All).await?;
    let state = client.session.auth_state().await;
    let summary = client.coupons.summary().await;
    println!("{}", render::home(state.user(), &summary));
    Ok(())
}

pub async fn coupons(client: &WalletClient, filter: CouponFilter) -> Result<()> {
    require(client, Route::Coupons).await?;
    let coupons = client.coupons.fetch_coupons(filter).await?;
    println!("{}", render::coupon_table(&coupons));
    Ok(())
}

pub struct ScanArgs {
    pub manual: Option<String>,
    pub device: Option<std::path::PathBuf>,
    pub value: Option<f64>,
    pub currency: Option<String>,
}

pub async fn scan(client: &WalletClient, args: ScanArgs) -> Result<()> {
    require(client, Route::Scan).await?;
    let value = args.value.map(|amount| (amount, args.currency.clone()));

    if let Some(input) = args.manual {
        let coupon = save_manual_entry(&client.coupons, client.events(), &input, value).await?;
        println!("{}", render::coupon_row(&coupon));
        next(Action::CouponSaved);
        return Ok(());
    }

    let source = match args.device {
        Some(path) => LineBarcodeSource::device(path),
        None => {
            eprintln!("Scan a coupon (one barcode per line, Ctrl-D to stop)...");
            LineBarcodeSource::stdin()
        }
    };

    match scan_with(client, source, value).await? {
        Some(coupon) => {
            println!("{}", render::coupon_row(&coupon));
            next(Action::CouponSaved);
        }
        None => println!("Scanner closed without a coupon."),
    }
    Ok(())
}

/// Runs one scan over `source`; a source that cannot start falls back to a
/// manual entry prompt.
pub(crate) async fn scan_with<S: BarcodeSource>(
    client: &WalletClient,
    source: S,
    value: Option<(f64, Option<String>)>,
) -> Result<Option<Coupon>> {
    let mut adapter = client.scanner(source);
    if let Some((amount, currency)) = value.clone() {
        adapter = adapter.with_value(amount, currency);
    }

    match adapter.run().await {
        ScanOutcome::Saved(coupon) => Ok(Some(coupon)),
        ScanOutcome::ManualEntryRequired { reason } => {
            info!(%reason, "scan: falling back to manual entry");
            let input = prompt("Enter barcode manually: ").await?;
            let coupon =
                save_manual_entry(&client.coupons, client.events(), &input, value).await?;
            Ok(Some(coupon))
        }
        ScanOutcome::SourceClosed => Ok(None),
    }
}

async fn prompt(label: &str) -> Result<String> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(label.as_bytes()).await?;
    stderr.flush().await?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read manual entry")?;
    Ok(line)
}

/// Without a coupon id lists what can be paid out; with one shows it for the
/// cashier and optionally marks it used.
pub async fn payout(client: &WalletClient, coupon: Option<CouponId>, mark_used: bool) -> Result<()> {
    require(client, Route::Payout).await?;
    let unused = client.coupons.fetch_coupons(CouponFilter::Unused).await?;

    let Some(coupon_id) = coupon else {
        if unused.is_empty() {
            println!("No unused coupons. Scan one with `wallet scan`.");
        } else {
            println!("{}", render::coupon_table(&unused));
        }
        return Ok(());
    };

    let Some(selected) = unused.into_iter().find(|c| c.id == coupon_id) else {
        bail!("coupon {coupon_id} is not among your unused coupons");
    };
    client.coupons.select_coupon(selected.clone()).await;
    println!("{}", render::payout_card(&selected));

    if mark_used {
        let result = client.coupons.mark_coupon_as_used(selected.id).await;
        client.coupons.clear_selected_coupon().await;
        result?;
        notify(client, "Coupon marked as used");
        let remaining = client.coupons.fetch_coupons(CouponFilter::Unused).await?;
        println!("{} unused coupon(s) left.", remaining.len());
    }
    Ok(())
}

pub async fn delete(client: &WalletClient, coupon_id: CouponId) -> Result<()> {
    require(client, Route::Coupons).await?;
    client.coupons.delete_coupon(coupon_id).await?;
    notify(client, "Coupon deleted successfully");
    Ok(())
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
