use chrono::{DateTime, Utc};
use client_core::CouponSummary;
use shared::domain::{Coupon, User};

fn stamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

pub fn coupon_row(coupon: &Coupon) -> String {
    let status = if coupon.is_used { "used" } else { "unused" };
    let amount = coupon.amount_label().unwrap_or_else(|| "-".into());
    format!(
        "{}  {:<20}  {:<6}  {:>10}  {}",
        coupon.id,
        coupon.barcode,
        status,
        amount,
        stamp(&coupon.scanned_at)
    )
}

pub fn coupon_table(coupons: &[Coupon]) -> String {
    if coupons.is_empty() {
        return "No coupons found.".into();
    }
    coupons.iter().map(coupon_row).collect::<Vec<_>>().join("\n")
}

/// Home dashboard: greeting plus counts and the value still to redeem.
pub fn home(user: Option<&User>, summary: &CouponSummary) -> String {
    let mut out = match user {
        Some(user) => format!("Welcome, {}!\n", user.display_name()),
        None => "Welcome!\n".into(),
    };
    out.push_str(&format!(
        "Unused coupons: {}\nUsed coupons:   {}\n",
        summary.unused, summary.used
    ));
    for (currency, total) in &summary.unused_value {
        out.push_str(&format!("Redeemable:     {total:.2} {currency}\n"));
    }
    out.trim_end().to_string()
}

/// What the cashier scans: the barcode spelled out large enough to key in.
pub fn payout_card(coupon: &Coupon) -> String {
    let spaced: String = coupon
        .barcode
        .chars()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let width = spaced.chars().count() + 4;
    let border = "=".repeat(width);
    let mut out = format!("{border}\n  {spaced}  \n{border}\n");
    if let Some(amount) = coupon.amount_label() {
        out.push_str(&format!("Value: {amount}\n"));
    }
    out.push_str(&format!("Scanned: {}", stamp(&coupon.scanned_at)));
    if let Some(used_at) = &coupon.used_at {
        out.push_str(&format!("\nUsed: {}", stamp(used_at)));
    }
    out
}

pub fn user(user: &User) -> String {
    let mut out = format!("{} <{}>", user.display_name(), user.email);
    if !user.is_verified {
        out.push_str(" (unverified)");
    }
    if let Some(last_login) = &user.last_login {
        out.push_str(&format!("\nLast login: {}", stamp(last_login)));
    }
    out
}
