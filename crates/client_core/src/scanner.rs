//! Bridges a barcode decoder (camera, keyboard-wedge scanner, ...) to the
//! coupon store.
//!
//! After a decode the source is paused while the coupon is saved. A failed
//! save resumes decoding; a successful one ends the scan. A source that cannot
//! start sends the user to manual entry instead.

use std::{fmt, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use shared::{domain::Coupon, protocol::BarcodeData};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{coupons::CouponStore, error::WalletError, events::WalletEvent, forms};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarcodeFormat {
    Ean13,
    Ean8,
    Code128,
    Code39,
    QrCode,
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BarcodeFormat::Ean13 => "EAN-13",
            BarcodeFormat::Ean8 => "EAN-8",
            BarcodeFormat::Code128 => "Code 128",
            BarcodeFormat::Code39 => "Code 39",
            BarcodeFormat::QrCode => "QR",
        })
    }
}

/// Symbologies deposit-return coupons are printed with.
pub const SUPPORTED_FORMATS: [BarcodeFormat; 5] = [
    BarcodeFormat::Ean13,
    BarcodeFormat::Ean8,
    BarcodeFormat::Code128,
    BarcodeFormat::Code39,
    BarcodeFormat::QrCode,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBarcode {
    pub text: String,
    pub format: Option<BarcodeFormat>,
}

impl DecodedBarcode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: None,
        }
    }

    /// Guesses the symbology from the payload shape: 13 or 8 digits are EAN,
    /// anything else is left undetermined.
    pub fn classify(text: impl Into<String>) -> Self {
        let text = text.into();
        let digits = text.bytes().all(|b| b.is_ascii_digit());
        let format = match text.len() {
            13 if digits => Some(BarcodeFormat::Ean13),
            8 if digits => Some(BarcodeFormat::Ean8),
            _ => None,
        };
        Self { text, format }
    }
}

#[async_trait]
pub trait BarcodeSource: Send {
    /// Fails when the device is unavailable or permission is denied.
    async fn start(&mut self, formats: &[BarcodeFormat]) -> Result<()>;
    /// Next decoded barcode; `None` once the source is exhausted.
    async fn next_decoded(&mut self) -> Result<Option<DecodedBarcode>>;
    fn pause(&mut self);
    fn resume(&mut self);
    async fn stop(&mut self) -> Result<()>;
}

#[derive(Debug)]
pub enum ScanOutcome {
    Saved(Coupon),
    ManualEntryRequired { reason: String },
    SourceClosed,
}

pub struct ScannerAdapter<S: BarcodeSource> {
    source: S,
    coupons: Arc<CouponStore>,
    events: broadcast::Sender<WalletEvent>,
    value: Option<(f64, Option<String>)>,
}

impl<S: BarcodeSource> ScannerAdapter<S> {
    pub fn new(source: S, coupons: Arc<CouponStore>, events: broadcast::Sender<WalletEvent>) -> Self {
        Self {
            source,
            coupons,
            events,
            value: None,
        }
    }

    /// Value attached to every coupon saved by this scan.
    pub fn with_value(mut self, amount: f64, currency: Option<String>) -> Self {
        self.value = Some((amount, currency));
        self
    }

    pub fn into_source(self) -> S {
        self.source
    }

    pub async fn run(&mut self) -> ScanOutcome {
        if let Err(err) = self.source.start(&SUPPORTED_FORMATS).await {
            warn!(error = %err, "scanner: failed to start");
            self.notify(WalletEvent::error("Failed to start camera scanner"));
            return ScanOutcome::ManualEntryRequired {
                reason: err.to_string(),
            };
        }

        loop {
            let decoded = match self.source.next_decoded().await {
                Ok(Some(decoded)) => decoded,
                Ok(None) => {
                    self.shutdown().await;
                    return ScanOutcome::SourceClosed;
                }
                Err(err) => {
                    warn!(error = %err, "scanner: decoder failed");
                    self.shutdown().await;
                    return ScanOutcome::ManualEntryRequired {
                        reason: err.to_string(),
                    };
                }
            };

            self.source.pause();
            let Ok(barcode) = forms::barcode(&decoded.text) else {
                debug!("scanner: ignoring blank decode");
                self.source.resume();
                continue;
            };
            debug!(format = ?decoded.format, "scanner: decoded barcode");

            let data = barcode_data(barcode, self.value.clone());
            match self.coupons.save_coupon(data).await {
                Ok(coupon) => {
                    info!(coupon_id = %coupon.id, "scanner: coupon saved");
                    self.notify(WalletEvent::success("Coupon saved successfully!"));
                    self.shutdown().await;
                    return ScanOutcome::Saved(coupon);
                }
                Err(err) => {
                    warn!(error = %err, "scanner: save failed, resuming");
                    self.notify(WalletEvent::error("Failed to save coupon"));
                    self.source.resume();
                }
            }
        }
    }

    async fn shutdown(&mut self) {
        if let Err(err) = self.source.stop().await {
            warn!(error = %err, "scanner: error stopping source");
        }
    }

    fn notify(&self, event: WalletEvent) {
        let _ = self.events.send(event);
    }
}

fn barcode_data(barcode: String, value: Option<(f64, Option<String>)>) -> BarcodeData {
    let data = BarcodeData::new(barcode);
    match value {
        Some((amount, currency)) => data.with_value(amount, currency),
        None => data,
    }
}

/// Saves a barcode typed by the user.
pub async fn save_manual_entry(
    coupons: &CouponStore,
    events: &broadcast::Sender<WalletEvent>,
    input: &str,
    value: Option<(f64, Option<String>)>,
) -> std::result::Result<Coupon, WalletError> {
    let barcode = match forms::barcode(input) {
        Ok(barcode) => barcode,
        Err(err) => {
            let _ = events.send(WalletEvent::error(err.to_string()));
            return Err(err);
        }
    };

    match coupons.save_coupon(barcode_data(barcode, value)).await {
        Ok(coupon) => {
            let _ = events.send(WalletEvent::success("Coupon saved successfully!"));
            Ok(coupon)
        }
        Err(err) => {
            let _ = events.send(WalletEvent::error("Failed to save coupon"));
            Err(err)
        }
    }
}

#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
mod tests;
