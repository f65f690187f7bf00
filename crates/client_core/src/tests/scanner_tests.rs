use super::*;
use crate::{
    api::ApiClient,
    events::NoticeLevel,
    mock_backend::{MockBackend, REJECTED_BARCODE},
};
use anyhow::anyhow;
use std::collections::VecDeque;

const TOKEN: &str = "scanner-test-token";

#[derive(Default)]
struct ScriptedSource {
    decodes: VecDeque<&'static str>,
    fail_start: bool,
    paused: bool,
    calls: Vec<&'static str>,
}

impl ScriptedSource {
    fn yielding(decodes: &[&'static str]) -> Self {
        Self {
            decodes: decodes.iter().copied().collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl BarcodeSource for ScriptedSource {
    async fn start(&mut self, formats: &[BarcodeFormat]) -> Result<()> {
        self.calls.push("start");
        assert_eq!(formats, SUPPORTED_FORMATS.as_slice());
        if self.fail_start {
            return Err(anyhow!("camera permission denied"));
        }
        Ok(())
    }

    async fn next_decoded(&mut self) -> Result<Option<DecodedBarcode>> {
        assert!(!self.paused, "decoder polled while paused");
        self.calls.push("next");
        Ok(self.decodes.pop_front().map(DecodedBarcode::classify))
    }

    fn pause(&mut self) {
        self.calls.push("pause");
        self.paused = true;
    }

    fn resume(&mut self) {
        self.calls.push("resume");
        self.paused = false;
    }

    async fn stop(&mut self) -> Result<()> {
        self.calls.push("stop");
        Ok(())
    }
}

async fn store_and_events() -> (
    Arc<CouponStore>,
    broadcast::Sender<WalletEvent>,
    broadcast::Receiver<WalletEvent>,
    MockBackend,
) {
    let (server_url, backend) = MockBackend::spawn().await;
    backend.issue_token(TOKEN).await;
    let api = Arc::new(ApiClient::new(&server_url).expect("api client"));
    api.set_bearer(Some(TOKEN.to_string())).await;
    let (events, rx) = broadcast::channel(64);
    let store = Arc::new(CouponStore::new(api, events.clone()));
    (store, events, rx, backend)
}

fn notices(rx: &mut broadcast::Receiver<WalletEvent>) -> Vec<(NoticeLevel, String)> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let WalletEvent::Notice { level, message } = event {
            out.push((level, message));
        }
    }
    out
}

#[tokio::test]
async fn decoded_barcode_is_saved_and_scanner_stops() {
    let (store, events, mut rx, backend) = store_and_events().await;
    let mut adapter = ScannerAdapter::new(
        ScriptedSource::yielding(&["4006381333931"]),
        Arc::clone(&store),
        events,
    );

    let outcome = adapter.run().await;

    let ScanOutcome::Saved(coupon) = outcome else {
        panic!("expected saved coupon, got {outcome:?}");
    };
    assert_eq!(coupon.barcode, "4006381333931");
    assert_eq!(
        adapter.into_source().calls,
        vec!["start", "next", "pause", "stop"]
    );
    assert_eq!(backend.coupon_count().await, 1);
    assert_eq!(
        notices(&mut rx),
        vec![(NoticeLevel::Success, "Coupon saved successfully!".to_string())]
    );
}

#[tokio::test]
async fn scanned_coupon_carries_configured_value() {
    let (store, events, _rx, _backend) = store_and_events().await;
    let mut adapter = ScannerAdapter::new(
        ScriptedSource::yielding(&["4006381333931"]),
        Arc::clone(&store),
        events,
    )
    .with_value(1.5, Some("GBP".into()));

    let ScanOutcome::Saved(coupon) = adapter.run().await else {
        panic!("expected saved coupon");
    };

    assert_eq!(coupon.value, Some(1.5));
    assert_eq!(coupon.currency.as_deref(), Some("GBP"));
    assert_eq!(store.snapshot().await.coupons.first(), Some(&coupon));
}

#[tokio::test]
async fn failed_save_resumes_decoding() {
    let (store, events, mut rx, _backend) = store_and_events().await;
    let mut adapter = ScannerAdapter::new(
        ScriptedSource::yielding(&[REJECTED_BARCODE, "12345670"]),
        Arc::clone(&store),
        events,
    );

    let outcome = adapter.run().await;

    assert!(matches!(outcome, ScanOutcome::Saved(ref c) if c.barcode == "12345670"));
    assert_eq!(
        adapter.into_source().calls,
        vec!["start", "next", "pause", "resume", "next", "pause", "stop"]
    );
    let levels: Vec<_> = notices(&mut rx).into_iter().map(|(level, _)| level).collect();
    assert_eq!(levels, vec![NoticeLevel::Error, NoticeLevel::Success]);
    assert_eq!(store.snapshot().await.coupons.len(), 1);
}

#[tokio::test]
async fn start_failure_falls_back_to_manual_entry() {
    let (store, events, mut rx, backend) = store_and_events().await;
    let source = ScriptedSource {
        fail_start: true,
        ..ScriptedSource::yielding(&["4006381333931"])
    };
    let mut adapter = ScannerAdapter::new(source, store, events);

    let outcome = adapter.run().await;

    match outcome {
        ScanOutcome::ManualEntryRequired { reason } => {
            assert!(reason.contains("permission denied"))
        }
        other => panic!("expected manual entry, got {other:?}"),
    }
    assert_eq!(adapter.into_source().calls, vec!["start"]);
    assert_eq!(backend.coupon_count().await, 0);
    assert_eq!(
        notices(&mut rx),
        vec![(NoticeLevel::Error, "Failed to start camera scanner".to_string())]
    );
}

#[tokio::test]
async fn exhausted_source_reports_closed() {
    let (store, events, _rx, _backend) = store_and_events().await;
    let mut adapter = ScannerAdapter::new(ScriptedSource::default(), store, events);

    assert!(matches!(adapter.run().await, ScanOutcome::SourceClosed));
    assert_eq!(adapter.into_source().calls, vec!["start", "next", "stop"]);
}

#[tokio::test]
async fn manual_entry_trims_input_and_rejects_blank() {
    let (store, events, mut rx, backend) = store_and_events().await;

    let err = save_manual_entry(&store, &events, "   ", None)
        .await
        .expect_err("blank input");
    assert_eq!(err.to_string(), "Please enter a valid barcode");
    assert_eq!(backend.coupon_count().await, 0);

    let coupon = save_manual_entry(&store, &events, "  4006381333931 ", Some((0.25, None)))
        .await
        .expect("saved");
    assert_eq!(coupon.barcode, "4006381333931");

    let levels: Vec<_> = notices(&mut rx).into_iter().map(|(level, _)| level).collect();
    assert_eq!(levels, vec![NoticeLevel::Error, NoticeLevel::Success]);
}

#[test]
fn classify_recognises_ean_lengths() {
    assert_eq!(
        DecodedBarcode::classify("4006381333931").format,
        Some(BarcodeFormat::Ean13)
    );
    assert_eq!(
        DecodedBarcode::classify("12345670").format,
        Some(BarcodeFormat::Ean8)
    );
    assert_eq!(DecodedBarcode::classify("DRS-0042").format, None);
    assert_eq!(BarcodeFormat::Code128.to_string(), "Code 128");
}
