use super::*;
use client_core::scanner::SUPPORTED_FORMATS;

#[tokio::test]
async fn yields_one_barcode_per_line_then_closes() {
    let mut source = LineBarcodeSource::from_reader(&b"4006381333931\r\n  DRS-0042 \n"[..]);
    source.start(&SUPPORTED_FORMATS).await.expect("start");

    let first = source.next_decoded().await.expect("read").expect("line");
    assert_eq!(first.text, "4006381333931");
    assert_eq!(first.format, Some(BarcodeFormat::Ean13));

    let second = source.next_decoded().await.expect("read").expect("line");
    assert_eq!(second.text, "DRS-0042");

    assert!(source.next_decoded().await.expect("read").is_none());
    source.stop().await.expect("stop");
}

#[tokio::test]
async fn missing_device_fails_to_start() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut source = LineBarcodeSource::device(dir.path().join("ttyACM9"));

    let err = source
        .start(&SUPPORTED_FORMATS)
        .await
        .expect_err("device does not exist");
    assert!(err.to_string().contains("ttyACM9"));
}

#[tokio::test]
async fn paused_source_refuses_to_read() {
    let mut source = LineBarcodeSource::from_reader(&b"12345670\n"[..]);
    source.start(&SUPPORTED_FORMATS).await.expect("start");

    source.pause();
    assert!(source.next_decoded().await.is_err());
    source.resume();
    assert!(source.next_decoded().await.expect("read").is_some());
}
