//! Line-oriented barcode sources for the terminal.
//!
//! Handheld scanners either type into the focused terminal (keyboard wedge)
//! or expose a serial device that emits one decoded barcode per line.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use client_core::{
    scanner::{BarcodeFormat, DecodedBarcode},
    BarcodeSource,
};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tracing::debug;

type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;

enum Origin {
    Stdin,
    Device(PathBuf),
    Reader(BoxedReader),
}

pub struct LineBarcodeSource {
    origin: Option<Origin>,
    lines: Option<Lines<BufReader<BoxedReader>>>,
    paused: bool,
}

impl LineBarcodeSource {
    pub fn stdin() -> Self {
        Self::from_origin(Origin::Stdin)
    }

    pub fn device(path: impl Into<PathBuf>) -> Self {
        Self::from_origin(Origin::Device(path.into()))
    }

    pub fn from_reader(reader: impl AsyncRead + Unpin + Send + 'static) -> Self {
        Self::from_origin(Origin::Reader(Box::new(reader)))
    }

    fn from_origin(origin: Origin) -> Self {
        Self {
            origin: Some(origin),
            lines: None,
            paused: false,
        }
    }
}

#[async_trait]
impl BarcodeSource for LineBarcodeSource {
    async fn start(&mut self, formats: &[BarcodeFormat]) -> Result<()> {
        let reader: BoxedReader = match self.origin.take() {
            Some(Origin::Stdin) => Box::new(tokio::io::stdin()),
            Some(Origin::Device(path)) => Box::new(
                tokio::fs::File::open(&path)
                    .await
                    .with_context(|| format!("cannot open scanner device '{}'", path.display()))?,
            ),
            Some(Origin::Reader(reader)) => reader,
            None => return Err(anyhow!("scanner already started")),
        };
        debug!(formats = formats.len(), "scanner input: started");
        self.lines = Some(BufReader::new(reader).lines());
        Ok(())
    }

    async fn next_decoded(&mut self) -> Result<Option<DecodedBarcode>> {
        if self.paused {
            return Err(anyhow!("scanner input polled while paused"));
        }
        let Some(lines) = self.lines.as_mut() else {
            return Err(anyhow!("scanner not started"));
        };
        let line = lines.next_line().await.context("failed to read scanner input")?;
        Ok(line.map(|line| DecodedBarcode::classify(line.trim())))
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    async fn stop(&mut self) -> Result<()> {
        self.lines = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/scanner_input_tests.rs"]
mod tests;
