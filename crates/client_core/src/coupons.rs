use std::{collections::BTreeMap, sync::Arc};

use shared::{
    domain::{Coupon, CouponFilter, CouponId},
    protocol::BarcodeData,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{api::ApiClient, error::Result, events::WalletEvent};

const FETCH_FAILED: &str = "Failed to fetch coupons";
const SAVE_FAILED: &str = "Failed to save coupon";
const MARK_USED_FAILED: &str = "Failed to mark coupon as used";
const DELETE_FAILED: &str = "Failed to delete coupon";

/// Local mirror of the backend coupon list plus request bookkeeping.
///
/// Transitions consume the current state and return the next one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CouponState {
    pub coupons: Vec<Coupon>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: Option<Coupon>,
}

impl CouponState {
    pub fn begin_request(self) -> Self {
        Self {
            loading: true,
            error: None,
            ..self
        }
    }

    pub fn with_coupons(self, coupons: Vec<Coupon>) -> Self {
        Self {
            coupons,
            loading: false,
            ..self
        }
    }

    pub fn with_created(mut self, coupon: Coupon) -> Self {
        self.coupons.insert(0, coupon);
        self.loading = false;
        self
    }

    /// Swaps in the server's copy for the entry with the same id.
    pub fn with_replaced(mut self, updated: Coupon) -> Self {
        for coupon in &mut self.coupons {
            if coupon.id == updated.id {
                *coupon = updated.clone();
            }
        }
        self.loading = false;
        self
    }

    pub fn without(mut self, coupon_id: CouponId) -> Self {
        if let Some(index) = self.coupons.iter().position(|c| c.id == coupon_id) {
            self.coupons.remove(index);
        }
        self.loading = false;
        self
    }

    pub fn with_error(self, message: impl Into<String>) -> Self {
        Self {
            loading: false,
            error: Some(message.into()),
            ..self
        }
    }

    pub fn with_selected(self, selected: Option<Coupon>) -> Self {
        Self { selected, ..self }
    }

    pub fn filtered(&self, filter: CouponFilter) -> Vec<&Coupon> {
        self.coupons.iter().filter(|c| filter.matches(c)).collect()
    }

    pub fn summary(&self) -> CouponSummary {
        let mut summary = CouponSummary::default();
        for coupon in &self.coupons {
            if coupon.is_used {
                summary.used += 1;
                continue;
            }
            summary.unused += 1;
            if let Some(value) = coupon.value {
                let currency = coupon.currency.clone().unwrap_or_default();
                *summary.unused_value.entry(currency).or_insert(0.0) += value;
            }
        }
        summary
    }
}

/// Home screen counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CouponSummary {
    pub unused: usize,
    pub used: usize,
    /// Redeemable value of unused coupons keyed by currency code.
    pub unused_value: BTreeMap<String, f64>,
}

pub struct CouponStore {
    api: Arc<ApiClient>,
    state: Mutex<CouponState>,
    events: broadcast::Sender<WalletEvent>,
}

impl CouponStore {
    pub fn new(api: Arc<ApiClient>, events: broadcast::Sender<WalletEvent>) -> Self {
        Self {
            api,
            state: Mutex::new(CouponState::default()),
            events,
        }
    }

    pub async fn snapshot(&self) -> CouponState {
        self.state.lock().await.clone()
    }

    pub async fn summary(&self) -> CouponSummary {
        self.state.lock().await.summary()
    }

    /// Replaces the local list with the server's, optionally filtered by the
    /// backend on `is_used`.
    pub async fn fetch_coupons(&self, filter: CouponFilter) -> Result<Vec<Coupon>> {
        self.update(CouponState::begin_request).await;
        match self.api.list_coupons(filter).await {
            Ok(coupons) => {
                info!(count = coupons.len(), ?filter, "coupons: fetched");
                self.update(|state| state.with_coupons(coupons.clone()))
                    .await;
                Ok(coupons)
            }
            Err(err) => {
                warn!(error = %err, "coupons: fetch failed");
                let message = err.user_message(FETCH_FAILED);
                self.update(|state| state.with_error(message)).await;
                Err(err)
            }
        }
    }

    pub async fn save_coupon(&self, barcode: BarcodeData) -> Result<Coupon> {
        self.update(CouponState::begin_request).await;
        match self.api.create_coupon(&barcode).await {
            Ok(coupon) => {
                info!(coupon_id = %coupon.id, "coupons: saved");
                self.update(|state| state.with_created(coupon.clone()))
                    .await;
                Ok(coupon)
            }
            Err(err) => {
                warn!(error = %err, "coupons: save failed");
                let message = err.user_message(SAVE_FAILED);
                self.update(|state| state.with_error(message)).await;
                Err(err)
            }
        }
    }

    /// The coupon stays in the list with `is_used` set; views showing only
    /// unused coupons re-filter or re-fetch.
    pub async fn mark_coupon_as_used(&self, coupon_id: CouponId) -> Result<Coupon> {
        self.update(CouponState::begin_request).await;
        match self.api.mark_coupon_used(coupon_id).await {
            Ok(coupon) => {
                info!(%coupon_id, "coupons: marked used");
                self.update(|state| state.with_replaced(coupon.clone()))
                    .await;
                Ok(coupon)
            }
            Err(err) => {
                warn!(%coupon_id, error = %err, "coupons: mark used failed");
                let message = err.user_message(MARK_USED_FAILED);
                self.update(|state| state.with_error(message)).await;
                Err(err)
            }
        }
    }

    pub async fn delete_coupon(&self, coupon_id: CouponId) -> Result<()> {
        self.update(CouponState::begin_request).await;
        match self.api.delete_coupon(coupon_id).await {
            Ok(()) => {
                info!(%coupon_id, "coupons: deleted");
                self.update(|state| state.without(coupon_id)).await;
                Ok(())
            }
            Err(err) => {
                warn!(%coupon_id, error = %err, "coupons: delete failed");
                let message = err.user_message(DELETE_FAILED);
                self.update(|state| state.with_error(message)).await;
                Err(err)
            }
        }
    }

    /// Picks the coupon shown in payout mode.
    pub async fn select_coupon(&self, coupon: Coupon) {
        self.update(|state| state.with_selected(Some(coupon))).await;
    }

    pub async fn clear_selected_coupon(&self) {
        self.update(|state| state.with_selected(None)).await;
    }

    async fn update(&self, transition: impl FnOnce(CouponState) -> CouponState) {
        let (count, loading) = {
            let mut guard = self.state.lock().await;
            let next = transition(std::mem::take(&mut *guard));
            *guard = next;
            (guard.coupons.len(), guard.loading)
        };
        let _ = self
            .events
            .send(WalletEvent::CouponsChanged { count, loading });
    }
}

#[cfg(test)]
#[path = "tests/coupon_tests.rs"]
mod tests;
