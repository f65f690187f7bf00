use std::sync::Arc;

use tokio::sync::broadcast;

pub mod api;
pub mod coupons;
pub mod error;
pub mod events;
pub mod forms;
pub mod navigation;
pub mod persistence;
pub mod scanner;
pub mod session;

pub use api::ApiClient;
pub use coupons::{CouponState, CouponStore, CouponSummary};
pub use error::WalletError;
pub use events::{NoticeLevel, WalletEvent};
pub use navigation::{Action, Route, RouteDecision};
pub use persistence::{MemorySessionPersistence, SessionPersistence};
pub use scanner::{BarcodeSource, ScanOutcome, ScannerAdapter};
pub use session::{AuthState, SessionState, SessionStore};

const EVENT_CAPACITY: usize = 256;

/// Application state handed to every view: both stores share one API client
/// and one event channel.
pub struct WalletClient {
    pub session: SessionStore,
    pub coupons: Arc<CouponStore>,
    events: broadcast::Sender<WalletEvent>,
}

impl WalletClient {
    pub fn new(
        api_base_url: &str,
        persistence: Arc<dyn SessionPersistence>,
    ) -> error::Result<Arc<Self>> {
        let api = Arc::new(ApiClient::new(api_base_url)?);
        Ok(Self::with_api(api, persistence))
    }

    pub fn with_api(api: Arc<ApiClient>, persistence: Arc<dyn SessionPersistence>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            session: SessionStore::new(Arc::clone(&api), persistence, events.clone()),
            coupons: Arc::new(CouponStore::new(api, events.clone())),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    pub fn events(&self) -> &broadcast::Sender<WalletEvent> {
        &self.events
    }

    /// Resolves whether `route` may be shown, checking the persisted session
    /// first if auth is still unknown.
    pub async fn open(&self, route: Route) -> RouteDecision {
        if route.is_protected() && self.session.auth_state().await == AuthState::Unknown {
            self.session.check_auth().await;
        }
        navigation::guard(route, &self.session.auth_state().await)
    }

    pub fn scanner<S: BarcodeSource>(&self, source: S) -> ScannerAdapter<S> {
        ScannerAdapter::new(source, Arc::clone(&self.coupons), self.events.clone())
    }
}

#[cfg(test)]
#[path = "tests/mock_backend.rs"]
pub(crate) mod mock_backend;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
