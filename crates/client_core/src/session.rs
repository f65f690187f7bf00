use std::{fmt, sync::Arc};

use shared::{
    domain::User,
    protocol::{EmailRequest, ResetPasswordRequest, SigninRequest, SignupRequest, VerifyOtpRequest},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{
    api::ApiClient,
    error::{Result, WalletError},
    events::WalletEvent,
    forms,
    persistence::SessionPersistence,
};

/// Authentication status of the session.
///
/// `Unknown` holds until the first `check_auth` (or sign-in) resolves it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    #[default]
    Unknown,
    Authenticated(User),
    Unauthenticated,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Bearer token; `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub auth: AuthState,
    pub token: Option<SessionToken>,
}

impl SessionState {
    pub fn authenticated(user: User, token: SessionToken) -> Self {
        Self {
            auth: AuthState::Authenticated(user),
            token: Some(token),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            auth: AuthState::Unauthenticated,
            token: None,
        }
    }
}

pub struct SessionStore {
    api: Arc<ApiClient>,
    persistence: Arc<dyn SessionPersistence>,
    state: Mutex<SessionState>,
    events: broadcast::Sender<WalletEvent>,
}

impl SessionStore {
    pub fn new(
        api: Arc<ApiClient>,
        persistence: Arc<dyn SessionPersistence>,
        events: broadcast::Sender<WalletEvent>,
    ) -> Self {
        Self {
            api,
            persistence,
            state: Mutex::new(SessionState::default()),
            events,
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn auth_state(&self) -> AuthState {
        self.state.lock().await.auth.clone()
    }

    /// Registers a new account. Nothing changes locally; the account still
    /// needs OTP verification before it can sign in.
    pub async fn signup(&self, email: &str, password: &str, name: Option<&str>) -> Result<()> {
        let request = SignupRequest {
            email: forms::email(email)?,
            password: password.to_string(),
            name: name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        };
        self.api.signup(&request).await.inspect_err(|err| {
            warn!(error = %err, "session: signup rejected");
        })?;
        info!("session: signup accepted, verification pending");
        Ok(())
    }

    pub async fn signin(&self, email: &str, password: &str) -> Result<User> {
        let request = SigninRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let response = match self.api.signin(&request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "session: sign-in rejected");
                self.reset().await;
                return Err(err);
            }
        };

        if let Err(err) = self.persistence.store_token(&response.access_token).await {
            warn!(error = %err, "session: failed to persist token");
            self.reset().await;
            return Err(WalletError::Storage(err.to_string()));
        }

        self.api
            .set_bearer(Some(response.access_token.clone()))
            .await;
        let user = response.user;
        self.apply(SessionState::authenticated(
            user.clone(),
            SessionToken::new(response.access_token),
        ))
        .await;
        info!(user_id = %user.id, "session: signed in");
        Ok(user)
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<()> {
        let request = VerifyOtpRequest {
            email: forms::email(email)?,
            otp: forms::otp(otp)?,
        };
        self.api.verify_otp(&request).await?;
        info!("session: email verified");
        Ok(())
    }

    pub async fn resend_otp(&self, email: &str) -> Result<()> {
        let request = EmailRequest {
            email: forms::email(email)?,
        };
        self.api.resend_otp(&request).await?;
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let request = EmailRequest {
            email: forms::email(email)?,
        };
        self.api.request_password_reset(&request).await?;
        Ok(())
    }

    pub async fn reset_password(&self, email: &str, otp: &str, new_password: &str) -> Result<()> {
        let request = ResetPasswordRequest {
            email: forms::email(email)?,
            otp: forms::otp(otp)?,
            new_password: new_password.to_string(),
        };
        self.api.reset_password(&request).await?;
        info!("session: password reset");
        Ok(())
    }

    /// Resolves the auth state from the persisted token. Without a token no
    /// request is made; a token the backend rejects is discarded.
    pub async fn check_auth(&self) -> bool {
        let token = match self.persistence.load_token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.apply(SessionState::signed_out()).await;
                return false;
            }
            Err(err) => {
                warn!(error = %err, "session: failed to read persisted token");
                self.apply(SessionState::signed_out()).await;
                return false;
            }
        };

        self.api.set_bearer(Some(token.clone())).await;
        match self.api.me().await {
            Ok(user) => {
                info!(user_id = %user.id, "session: restored");
                self.apply(SessionState::authenticated(user, SessionToken::new(token)))
                    .await;
                true
            }
            Err(err) => {
                warn!(error = %err, "session: persisted token rejected");
                self.reset().await;
                false
            }
        }
    }

    /// Drops the session locally; the backend is not contacted.
    pub async fn logout(&self) {
        self.reset().await;
        info!("session: logged out");
    }

    async fn reset(&self) {
        if let Err(err) = self.persistence.clear_token().await {
            warn!(error = %err, "session: failed to clear persisted token");
        }
        self.api.set_bearer(None).await;
        self.apply(SessionState::signed_out()).await;
    }

    async fn apply(&self, next: SessionState) {
        let auth = next.auth.clone();
        *self.state.lock().await = next;
        let _ = self.events.send(WalletEvent::SessionChanged(auth));
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
