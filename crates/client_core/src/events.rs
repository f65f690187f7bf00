use crate::session::AuthState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Broadcast to front ends; notices are the transient toasts of the UI.
#[derive(Debug, Clone)]
pub enum WalletEvent {
    SessionChanged(AuthState),
    CouponsChanged { count: usize, loading: bool },
    Notice { level: NoticeLevel, message: String },
}

impl WalletEvent {
    pub fn success(message: impl Into<String>) -> Self {
        WalletEvent::Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        WalletEvent::Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
