use anyhow::Result;
use async_trait::async_trait;
use storage::Storage;
use tokio::sync::Mutex;

/// Where the session token lives between runs.
#[async_trait]
pub trait SessionPersistence: Send + Sync {
    async fn load_token(&self) -> Result<Option<String>>;
    async fn store_token(&self, token: &str) -> Result<()>;
    async fn clear_token(&self) -> Result<()>;
}

#[async_trait]
impl SessionPersistence for Storage {
    async fn load_token(&self) -> Result<Option<String>> {
        self.session_token().await
    }

    async fn store_token(&self, token: &str) -> Result<()> {
        self.store_session_token(token).await
    }

    async fn clear_token(&self) -> Result<()> {
        self.clear_session_token().await
    }
}

/// Process-local persistence, used for tests and `--ephemeral` runs.
#[derive(Default)]
pub struct MemorySessionPersistence {
    token: Mutex<Option<String>>,
}

impl MemorySessionPersistence {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    pub async fn current(&self) -> Option<String> {
        self.token.lock().await.clone()
    }
}

#[async_trait]
impl SessionPersistence for MemorySessionPersistence {
    async fn load_token(&self) -> Result<Option<String>> {
        Ok(self.token.lock().await.clone())
    }

    async fn store_token(&self, token: &str) -> Result<()> {
        *self.token.lock().await = Some(token.to_string());
        Ok(())
    }

    async fn clear_token(&self) -> Result<()> {
        self.token.lock().await.take();
        Ok(())
    }
}
