//! Bearer credential storage.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;

/// Shared holder of the current bearer token.
///
/// Cloning is cheap and all clones see the same credential.
#[derive(Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<SecretString>>>,
}

impl Session {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session holding `token`.
    #[must_use]
    pub fn with_token(token: SecretString) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token))),
        }
    }

    /// Store a new token, replacing any previous one.
    pub async fn set_token(&self, token: SecretString) {
        *self.token.write().await = Some(token);
    }

    /// Forget the stored token.
    pub async fn clear(&self) {
        *self.token.write().await = None;
    }

    /// Whether a token is stored.
    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// `Authorization` header value for the stored token.
    pub(crate) async fn bearer(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .map(|token| format!("Bearer {}", token.expose_secret()))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("token", &"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_token() {
        let session = Session::new();
        let other = session.clone();
        assert!(!other.is_authenticated().await);

        session.set_token(SecretString::from("tok-123")).await;
        assert_eq!(other.bearer().await.as_deref(), Some("Bearer tok-123"));

        other.clear().await;
        assert!(!session.is_authenticated().await);
    }
}
