//! Token Storage
//!
//! Pluggable persistence for tokens and refresh credentials. The
//! subsystem never assumes a particular medium; implementations may be
//! backed by a database, keychain, or file. The access token and the
//! refresh credential are stored independently and may disagree
//! transiently across distributed instances.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::AuthError;
use crate::types::Token;

/// Token persistence interface.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the persisted token, if any.
    async fn get_token(&self) -> Result<Option<Token>, AuthError>;

    /// Persist the full token.
    async fn set_token(&self, token: &Token) -> Result<(), AuthError>;

    /// Load the persisted refresh credential, if any.
    async fn get_refresh_token(&self) -> Result<Option<String>, AuthError>;

    /// Persist the refresh credential.
    async fn set_refresh_token(&self, refresh_token: &str) -> Result<(), AuthError>;
}

/// In-memory token store.
#[derive(Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<Token>>,
    refresh_token: Mutex<Option<String>>,
}

impl InMemoryTokenStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get_token(&self) -> Result<Option<Token>, AuthError> {
        Ok(self.token.lock().unwrap().clone())
    }

    async fn set_token(&self, token: &Token) -> Result<(), AuthError> {
        *self.token.lock().unwrap() = Some(token.clone());
        Ok(())
    }

    async fn get_refresh_token(&self) -> Result<Option<String>, AuthError> {
        Ok(self.refresh_token.lock().unwrap().clone())
    }

    async fn set_refresh_token(&self, refresh_token: &str) -> Result<(), AuthError> {
        *self.refresh_token.lock().unwrap() = Some(refresh_token.to_string());
        Ok(())
    }
}

/// Mock token store for testing, with per-operation failure injection.
#[derive(Default)]
pub struct MockTokenStore {
    token: Mutex<Option<Token>>,
    refresh_token: Mutex<Option<String>>,
    set_token_history: Mutex<Vec<Token>>,
    set_refresh_token_history: Mutex<Vec<String>>,
    fail_get_refresh_token: Mutex<bool>,
    fail_set_refresh_token: Mutex<bool>,
    fail_set_token: Mutex<bool>,
}

impl MockTokenStore {
    /// Create new mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the persisted refresh credential.
    pub fn with_refresh_token(self, refresh_token: impl Into<String>) -> Self {
        *self.refresh_token.lock().unwrap() = Some(refresh_token.into());
        self
    }

    /// Make `get_refresh_token` fail.
    pub fn fail_get_refresh_token(&self) -> &Self {
        *self.fail_get_refresh_token.lock().unwrap() = true;
        self
    }

    /// Make `set_refresh_token` fail.
    pub fn fail_set_refresh_token(&self) -> &Self {
        *self.fail_set_refresh_token.lock().unwrap() = true;
        self
    }

    /// Make `set_token` fail.
    pub fn fail_set_token(&self) -> &Self {
        *self.fail_set_token.lock().unwrap() = true;
        self
    }

    /// Tokens persisted via `set_token`, in call order.
    pub fn set_token_history(&self) -> Vec<Token> {
        self.set_token_history.lock().unwrap().clone()
    }

    /// Refresh credentials persisted via `set_refresh_token`, in call order.
    pub fn set_refresh_token_history(&self) -> Vec<String> {
        self.set_refresh_token_history.lock().unwrap().clone()
    }

    fn write_error(what: &str) -> AuthError {
        AuthError::Storage(crate::error::StorageError::WriteFailed {
            message: format!("mock {} failure", what),
        })
    }
}

#[async_trait]
impl TokenStore for MockTokenStore {
    async fn get_token(&self) -> Result<Option<Token>, AuthError> {
        Ok(self.token.lock().unwrap().clone())
    }

    async fn set_token(&self, token: &Token) -> Result<(), AuthError> {
        if *self.fail_set_token.lock().unwrap() {
            return Err(Self::write_error("set_token"));
        }
        self.set_token_history.lock().unwrap().push(token.clone());
        *self.token.lock().unwrap() = Some(token.clone());
        Ok(())
    }

    async fn get_refresh_token(&self) -> Result<Option<String>, AuthError> {
        if *self.fail_get_refresh_token.lock().unwrap() {
            return Err(AuthError::Storage(crate::error::StorageError::ReadFailed {
                message: "mock get_refresh_token failure".to_string(),
            }));
        }
        Ok(self.refresh_token.lock().unwrap().clone())
    }

    async fn set_refresh_token(&self, refresh_token: &str) -> Result<(), AuthError> {
        if *self.fail_set_refresh_token.lock().unwrap() {
            return Err(Self::write_error("set_refresh_token"));
        }
        self.set_refresh_token_history
            .lock()
            .unwrap()
            .push(refresh_token.to_string());
        *self.refresh_token.lock().unwrap() = Some(refresh_token.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let store = InMemoryTokenStore::new();
        assert!(store.get_token().await.unwrap().is_none());
        assert!(store.get_refresh_token().await.unwrap().is_none());

        let token = Token::bearer("A1", Some(3600)).with_refresh_token("R1");
        store.set_token(&token).await.unwrap();
        store.set_refresh_token("R1").await.unwrap();

        assert_eq!(store.get_token().await.unwrap(), Some(token));
        assert_eq!(
            store.get_refresh_token().await.unwrap(),
            Some("R1".to_string())
        );
    }

    #[tokio::test]
    async fn test_mock_store_failure_injection() {
        let store = MockTokenStore::new();
        store.fail_set_refresh_token();

        assert!(store.set_refresh_token("R1").await.is_err());
        assert!(store.set_refresh_token_history().is_empty());

        let token = Token::bearer("A1", None);
        store.set_token(&token).await.unwrap();
        assert_eq!(store.set_token_history().len(), 1);
    }
}
