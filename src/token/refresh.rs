//! Refresh Token Source
//!
//! Exchanges the held refresh credential for a new token pair on every
//! call. Caching is [`super::ReuseTokenSource`]'s job; this source always
//! goes to the network.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{AuthError, TokenError};
use crate::flows::AuthorizationService;
use crate::token::callback::TokenCallback;
use crate::token::source::TokenSource;
use crate::token::storage::TokenStore;
use crate::types::Token;

/// Refresh credential plus the last token issued through it. Guarded by
/// one lock so concurrent refreshes serialize and rotation cannot race.
struct RefreshState {
    refresh_token: String,
    last_token: Option<Token>,
}

/// Token source that performs a network refresh on every call.
pub struct RefreshTokenSource<A: AuthorizationService> {
    service: Arc<A>,
    state: Mutex<RefreshState>,
    store: Option<Arc<dyn TokenStore>>,
    callback: Option<Arc<dyn TokenCallback>>,
}

impl<A: AuthorizationService> RefreshTokenSource<A> {
    /// Create a source seeded with a refresh credential.
    pub fn new(service: Arc<A>, refresh_token: impl Into<String>) -> Result<Self, AuthError> {
        let refresh_token = refresh_token.into();
        if refresh_token.is_empty() {
            return Err(AuthError::Token(TokenError::NoRefreshToken));
        }

        Ok(Self {
            service,
            state: Mutex::new(RefreshState {
                refresh_token,
                last_token: None,
            }),
            store: None,
            callback: None,
        })
    }

    /// Create a source backed by persistent storage.
    ///
    /// A refresh credential already persisted in the store takes
    /// precedence over the caller-supplied seed, so a restarted process
    /// (or a second instance sharing the store) resumes from the most
    /// recently rotated credential. An empty store falls back to the
    /// seed.
    pub async fn with_storage(
        service: Arc<A>,
        seed_refresh_token: impl Into<String>,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, AuthError> {
        let seed = seed_refresh_token.into();
        let persisted = store.get_refresh_token().await?;

        let refresh_token = match persisted {
            Some(stored) if !stored.is_empty() => {
                debug!("using refresh credential from storage");
                stored
            }
            _ => seed,
        };

        let mut source = Self::new(service, refresh_token)?;
        source.store = Some(store);
        Ok(source)
    }

    /// Attach a refresh-event callback.
    pub fn with_callback(mut self, callback: Arc<dyn TokenCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// The refresh credential currently held. Test/diagnostic accessor.
    pub async fn current_refresh_token(&self) -> String {
        self.state.lock().await.refresh_token.clone()
    }
}

#[async_trait]
impl<A: AuthorizationService> TokenSource for RefreshTokenSource<A> {
    async fn token(&self) -> Result<Token, AuthError> {
        let mut state = self.state.lock().await;

        let token = self
            .service
            .refresh_access_token(&state.refresh_token)
            .await
            .map_err(|e| {
                AuthError::Token(TokenError::RefreshFailed {
                    message: e.to_string(),
                })
            })?;

        // Rotation: a new credential supersedes the held one; an absent
        // credential means the previous one is still valid.
        if let Some(next) = token.refresh_token.as_deref().filter(|t| !t.is_empty()) {
            state.refresh_token = next.to_string();
        }

        if let Some(store) = &self.store {
            // Losing a rotated refresh credential would strand the caller
            // with no way to refresh again, so this write is fatal.
            store.set_refresh_token(&state.refresh_token).await?;

            // The access token is short-lived and recoverable by
            // refreshing again: best-effort.
            if let Err(error) = store.set_token(&token).await {
                warn!(
                    error = %error,
                    error_code = error.error_code(),
                    "access token persistence failed, continuing"
                );
            }
        }

        if let Some(callback) = &self.callback {
            if let Err(error) = callback
                .on_token_refreshed(state.last_token.as_ref(), &token)
                .await
            {
                warn!(
                    error = %error,
                    error_code = error.error_code(),
                    "token refresh callback failed"
                );
            }
        }

        state.last_token = Some(token.clone());
        Ok(token)
    }
}
