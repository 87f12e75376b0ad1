//! Token Sources
//!
//! The token-source abstraction and the reuse/caching layer.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::{Clock, SystemClock};
use crate::error::AuthError;
use crate::types::Token;

/// Safety buffer before declared expiry at which a cached token is
/// treated as stale, accounting for clock skew and in-flight latency.
pub const REFRESH_BUFFER_SECS: i64 = 300;

/// Produces a valid token on demand; may block on network I/O.
///
/// Implementations must be safe for concurrent invocation and must never
/// return an invalid token alongside an `Ok` result.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Get a token.
    async fn token(&self) -> Result<Token, AuthError>;
}

/// Token source returning a fixed, pre-issued token.
pub struct StaticTokenSource {
    token: Token,
}

impl StaticTokenSource {
    /// Create a source for the given token.
    pub fn new(token: Token) -> Result<Self, AuthError> {
        if !token.is_valid() {
            return Err(AuthError::Token(crate::error::TokenError::InvalidToken {
                message: "static token has no access credential".to_string(),
            }));
        }
        Ok(Self { token })
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn token(&self) -> Result<Token, AuthError> {
        Ok(self.token.clone())
    }
}

/// Cached token plus the absolute expiry instant derived from issuance
/// time and declared lifetime. Replaced wholesale on refresh.
struct CachedTokenState {
    token: Token,
    expires_at: Option<DateTime<Utc>>,
}

impl CachedTokenState {
    fn new<C: Clock>(token: Token, clock: &C) -> Self {
        let expires_at = token
            .expires_in
            .map(|secs| clock.now() + Duration::seconds(secs as i64));
        Self { token, expires_at }
    }

    /// Fresh means the cached token is usable without delegating: it has
    /// an access credential and is not within the safety buffer of its
    /// expiry. Tokens without a declared lifetime never expire.
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        if !self.token.is_valid() {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => now + Duration::seconds(REFRESH_BUFFER_SECS) < expires_at,
            None => true,
        }
    }
}

/// Caching layer over any [`TokenSource`].
///
/// Serves the cached token while it is fresh; once within the safety
/// buffer of expiry it delegates to the wrapped source under an
/// exclusive lock, so concurrent callers serialize behind a single
/// refresh instead of issuing duplicates.
pub struct ReuseTokenSource<S: TokenSource, C: Clock = SystemClock> {
    inner: S,
    clock: C,
    state: Mutex<CachedTokenState>,
}

impl<S: TokenSource> ReuseTokenSource<S> {
    /// Wrap `inner`, seeding the cache with `token`. The seed's expiry is
    /// computed from its declared lifetime at construction time.
    pub fn new(inner: S, token: Token) -> Self {
        Self::with_clock(inner, token, SystemClock)
    }
}

impl<S: TokenSource, C: Clock> ReuseTokenSource<S, C> {
    /// Wrap `inner` with an explicit time source.
    pub fn with_clock(inner: S, token: Token, clock: C) -> Self {
        let state = CachedTokenState::new(token, &clock);
        Self {
            inner,
            clock,
            state: Mutex::new(state),
        }
    }
}

#[async_trait]
impl<S: TokenSource, C: Clock> TokenSource for ReuseTokenSource<S, C> {
    async fn token(&self) -> Result<Token, AuthError> {
        let mut state = self.state.lock().await;

        if state.is_fresh(self.clock.now()) {
            return Ok(state.token.clone());
        }

        // Stale: delegate while holding the lock. Concurrent callers wait
        // here rather than triggering independent refreshes.
        debug!("cached token stale, delegating to wrapped source");
        let token = self.inner.token().await?;
        *state = CachedTokenState::new(token.clone(), &self.clock);
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Wrapped source that counts delegations and hands out A2, A3, ...
    struct CountingSource {
        calls: AtomicUsize,
        delay: Option<std::time::Duration>,
        fail: bool,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: None,
                fail: false,
            }
        }

        fn with_delay(delay: std::time::Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::new()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn token(&self) -> Result<Token, AuthError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 2;
            if self.fail {
                return Err(AuthError::Token(crate::error::TokenError::RefreshFailed {
                    message: "mock refresh failure".to_string(),
                }));
            }
            Ok(Token::bearer(format!("A{}", n), Some(3600)))
        }
    }

    #[tokio::test]
    async fn test_fresh_token_served_without_delegation() {
        let inner = Arc::new(CountingSource::new());
        let source = ReuseTokenSource::new(
            ArcSource(inner.clone()),
            Token::bearer("A1", Some(3600)),
        );

        let token = source.token().await.unwrap();
        assert_eq!(token.access_token, "A1");
        assert_eq!(inner.calls(), 0);
    }

    #[tokio::test]
    async fn test_short_lifetime_triggers_exactly_one_delegation() {
        let inner = Arc::new(CountingSource::new());
        // 300s lifetime is already inside the 5-minute buffer.
        let source = ReuseTokenSource::new(
            ArcSource(inner.clone()),
            Token::bearer("A1", Some(300)),
        );

        let token = source.token().await.unwrap();
        assert_eq!(token.access_token, "A2");
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_delegation_leaves_cache_untouched_and_retries() {
        let failing = Arc::new(CountingSource::failing());
        let source = ReuseTokenSource::new(
            ArcSource(failing.clone()),
            Token::bearer("A1", Some(60)),
        );

        assert!(source.token().await.is_err());
        assert!(source.token().await.is_err());
        // Each caller retried the refresh from scratch.
        assert_eq!(failing.calls(), 2);
    }

    #[tokio::test]
    async fn test_token_without_lifetime_never_goes_stale() {
        let inner = Arc::new(CountingSource::new());
        let clock = Arc::new(ManualClock::start_now());
        let source = ReuseTokenSource::with_clock(
            ArcSource(inner.clone()),
            Token::bearer("A1", None),
            clock.clone(),
        );

        clock.advance_secs(86_400);
        let token = source.token().await.unwrap();
        assert_eq!(token.access_token, "A1");
        assert_eq!(inner.calls(), 0);
    }

    #[tokio::test]
    async fn test_virtual_clock_refresh_scenario() {
        let inner = Arc::new(CountingSource::new());
        let clock = Arc::new(ManualClock::start_now());
        let source = ReuseTokenSource::with_clock(
            ArcSource(inner.clone()),
            Token::bearer("A1", Some(3600)),
            clock.clone(),
        );

        // Just issued: served from cache.
        assert_eq!(source.token().await.unwrap().access_token, "A1");
        assert_eq!(inner.calls(), 0);

        // 3595s later the token is inside the 5-minute buffer of its
        // 3600s expiry: exactly one delegation.
        clock.advance_secs(3595);
        assert_eq!(source.token().await.unwrap().access_token, "A2");
        assert_eq!(inner.calls(), 1);

        // Immediately afterwards the new token is served from cache.
        assert_eq!(source.token().await.unwrap().access_token, "A2");
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_serialize_behind_one_refresh() {
        let inner = Arc::new(CountingSource::with_delay(
            std::time::Duration::from_millis(50),
        ));
        let source = Arc::new(ReuseTokenSource::new(
            ArcSource(inner.clone()),
            Token::bearer("", None), // invalid seed: first caller must refresh
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let source = source.clone();
            handles.push(tokio::spawn(async move { source.token().await }));
        }

        for handle in handles {
            let token = handle.await.unwrap().unwrap();
            assert_eq!(token.access_token, "A2");
        }
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_static_source_rejects_invalid_token() {
        assert!(StaticTokenSource::new(Token::bearer("", None)).is_err());

        let source = StaticTokenSource::new(Token::bearer("A1", None)).unwrap();
        assert_eq!(source.token().await.unwrap().access_token, "A1");
    }

    /// Test adapter so a shared counter can sit behind the source seam.
    struct ArcSource(Arc<CountingSource>);

    #[async_trait]
    impl TokenSource for ArcSource {
        async fn token(&self) -> Result<Token, AuthError> {
            self.0.token().await
        }
    }
}
