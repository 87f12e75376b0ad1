//! Bearer Transport
//!
//! Request-scoped middleware that obtains a token from a [`TokenSource`]
//! and injects it as a bearer credential before forwarding to a base
//! transport.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::core::{HttpRequest, HttpResponse, HttpTransport, ReqwestHttpTransport};
use crate::error::{AuthError, TokenError};
use crate::token::TokenSource;

/// Observable side channel holding the bearer value most recently
/// injected by a [`BearerTransport`], for callers that authenticate
/// outside the transport.
#[derive(Default)]
pub struct AuthenticationState {
    bearer: std::sync::Mutex<Option<String>>,
}

impl AuthenticationState {
    /// Create an empty holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bearer value.
    pub fn set_bearer(&self, bearer: impl Into<String>) {
        *self.bearer.lock().unwrap() = Some(bearer.into());
    }

    /// The current bearer value, if any.
    pub fn bearer(&self) -> Option<String> {
        self.bearer.lock().unwrap().clone()
    }
}

/// Token-injecting HTTP transport middleware.
///
/// The base transport is decided once at construction: either the
/// default reqwest transport or an explicitly supplied one.
pub struct BearerTransport<S: TokenSource, T: HttpTransport = ReqwestHttpTransport> {
    source: Arc<S>,
    base: Arc<T>,
    auth: Option<Arc<AuthenticationState>>,
}

impl<S: TokenSource> BearerTransport<S> {
    /// Create a transport over the default base transport.
    pub fn new(source: Arc<S>) -> Result<Self, AuthError> {
        Ok(Self::with_base(source, Arc::new(ReqwestHttpTransport::new()?)))
    }
}

impl<S: TokenSource, T: HttpTransport> BearerTransport<S, T> {
    /// Create a transport over an explicitly supplied base transport.
    pub fn with_base(source: Arc<S>, base: Arc<T>) -> Self {
        Self {
            source,
            base,
            auth: None,
        }
    }

    /// Attach an authentication holder updated on every round trip.
    pub fn with_authentication(mut self, auth: Arc<AuthenticationState>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Obtain a token, inject it into a clone of `request`, and forward
    /// the clone to the base transport. The caller's request is never
    /// mutated, and no request is sent without a valid token.
    pub async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, AuthError> {
        let token = self.source.token().await?;

        if !token.is_valid() {
            return Err(AuthError::Token(TokenError::InvalidToken {
                message: "token source produced a token without an access credential"
                    .to_string(),
            }));
        }

        if let Some(auth) = &self.auth {
            auth.set_bearer(token.access_token.clone());
        }

        let mut authorized = request.clone();
        authorized
            .headers
            .insert("authorization".to_string(), token.authorization_header());

        debug!(method = request.method.as_str(), url = %request.url, "forwarding authorized request");
        self.base.send(authorized).await
    }
}

#[async_trait]
impl<S: TokenSource, T: HttpTransport> HttpTransport for BearerTransport<S, T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AuthError> {
        self.execute(&request).await
    }
}
