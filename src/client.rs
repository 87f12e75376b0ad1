//! Authenticated Client
//!
//! Assembles the token stack from [`ClientOptions`]: a refresh source
//! over the authorization server, a reuse cache on top, and a bearer
//! transport in front, all sharing one HTTP transport.

use std::sync::Arc;

use crate::builders::ClientOptions;
use crate::core::{HttpRequest, HttpResponse, HttpTransport, ReqwestHttpTransport};
use crate::error::AuthError;
use crate::flows::OAuth2AuthorizationService;
use crate::token::{CompositeTokenCallback, RefreshTokenSource, ReuseTokenSource};
use crate::transport::{AuthenticationState, BearerTransport};

/// The token source stack assembled for automatic renewal.
pub type RenewingTokenSource<T> =
    ReuseTokenSource<RefreshTokenSource<OAuth2AuthorizationService<T>>>;

/// HTTP client with automatic token renewal.
pub struct AuthenticatedClient<T: HttpTransport = ReqwestHttpTransport> {
    transport: BearerTransport<RenewingTokenSource<T>, T>,
    auth: Arc<AuthenticationState>,
    service: Arc<OAuth2AuthorizationService<T>>,
}

impl AuthenticatedClient<ReqwestHttpTransport> {
    /// Assemble a client over the default HTTP transport.
    pub async fn connect(options: ClientOptions) -> Result<Self, AuthError> {
        Self::with_transport(options, Arc::new(ReqwestHttpTransport::new()?)).await
    }
}

impl<T: HttpTransport> AuthenticatedClient<T> {
    /// Assemble a client over an explicitly supplied HTTP transport.
    pub async fn with_transport(
        options: ClientOptions,
        transport: Arc<T>,
    ) -> Result<Self, AuthError> {
        let service = Arc::new(OAuth2AuthorizationService::new(
            options.oauth.clone(),
            transport.clone(),
        ));

        let seed_refresh = options
            .seed_token
            .refresh_token
            .clone()
            .unwrap_or_default();

        let mut refresh_source = match &options.store {
            Some(store) => {
                RefreshTokenSource::with_storage(service.clone(), seed_refresh, store.clone())
                    .await?
            }
            None => RefreshTokenSource::new(service.clone(), seed_refresh)?,
        };

        if !options.callbacks.is_empty() {
            refresh_source = refresh_source
                .with_callback(Arc::new(CompositeTokenCallback::new(options.callbacks)));
        }

        let source = Arc::new(ReuseTokenSource::new(refresh_source, options.seed_token));
        let auth = Arc::new(AuthenticationState::new());
        let transport =
            BearerTransport::with_base(source, transport).with_authentication(auth.clone());

        Ok(Self {
            transport,
            auth,
            service,
        })
    }

    /// Execute a request with a bearer credential injected.
    pub async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, AuthError> {
        self.transport.execute(request).await
    }

    /// The authentication holder updated on every round trip.
    pub fn authentication(&self) -> Arc<AuthenticationState> {
        self.auth.clone()
    }

    /// The authorization service, for code exchange and resource listing.
    pub fn authorization(&self) -> &OAuth2AuthorizationService<T> {
        &self.service
    }
}
