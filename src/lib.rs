//! OAuth2 Token Lifecycle
//!
//! Bearer token lifecycle management for REST API clients: acquiring,
//! caching, expiring, refreshing, rotating, and persisting tokens used
//! to authenticate outbound requests, safely under concurrent use and
//! with pluggable storage backends.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use oauth2_token_source::{
//!     oauth2_config, AuthenticatedClient, ClientOptions, HttpRequest,
//!     InMemoryTokenStore, Token,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = oauth2_config()
//!         .client_id("my-client-id")
//!         .client_secret("my-client-secret")
//!         .redirect_uri("https://myapp.com/callback")
//!         .authorization_endpoint("https://auth.provider.com/authorize")
//!         .token_endpoint("https://auth.provider.com/oauth/token")
//!         .resources_endpoint("https://api.provider.com/oauth/token/accessible-resources")
//!         .add_scope("offline_access")
//!         .build()?;
//!
//!     let seed = Token::bearer("initial-access", Some(3600))
//!         .with_refresh_token("initial-refresh");
//!
//!     let options = ClientOptions::builder()
//!         .with_oauth(config)
//!         .with_auto_renewal(seed)
//!         .with_token_store(Arc::new(InMemoryTokenStore::new()))
//!         .build()?;
//!
//!     let client = AuthenticatedClient::connect(options).await?;
//!     let response = client
//!         .execute(&HttpRequest::get("https://api.provider.com/me"))
//!         .await?;
//!     println!("status: {}", response.status);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: token wire format, configuration, accessible resources
//! - `error`: error hierarchy with authorization-server error mapping
//! - `core`: HTTP transport seam and the injectable clock
//! - `flows`: the authorization server collaborator (exchange, refresh,
//!   accessible resources)
//! - `token`: token sources (reuse cache, network refresh), storage and
//!   callback hooks
//! - `transport`: bearer-injecting HTTP middleware
//! - `builders`: configuration and client-assembly options
//! - `client`: high-level client combining the stack

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod flows;
pub mod token;
pub mod transport;
pub mod types;

// Re-export client assembly
pub use client::{AuthenticatedClient, RenewingTokenSource};

// Re-export builders
pub use builders::{oauth2_config, ClientOptions, ClientOptionsBuilder, OAuth2ConfigBuilder};

// Re-export errors
pub use error::{
    error_from_response, map_token_error, parse_error_response, AuthError, AuthResult,
    ConfigurationError, NetworkError, OAuth2ErrorResponse, ProtocolError, ProviderError,
    StorageError, TokenError,
};

// Re-export types
pub use types::{AccessibleResource, OAuth2Config, Token};

// Re-export core components
pub use core::{
    Clock, HttpMethod, HttpRequest, HttpResponse, HttpTransport, ManualClock, MockHttpTransport,
    ReqwestHttpTransport, SystemClock,
};

// Re-export flows
pub use flows::{AuthorizationService, MockAuthorizationService, OAuth2AuthorizationService};

// Re-export token management
pub use token::{
    CompositeTokenCallback, InMemoryTokenStore, MockTokenStore, RecordingTokenCallback,
    RefreshTokenSource, ReuseTokenSource, StaticTokenSource, TokenCallback, TokenSource,
    TokenStore, REFRESH_BUFFER_SECS,
};

// Re-export transport middleware
pub use transport::{AuthenticationState, BearerTransport};
