//! Client Options
//!
//! Explicit options struct assembled before any transport is
//! constructed. Replaces detect-and-rewrap client chaining: everything
//! the token stack needs is declared up front and validated once.

use std::sync::Arc;

use crate::error::{AuthError, ConfigurationError};
use crate::token::{TokenCallback, TokenStore};
use crate::types::{OAuth2Config, Token};

/// Validated set of options for assembling an authenticated client.
pub struct ClientOptions {
    pub(crate) oauth: OAuth2Config,
    pub(crate) seed_token: Token,
    pub(crate) store: Option<Arc<dyn TokenStore>>,
    pub(crate) callbacks: Vec<Arc<dyn TokenCallback>>,
}

impl ClientOptions {
    /// Start building options.
    pub fn builder() -> ClientOptionsBuilder {
        ClientOptionsBuilder::default()
    }

    /// The OAuth2 configuration.
    pub fn oauth(&self) -> &OAuth2Config {
        &self.oauth
    }

    /// The seed token renewal starts from.
    pub fn seed_token(&self) -> &Token {
        &self.seed_token
    }
}

/// Builder for [`ClientOptions`].
///
/// Composition rules are checked at `build()`: automatic renewal
/// requires an OAuth2 config, a seed token must carry a refresh
/// credential, and storage/callback hooks require renewal to be
/// enabled.
#[derive(Default)]
pub struct ClientOptionsBuilder {
    oauth: Option<OAuth2Config>,
    seed_token: Option<Token>,
    store: Option<Arc<dyn TokenStore>>,
    callbacks: Vec<Arc<dyn TokenCallback>>,
}

impl ClientOptionsBuilder {
    /// Enable OAuth2 with the given configuration.
    pub fn with_oauth(mut self, config: OAuth2Config) -> Self {
        self.oauth = Some(config);
        self
    }

    /// Enable automatic token renewal starting from `seed_token`.
    pub fn with_auto_renewal(mut self, seed_token: Token) -> Self {
        self.seed_token = Some(seed_token);
        self
    }

    /// Attach a token store for refresh-credential persistence.
    pub fn with_token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Attach a refresh-event callback. May be called multiple times;
    /// callbacks are notified in registration order.
    pub fn with_token_callback(mut self, callback: Arc<dyn TokenCallback>) -> Self {
        self.callbacks.push(callback);
        self
    }

    /// Validate and build the options.
    pub fn build(self) -> Result<ClientOptions, AuthError> {
        let seed_token = self.seed_token.ok_or_else(|| {
            AuthError::Configuration(ConfigurationError::InvalidConfig {
                message: "automatic renewal requires a seed token".to_string(),
            })
        })?;

        let oauth = self.oauth.ok_or_else(|| {
            AuthError::Configuration(ConfigurationError::InvalidConfig {
                message: "automatic renewal requires an OAuth2 configuration".to_string(),
            })
        })?;

        // A seed without an access credential is fine (the first caller
        // refreshes), but renewal is impossible without a refresh credential.
        if !seed_token.has_refresh_token() {
            return Err(AuthError::Configuration(
                ConfigurationError::InvalidConfig {
                    message: "seed token has no refresh credential to renew with".to_string(),
                },
            ));
        }

        Ok(ClientOptions {
            oauth,
            seed_token,
            store: self.store,
            callbacks: self.callbacks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::oauth2_config;
    use crate::token::{InMemoryTokenStore, RecordingTokenCallback};

    fn test_config() -> OAuth2Config {
        oauth2_config()
            .client_id("test-client")
            .client_secret("test-secret")
            .redirect_uri("https://example.com/callback")
            .authorization_endpoint("https://auth.example.com/authorize")
            .token_endpoint("https://auth.example.com/oauth/token")
            .resources_endpoint("https://api.example.com/resources")
            .build()
            .unwrap()
    }

    #[test]
    fn test_options_compose() {
        let options = ClientOptions::builder()
            .with_oauth(test_config())
            .with_auto_renewal(Token::bearer("A1", Some(3600)).with_refresh_token("R1"))
            .with_token_store(Arc::new(InMemoryTokenStore::new()))
            .with_token_callback(Arc::new(RecordingTokenCallback::new()))
            .with_token_callback(Arc::new(RecordingTokenCallback::new()))
            .build()
            .unwrap();

        assert_eq!(options.seed_token().access_token, "A1");
        assert!(options.store.is_some());
        assert_eq!(options.callbacks.len(), 2);
    }

    #[test]
    fn test_auto_renewal_requires_oauth() {
        let result = ClientOptions::builder()
            .with_auto_renewal(Token::bearer("A1", Some(3600)).with_refresh_token("R1"))
            .build();

        assert!(matches!(
            result,
            Err(AuthError::Configuration(ConfigurationError::InvalidConfig { .. }))
        ));
    }

    #[test]
    fn test_seed_token_needs_refresh_credential() {
        let result = ClientOptions::builder()
            .with_oauth(test_config())
            .with_auto_renewal(Token::bearer("A1", Some(3600)))
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_seed_token_fails_fast() {
        let result = ClientOptions::builder().with_oauth(test_config()).build();
        assert!(result.is_err());
    }
}
