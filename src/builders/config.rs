//! Configuration Builder
//!
//! Fluent builder for OAuth2 configuration. Required fields are
//! validated at build time, never at request time.

use std::time::Duration;

use crate::error::{AuthError, ConfigurationError};
use crate::types::{OAuth2Config, DEFAULT_TIMEOUT};
use secrecy::SecretString;

/// OAuth2 configuration builder.
#[derive(Default)]
pub struct OAuth2ConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    redirect_uri: Option<String>,
    scopes: Vec<String>,
    authorization_endpoint: Option<String>,
    token_endpoint: Option<String>,
    resources_endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl OAuth2ConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    /// Set redirect URI.
    pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Set default scopes.
    pub fn scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Add a default scope.
    pub fn add_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }

    /// Set authorization endpoint.
    pub fn authorization_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.authorization_endpoint = Some(endpoint.into());
        self
    }

    /// Set token endpoint.
    pub fn token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = Some(endpoint.into());
        self
    }

    /// Set accessible-resources endpoint.
    pub fn resources_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.resources_endpoint = Some(endpoint.into());
        self
    }

    /// Set request timeout for authorization server calls.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn require(field: Option<String>, name: &str) -> Result<String, AuthError> {
        field.ok_or_else(|| {
            AuthError::Configuration(ConfigurationError::MissingField {
                field: name.to_string(),
            })
        })
    }

    /// Build the OAuth2 configuration.
    pub fn build(self) -> Result<OAuth2Config, AuthError> {
        let client_id = Self::require(self.client_id, "client_id")?;
        let redirect_uri = Self::require(self.redirect_uri, "redirect_uri")?;
        let authorization_endpoint =
            Self::require(self.authorization_endpoint, "authorization_endpoint")?;
        let token_endpoint = Self::require(self.token_endpoint, "token_endpoint")?;
        let resources_endpoint = Self::require(self.resources_endpoint, "resources_endpoint")?;

        let client_secret = self.client_secret.ok_or_else(|| {
            AuthError::Configuration(ConfigurationError::MissingField {
                field: "client_secret".to_string(),
            })
        })?;

        Ok(OAuth2Config {
            client_id,
            client_secret,
            redirect_uri,
            scopes: self.scopes,
            authorization_endpoint,
            token_endpoint,
            resources_endpoint,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}

/// Create a new OAuth2 configuration builder.
pub fn oauth2_config() -> OAuth2ConfigBuilder {
    OAuth2ConfigBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_builder() -> OAuth2ConfigBuilder {
        OAuth2ConfigBuilder::new()
            .client_id("test-client")
            .client_secret("test-secret")
            .redirect_uri("https://example.com/callback")
            .authorization_endpoint("https://auth.example.com/authorize")
            .token_endpoint("https://auth.example.com/oauth/token")
            .resources_endpoint("https://api.example.com/oauth/token/accessible-resources")
    }

    #[test]
    fn test_builder_success() {
        let config = complete_builder()
            .add_scope("read:jira-work")
            .add_scope("offline_access")
            .build()
            .unwrap();

        assert_eq!(config.client_id, "test-client");
        assert_eq!(config.scopes, vec!["read:jira-work", "offline_access"]);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_builder_missing_client_id() {
        let result = OAuth2ConfigBuilder::new()
            .client_secret("test-secret")
            .redirect_uri("https://example.com/callback")
            .authorization_endpoint("https://auth.example.com/authorize")
            .token_endpoint("https://auth.example.com/oauth/token")
            .resources_endpoint("https://api.example.com/resources")
            .build();

        assert!(matches!(
            result,
            Err(AuthError::Configuration(
                ConfigurationError::MissingField { field }
            )) if field == "client_id"
        ));
    }

    #[test]
    fn test_builder_missing_secret() {
        let result = OAuth2ConfigBuilder::new()
            .client_id("test-client")
            .redirect_uri("https://example.com/callback")
            .authorization_endpoint("https://auth.example.com/authorize")
            .token_endpoint("https://auth.example.com/oauth/token")
            .resources_endpoint("https://api.example.com/resources")
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_builder_custom_timeout() {
        let config = complete_builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
