//! Configuration Types
//!
//! OAuth2 client configuration.

use secrecy::SecretString;
use std::time::Duration;

/// OAuth2 client configuration.
///
/// Built through [`crate::builders::OAuth2ConfigBuilder`], which validates
/// required fields at construction time.
#[derive(Clone)]
pub struct OAuth2Config {
    /// Client identifier.
    pub client_id: String,
    /// Client secret (confidential client).
    pub client_secret: SecretString,
    /// Redirect URI registered with the provider.
    pub redirect_uri: String,
    /// Default scopes to request.
    pub scopes: Vec<String>,
    /// Authorization endpoint URL.
    pub authorization_endpoint: String,
    /// Token endpoint URL.
    pub token_endpoint: String,
    /// Accessible-resources endpoint URL.
    pub resources_endpoint: String,
    /// HTTP timeout for authorization server calls.
    pub timeout: Duration,
}

impl std::fmt::Debug for OAuth2Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth2Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .field("resources_endpoint", &self.resources_endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Default timeout for authorization server calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
