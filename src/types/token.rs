//! Token Types
//!
//! Wire-format token issued by the authorization server.

use serde::{Deserialize, Serialize};

/// Token issued by the authorization server on exchange or refresh.
///
/// Matches the token endpoint's JSON wire format. A new value is created
/// on every refresh; tokens are superseded, never mutated in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Access credential used to authenticate API calls.
    pub access_token: String,
    /// Token type (usually "Bearer").
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds from issuance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Refresh credential; may be absent, may rotate on each refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Granted scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Token {
    /// Create a bearer token with the given access credential and lifetime.
    pub fn bearer(access_token: impl Into<String>, expires_in: Option<u64>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            expires_in,
            refresh_token: None,
            scope: None,
        }
    }

    /// Attach a refresh credential.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// A token without an access credential is invalid and must never be
    /// injected into a request.
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Check if the token carries a non-empty refresh credential.
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }

    /// Format as an `Authorization` header value.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}
