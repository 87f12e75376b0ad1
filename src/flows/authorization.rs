//! Authorization Service
//!
//! Collaborator wrapping the external OAuth2 authorization server. Each
//! operation is a single RPC; token caching and rotation live in
//! [`crate::token`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{HttpRequest, HttpTransport};
use crate::error::{error_from_response, AuthError, ProtocolError};
use crate::types::{AccessibleResource, OAuth2Config, Token};

/// Authorization server interface.
#[async_trait]
pub trait AuthorizationService: Send + Sync {
    /// Build the user-facing authorization URL for the given scopes and state.
    fn authorization_url(&self, scopes: Option<&[String]>, state: &str) -> String;

    /// Exchange an authorization code for a token pair.
    async fn exchange_authorization_code(&self, code: &str) -> Result<Token, AuthError>;

    /// Exchange a refresh credential for a new token pair.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<Token, AuthError>;

    /// List the resources the access credential can reach.
    async fn accessible_resources(
        &self,
        access_token: &str,
    ) -> Result<Vec<AccessibleResource>, AuthError>;
}

/// Authorization service implementation over an HTTP transport.
pub struct OAuth2AuthorizationService<T: HttpTransport> {
    config: OAuth2Config,
    transport: Arc<T>,
}

impl<T: HttpTransport> OAuth2AuthorizationService<T> {
    /// Create a new authorization service.
    pub fn new(config: OAuth2Config, transport: Arc<T>) -> Self {
        Self { config, transport }
    }

    /// Get the configuration.
    pub fn config(&self) -> &OAuth2Config {
        &self.config
    }

    fn form_encode(params: &[(&str, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn token_request_headers() -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert(
            "content-type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        headers.insert("accept".to_string(), "application/json".to_string());
        headers
    }

    async fn post_token_request(&self, body: String) -> Result<Token, AuthError> {
        let mut request = HttpRequest::post(self.config.token_endpoint.clone());
        request.headers = Self::token_request_headers();
        request.body = Some(body);
        request.timeout = Some(self.config.timeout);

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(error_from_response(response.status, &response.body));
        }

        let token: Token = serde_json::from_str(&response.body).map_err(|e| {
            AuthError::Protocol(ProtocolError::InvalidJson {
                message: e.to_string(),
            })
        })?;

        if !token.is_valid() {
            return Err(AuthError::Protocol(ProtocolError::InvalidResponse {
                message: "token response without access token".to_string(),
            }));
        }

        Ok(token)
    }
}

#[async_trait]
impl<T: HttpTransport> AuthorizationService for OAuth2AuthorizationService<T> {
    fn authorization_url(&self, scopes: Option<&[String]>, state: &str) -> String {
        let scopes = scopes.unwrap_or(&self.config.scopes);
        let mut params = vec![
            ("response_type", "code".to_string()),
            ("client_id", self.config.client_id.clone()),
            ("redirect_uri", self.config.redirect_uri.clone()),
            ("state", state.to_string()),
        ];
        if !scopes.is_empty() {
            params.push(("scope", scopes.join(" ")));
        }

        format!(
            "{}?{}",
            self.config.authorization_endpoint,
            Self::form_encode(&params)
        )
    }

    async fn exchange_authorization_code(&self, code: &str) -> Result<Token, AuthError> {
        use secrecy::ExposeSecret;
        let body = Self::form_encode(&[
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("redirect_uri", self.config.redirect_uri.clone()),
            ("client_id", self.config.client_id.clone()),
            (
                "client_secret",
                self.config.client_secret.expose_secret().to_string(),
            ),
        ]);

        self.post_token_request(body).await
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<Token, AuthError> {
        use secrecy::ExposeSecret;
        let body = Self::form_encode(&[
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token.to_string()),
            ("client_id", self.config.client_id.clone()),
            (
                "client_secret",
                self.config.client_secret.expose_secret().to_string(),
            ),
        ]);

        self.post_token_request(body).await
    }

    async fn accessible_resources(
        &self,
        access_token: &str,
    ) -> Result<Vec<AccessibleResource>, AuthError> {
        let mut request = HttpRequest::get(self.config.resources_endpoint.clone());
        request.headers.insert(
            "authorization".to_string(),
            format!("Bearer {}", access_token),
        );
        request
            .headers
            .insert("accept".to_string(), "application/json".to_string());
        request.timeout = Some(self.config.timeout);

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(error_from_response(response.status, &response.body));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            AuthError::Protocol(ProtocolError::InvalidJson {
                message: e.to_string(),
            })
        })
    }
}

/// Mock authorization service for testing.
#[derive(Default)]
pub struct MockAuthorizationService {
    exchange_history: std::sync::Mutex<Vec<String>>,
    refresh_history: std::sync::Mutex<Vec<String>>,
    next_tokens: std::sync::Mutex<Vec<Token>>,
    next_error: std::sync::Mutex<Option<AuthError>>,
    resources: std::sync::Mutex<Vec<AccessibleResource>>,
    refresh_counter: std::sync::atomic::AtomicUsize,
}

impl MockAuthorizationService {
    /// Create new mock service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a token to return from the next exchange or refresh.
    pub fn queue_token(&self, token: Token) -> &Self {
        self.next_tokens.lock().unwrap().insert(0, token);
        self
    }

    /// Set next error.
    pub fn set_next_error(&self, error: AuthError) -> &Self {
        *self.next_error.lock().unwrap() = Some(error);
        self
    }

    /// Set accessible resources to return.
    pub fn set_resources(&self, resources: Vec<AccessibleResource>) -> &Self {
        *self.resources.lock().unwrap() = resources;
        self
    }

    /// Refresh credentials seen, in call order.
    pub fn refresh_history(&self) -> Vec<String> {
        self.refresh_history.lock().unwrap().clone()
    }

    /// Authorization codes seen, in call order.
    pub fn exchange_history(&self) -> Vec<String> {
        self.exchange_history.lock().unwrap().clone()
    }

    /// Number of refresh calls served.
    pub fn refresh_calls(&self) -> usize {
        self.refresh_history.lock().unwrap().len()
    }

    fn next_token(&self) -> Result<Token, AuthError> {
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Err(error);
        }
        if let Some(token) = self.next_tokens.lock().unwrap().pop() {
            return Ok(token);
        }
        let n = self
            .refresh_counter
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(
            Token::bearer(format!("mock-access-{}", n), Some(3600))
                .with_refresh_token(format!("mock-refresh-{}", n)),
        )
    }
}

#[async_trait]
impl AuthorizationService for MockAuthorizationService {
    fn authorization_url(&self, _scopes: Option<&[String]>, state: &str) -> String {
        format!("https://mock.example.com/authorize?state={}", state)
    }

    async fn exchange_authorization_code(&self, code: &str) -> Result<Token, AuthError> {
        self.exchange_history.lock().unwrap().push(code.to_string());
        self.next_token()
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<Token, AuthError> {
        self.refresh_history
            .lock()
            .unwrap()
            .push(refresh_token.to_string());
        self.next_token()
    }

    async fn accessible_resources(
        &self,
        _access_token: &str,
    ) -> Result<Vec<AccessibleResource>, AuthError> {
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self.resources.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::oauth2_config;
    use crate::core::MockHttpTransport;
    use crate::error::ProviderError;

    fn test_service(transport: Arc<MockHttpTransport>) -> OAuth2AuthorizationService<MockHttpTransport> {
        let config = oauth2_config()
            .client_id("test-client")
            .client_secret("test-secret")
            .redirect_uri("https://example.com/callback")
            .authorization_endpoint("https://auth.example.com/authorize")
            .token_endpoint("https://auth.example.com/oauth/token")
            .resources_endpoint("https://api.example.com/oauth/token/accessible-resources")
            .add_scope("read:jira-work")
            .build()
            .unwrap();
        OAuth2AuthorizationService::new(config, transport)
    }

    #[test]
    fn test_authorization_url() {
        let service = test_service(Arc::new(MockHttpTransport::new()));
        let url = service.authorization_url(None, "xyz-state");

        assert!(url.starts_with("https://auth.example.com/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=test-client"));
        assert!(url.contains("state=xyz-state"));
        assert!(url.contains("scope=read%3Ajira-work"));
    }

    #[tokio::test]
    async fn test_exchange_sends_authorization_code_grant() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json_response(
            200,
            &serde_json::json!({
                "access_token": "A1",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "R1"
            }),
        );

        let service = test_service(transport.clone());
        let token = service.exchange_authorization_code("auth-code-1").await.unwrap();
        assert_eq!(token.access_token, "A1");
        assert_eq!(token.refresh_token, Some("R1".to_string()));

        let request = transport.get_last_request().unwrap();
        assert_eq!(request.url, "https://auth.example.com/oauth/token");
        assert_eq!(
            request.headers.get("content-type").map(String::as_str),
            Some("application/x-www-form-urlencoded")
        );
        let body = request.body.unwrap();
        assert!(body.contains("grant_type=authorization_code"));
        assert!(body.contains("code=auth-code-1"));
        assert!(body.contains("redirect_uri=https%3A%2F%2Fexample.com%2Fcallback"));
        assert!(body.contains("client_id=test-client"));
        assert!(body.contains("client_secret=test-secret"));
    }

    #[tokio::test]
    async fn test_exchange_maps_provider_error() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json_response(
            401,
            &serde_json::json!({
                "error": "invalid_client",
                "error_description": "client authentication failed"
            }),
        );

        let service = test_service(transport);
        let error = service
            .exchange_authorization_code("auth-code-1")
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            AuthError::Provider(ProviderError::InvalidClient { .. })
        ));
    }

    #[tokio::test]
    async fn test_mock_service_records_exchanged_codes() {
        let mock = MockAuthorizationService::new();
        mock.queue_token(Token::bearer("A1", Some(3600)).with_refresh_token("R1"));

        let token = mock.exchange_authorization_code("code-xyz").await.unwrap();
        assert_eq!(token.access_token, "A1");
        assert_eq!(mock.exchange_history(), vec!["code-xyz".to_string()]);
    }

    #[tokio::test]
    async fn test_refresh_sends_form_encoded_grant() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json_response(
            200,
            &serde_json::json!({
                "access_token": "A2",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "R2"
            }),
        );

        let service = test_service(transport.clone());
        let token = service.refresh_access_token("R1").await.unwrap();
        assert_eq!(token.access_token, "A2");
        assert_eq!(token.refresh_token, Some("R2".to_string()));

        let request = transport.get_last_request().unwrap();
        assert_eq!(request.url, "https://auth.example.com/oauth/token");
        let body = request.body.unwrap();
        assert!(body.contains("grant_type=refresh_token"));
        assert!(body.contains("refresh_token=R1"));
        assert!(body.contains("client_secret=test-secret"));
    }

    #[tokio::test]
    async fn test_refresh_maps_provider_error() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json_response(
            400,
            &serde_json::json!({
                "error": "invalid_grant",
                "error_description": "refresh token revoked"
            }),
        );

        let service = test_service(transport);
        let error = service.refresh_access_token("R1").await.unwrap_err();
        assert!(matches!(
            error,
            AuthError::Provider(ProviderError::InvalidGrant { .. })
        ));
    }

    #[tokio::test]
    async fn test_token_response_without_access_token_rejected() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json_response(
            200,
            &serde_json::json!({ "access_token": "", "token_type": "Bearer" }),
        );

        let service = test_service(transport);
        let error = service.refresh_access_token("R1").await.unwrap_err();
        assert!(matches!(error, AuthError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_accessible_resources_sends_bearer() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json_response(
            200,
            &serde_json::json!([{
                "id": "cloud-1",
                "name": "Site",
                "url": "https://site.example.com"
            }]),
        );

        let service = test_service(transport.clone());
        let resources = service.accessible_resources("A1").await.unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].id, "cloud-1");

        let request = transport.get_last_request().unwrap();
        assert_eq!(
            request.headers.get("authorization").map(String::as_str),
            Some("Bearer A1")
        );
    }
}
