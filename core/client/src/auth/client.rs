//! Client for the backend's `/api/auth` endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error};
use url::Url;

use photogate_common::{ApiPath, Error, Result};

use crate::http::{ApiClient, ApiRequest};
use crate::retry::RetryPolicy;

/// Authentication status reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Any other fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthStatus {
    /// Fail-open stand-in used when the status could not be obtained.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            message: Some(message.into()),
            extra: Map::new(),
        }
    }
}

/// Generic `{ success, message }` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OperationStatus {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            extra: Map::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            extra: Map::new(),
        }
    }

    /// Stand-in built from an error, formatted as `"Error: ..."`.
    pub fn from_error(err: &Error) -> Self {
        Self::failed(format!("Error: {}", err))
    }
}

/// Authorization URL returned by `/api/auth/url` and
/// `/api/auth/force-new-login`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationUrl {
    pub url: Url,
    /// Whether the backend already holds credentials for this user.
    pub has_existing_credentials: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizationUrlResponse {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    has_existing_credentials: Option<Value>,
}

impl AuthorizationUrlResponse {
    fn into_authorization_url(self) -> Result<AuthorizationUrl> {
        let raw = self
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| Error::InvalidInput("Invalid authorization URL response".to_string()))?;
        let url = Url::parse(&raw)
            .map_err(|e| Error::InvalidInput(format!("Invalid authorization URL: {}", e)))?;

        // The backend sends this flag as a string.
        let has_existing_credentials = match self.has_existing_credentials {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        };

        Ok(AuthorizationUrl {
            url,
            has_existing_credentials,
        })
    }
}

/// Backend authentication API.
#[derive(Clone)]
pub struct AuthClient {
    api: ApiClient,
    status_retry: RetryPolicy,
}

impl AuthClient {
    /// Create an auth client; `status_retry` applies to `get_status` only.
    pub fn new(api: ApiClient, status_retry: RetryPolicy) -> Self {
        Self { api, status_retry }
    }

    /// Current authentication status.
    ///
    /// Never fails: any network, status or parse error yields
    /// `{ authenticated: false, message: "Error: ..." }`.
    pub async fn get_status(&self) -> AuthStatus {
        match self.fetch_status().await {
            Ok(status) => {
                debug!("Auth status: authenticated={}", status.authenticated);
                status
            }
            Err(err) => {
                error!("Error checking auth status: {}", err);
                AuthStatus::unauthenticated(format!("Error: {}", err))
            }
        }
    }

    async fn fetch_status(&self) -> Result<AuthStatus> {
        let mut request = ApiRequest::get(ApiPath::parse("auth/status"));
        let response = self.api.send(&mut request, &self.status_retry).await?;
        if !response.is_success() {
            return Err(Error::Api {
                status: response.status().as_u16(),
                body: format!("Status check failed: {}", response.status_line()),
            });
        }
        response.json()
    }

    /// Fetch the Google authorization URL.
    pub async fn authorization_url(&self) -> Result<AuthorizationUrl> {
        self.fetch_authorization_url("auth/url").await
    }

    /// Fetch an authorization URL that forces account selection and consent.
    pub async fn force_new_login_url(&self) -> Result<AuthorizationUrl> {
        self.fetch_authorization_url("auth/force-new-login").await
    }

    async fn fetch_authorization_url(&self, path: &str) -> Result<AuthorizationUrl> {
        let mut request = ApiRequest::get(ApiPath::parse(path));
        let response = self
            .api
            .send(&mut request, &RetryPolicy::none())
            .await?
            .error_for_status()?;
        response
            .json::<AuthorizationUrlResponse>()?
            .into_authorization_url()
    }

    /// Ask the backend to discard stored OAuth tokens.
    pub async fn clear_tokens(&self) -> Result<OperationStatus> {
        self.simple_call(ApiRequest::get(ApiPath::parse("auth/clear-tokens")))
            .await
    }

    /// Ask the backend to force a token refresh.
    pub async fn fix_tokens(&self) -> Result<OperationStatus> {
        self.simple_call(ApiRequest::get(ApiPath::parse("auth/fix-tokens")))
            .await
    }

    /// Log out. Failures are reported as `{ success: false, message }`.
    pub async fn logout(&self) -> OperationStatus {
        match self
            .simple_call(ApiRequest::post(ApiPath::parse("auth/logout")))
            .await
        {
            Ok(status) => status,
            Err(err) => {
                error!("Error during logout: {}", err);
                OperationStatus::from_error(&err)
            }
        }
    }

    async fn simple_call(&self, mut request: ApiRequest) -> Result<OperationStatus> {
        let response = self
            .api
            .send(&mut request, &RetryPolicy::none())
            .await?
            .error_for_status()?;
        response.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> AuthClient {
        let api = ApiClient::new(&ClientConfig::new(server.uri())).unwrap();
        AuthClient::new(api, RetryPolicy::new(2).with_retry_delay(Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_get_status_passes_body_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "authenticated": true,
                "message": "User is authenticated with Google",
                "email": "a@example.com"
            })))
            .mount(&server)
            .await;

        let status = client(&server).get_status().await;
        assert!(status.authenticated);
        assert_eq!(status.extra["email"], "a@example.com");
    }

    #[tokio::test]
    async fn test_get_status_fails_open_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/status"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let status = client(&server).get_status().await;
        assert!(!status.authenticated);
        assert!(status.message.unwrap().starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_get_status_fails_open_on_bad_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/status"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        assert!(!client(&server).get_status().await.authenticated);
    }

    #[tokio::test]
    async fn test_authorization_url_parses_string_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/url"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "https://accounts.google.com/o/oauth2/auth?x=1",
                "hasExistingCredentials": "true"
            })))
            .mount(&server)
            .await;

        let auth = client(&server).authorization_url().await.unwrap();
        assert_eq!(auth.url.host_str(), Some("accounts.google.com"));
        assert!(auth.has_existing_credentials);
    }

    #[tokio::test]
    async fn test_authorization_url_missing_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/url"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = client(&server).authorization_url().await.unwrap_err();
        assert!(err.to_string().contains("Invalid authorization URL response"));
    }

    #[tokio::test]
    async fn test_fix_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/fix-tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "Tokens refreshed"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let status = client(&server).fix_tokens().await.unwrap();
        assert!(status.success);
        assert_eq!(status.message.as_deref(), Some("Tokens refreshed"));
    }

    #[tokio::test]
    async fn test_fix_tokens_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/fix-tokens"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).fix_tokens().await.unwrap_err();
        assert!(err.requires_login());
    }

    #[tokio::test]
    async fn test_logout_failure_is_structured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&server)
            .await;

        let status = client(&server).logout().await;
        assert!(!status.success);
        assert!(status.message.unwrap().starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_logout_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "Logged out successfully"
            })))
            .mount(&server)
            .await;

        let status = client(&server).logout().await;
        assert!(status.success);
        assert_eq!(status.message.as_deref(), Some("Logged out successfully"));
    }
}
