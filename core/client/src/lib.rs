//! Client-side gateway to the Photogate backend.
//!
//! The backend proxies Google Drive, runs the Google OAuth exchange and
//! evaluates ID photos. This crate wraps its REST surface:
//!
//! - [`http`]: request descriptors and the shared HTTP client
//! - [`retry`]: fixed-interval retry of timed-out requests
//! - [`auth`]: session status, login/logout and the redirect flow
//! - [`drive`]: Drive listing, upload, update, folders and content
//! - [`compliance`]: image normalization and compliance checks
//!
//! # Design Principles
//! - No ambient state: retry policy, redirect storage and navigation are
//!   passed in explicitly
//! - A 401 is always [`photogate_common::Error::NotAuthenticated`] and is
//!   never retried
//! - Status-style calls fail open into structured stand-ins; mutating calls
//!   return typed errors

pub mod auth;
pub mod compliance;
pub mod config;
pub mod drive;
pub mod http;
pub mod retry;

pub use auth::{AuthClient, AuthFlow, AuthStatus, OperationStatus, RedirectOutcome};
pub use compliance::{ComplianceClient, ComplianceOptions, ComplianceResult, ImageBlob, ImageSource};
pub use config::ClientConfig;
pub use drive::{DriveClient, DriveFile, DriveStatus, UploadFile};
pub use http::{ApiClient, ApiRequest, ApiResponse};
pub use retry::{RequestMeta, RetryExecutor, RetryPolicy};

use photogate_common::Result;

/// All backend clients sharing one HTTP session.
#[derive(Clone)]
pub struct Gateway {
    config: ClientConfig,
    api: ApiClient,
}

impl Gateway {
    /// Build the shared client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        Ok(Self { config, api })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.api.clone(), self.config.status_retry.clone())
    }

    pub fn drive(&self) -> DriveClient {
        DriveClient::new(self.api.clone(), self.config.status_retry.clone())
    }

    pub fn compliance(&self) -> ComplianceClient {
        ComplianceClient::new(self.api.clone(), self.config.status_retry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_gateway_rejects_invalid_config() {
        assert!(Gateway::new(ClientConfig::new("nonsense")).is_err());
    }

    #[tokio::test]
    async fn test_clients_share_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "JSESSIONID=s1; Path=/")
                    .set_body_json(serde_json::json!({"authenticated": true})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/drive/status"))
            .and(header("cookie", "JSESSIONID=s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "connected": true
            })))
            .mount(&server)
            .await;

        let gateway = Gateway::new(ClientConfig::new(server.uri())).unwrap();
        assert!(gateway.auth().get_status().await.authenticated);
        assert!(gateway.drive().get_status().await.connected);
    }
}
