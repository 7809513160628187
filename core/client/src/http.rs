//! HTTP gateway to the Photogate backend.
//!
//! Every request goes through [`ApiClient::send`] with an explicit
//! [`RetryPolicy`]; there is no process-wide interceptor.

use bytes::Bytes;
use reqwest::{header, multipart, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use photogate_common::{ApiPath, Error, Result};

use crate::config::ClientConfig;
use crate::retry::{RequestMeta, RetryExecutor, RetryPolicy};

/// Message used for every 401 so callers can surface a single prompt.
pub const NOT_AUTHENTICATED_MESSAGE: &str = "Not authenticated. Please login first.";

/// Value of a multipart form field.
#[derive(Debug, Clone)]
pub enum PartValue {
    Text(String),
    File {
        bytes: Bytes,
        file_name: String,
        mime_type: String,
    },
}

/// One field of a multipart form.
#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: PartValue::Text(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        bytes: Bytes,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: PartValue::File {
                bytes,
                file_name: file_name.into(),
                mime_type: mime_type.into(),
            },
        }
    }
}

/// Request body. Kept in owned form so a retried request is rebuilt
/// identically.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

/// Description of a single backend call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: ApiPath,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Updated in place by the retry executor.
    pub meta: RequestMeta,
}

impl ApiRequest {
    pub fn new(method: Method, path: ApiPath) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            body: RequestBody::Empty,
            meta: RequestMeta::default(),
        }
    }

    pub fn get(path: ApiPath) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: ApiPath) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: ApiPath) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a query parameter only when `value` is present.
    pub fn query_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Send a JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Send a multipart form body.
    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }
}

/// A fully-read backend response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    content_type: Option<String>,
    body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: Bytes) -> Self {
        Self {
            status,
            content_type: None,
            body,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// `Content-Type` header without parameters, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as lossy UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// `"<code> <reason>"`, e.g. `"500 Internal Server Error"`.
    pub fn status_line(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {}", self.status.as_u16(), reason),
            None => self.status.as_u16().to_string(),
        }
    }

    /// Map non-success statuses to typed errors.
    pub fn error_for_status(self) -> Result<Self> {
        let status = self.status;
        if status.is_success() {
            Ok(self)
        } else if status == StatusCode::UNAUTHORIZED {
            Err(Error::NotAuthenticated(NOT_AUTHENTICATED_MESSAGE.to_string()))
        } else if status == StatusCode::FORBIDDEN {
            Err(Error::PermissionDenied("Access denied".to_string()))
        } else if status == StatusCode::NOT_FOUND {
            Err(Error::NotFound("Resource not found".to_string()))
        } else {
            Err(Error::Api {
                status: status.as_u16(),
                body: self.text(),
            })
        }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::Serialization(format!("Failed to parse response: {}", e)))
    }
}

/// HTTP client for the backend `/api` surface.
///
/// Holds the session cookie jar, so one `ApiClient` (or its clones) is one
/// session.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("no-cache"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Backend origin without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    pub fn url_for(&self, path: &ApiPath) -> String {
        format!("{}{}", self.base_url, path.to_request_path())
    }

    /// Send a request under `policy`.
    ///
    /// Only timeouts are resubmitted; the attempt counter is kept in
    /// `request.meta`. Status codes are not interpreted here, see
    /// [`ApiResponse::error_for_status`].
    pub async fn send(
        &self,
        request: &mut ApiRequest,
        policy: &RetryPolicy,
    ) -> Result<ApiResponse> {
        let ApiRequest {
            method,
            path,
            query,
            body,
            meta,
        } = request;
        let (method, path, query, body) = (&*method, &*path, &*query, &*body);
        let label = format!("{} {}", method, path);

        RetryExecutor::new(policy)
            .execute(&label, meta, |attempt| {
                self.send_once(method, path, query, body, attempt)
            })
            .await
    }

    /// Fetch an arbitrary absolute URL (no retry, no status mapping).
    ///
    /// Accepts any content type in place of the client-wide JSON default.
    pub async fn fetch_url(&self, url: &str) -> Result<ApiResponse> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "*/*")
            .send()
            .await
            .map_err(map_transport_error)?;
        read_response(response).await
    }

    async fn send_once(
        &self,
        method: &Method,
        path: &ApiPath,
        query: &[(String, String)],
        body: &RequestBody,
        attempt: u32,
    ) -> Result<ApiResponse> {
        let url = self.url_for(path);
        if attempt == 0 {
            debug!("{} {}", method, url);
        } else {
            debug!("{} {} (retry {})", method, url, attempt);
        }

        let mut builder = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            builder = builder.query(query);
        }

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        let response = builder.send().await.map_err(map_transport_error)?;
        read_response(response).await
    }
}

fn build_form(parts: &[FormPart]) -> Result<multipart::Form> {
    let mut form = multipart::Form::new();
    for part in parts {
        form = match &part.value {
            PartValue::Text(value) => form.text(part.name.clone(), value.clone()),
            PartValue::File {
                bytes,
                file_name,
                mime_type,
            } => {
                let file_part = multipart::Part::bytes(bytes.to_vec())
                    .file_name(file_name.clone())
                    .mime_str(mime_type)
                    .map_err(|e| {
                        Error::InvalidInput(format!("Invalid MIME type '{}': {}", mime_type, e))
                    })?;
                form.part(part.name.clone(), file_part)
            }
        };
    }
    Ok(form)
}

async fn read_response(response: reqwest::Response) -> Result<ApiResponse> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body = response.bytes().await.map_err(map_transport_error)?;
    let response = ApiResponse::new(status, body);
    Ok(match content_type {
        Some(ct) => response.with_content_type(ct),
        None => response,
    })
}

fn map_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout(err.to_string())
    } else {
        Error::Network(err.to_string())
    }
}
