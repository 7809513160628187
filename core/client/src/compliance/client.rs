//! Client for `/api/compliance/check` and `/api/ping`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use photogate_common::{ApiPath, Error, Result};

use super::image::{base64_to_blob, is_base64, ImageBlob, ImageSource, DEFAULT_IMAGE_MIME};
use crate::http::{ApiClient, ApiRequest, FormPart};
use crate::retry::RetryPolicy;

/// Verdict on an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub compliant: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

/// Explicit `null` reads as the field's default, like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ComplianceResult {
    /// A non-compliant result carrying a single issue.
    pub fn failure(issue: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            compliant: false,
            issues: vec![issue.into()],
            message: message.into(),
        }
    }
}

/// Extra information sent with a check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplianceOptions {
    /// The background was replaced in the editor.
    pub has_replaced_background: bool,
    /// Replacement colour, only sent with `has_replaced_background`.
    pub background_color: Option<String>,
}

impl ComplianceOptions {
    pub fn with_replaced_background(color: Option<String>) -> Self {
        Self {
            has_replaced_background: true,
            background_color: color,
        }
    }
}

/// Backend compliance API.
#[derive(Clone)]
pub struct ComplianceClient {
    api: ApiClient,
    status_retry: RetryPolicy,
}

impl ComplianceClient {
    /// Create a compliance client; `status_retry` applies to `ping` only.
    pub fn new(api: ApiClient, status_retry: RetryPolicy) -> Self {
        Self { api, status_retry }
    }

    /// Check an image.
    ///
    /// Never fails: missing input, transport errors and malformed replies
    /// all come back as a non-compliant [`ComplianceResult`], distinguishable
    /// only by message text.
    pub async fn check_image_compliance(
        &self,
        image: Option<&ImageBlob>,
        options: &ComplianceOptions,
    ) -> ComplianceResult {
        let Some(image) = image else {
            error!("No image blob provided for compliance check");
            return ComplianceResult::failure(
                "No image provided for compliance check",
                "Compliance check failed",
            );
        };

        debug!(
            "Checking compliance: type={}, size={}, options={:?}",
            image.mime_type,
            image.len(),
            options
        );

        let mut parts = vec![FormPart::file(
            "image",
            image.bytes.clone(),
            "image.jpg",
            image.mime_type.clone(),
        )];
        if options.has_replaced_background {
            parts.push(FormPart::text("hasReplacedBackground", "true"));
            if let Some(color) = &options.background_color {
                parts.push(FormPart::text("backgroundColor", color.clone()));
            }
        }

        let mut request = ApiRequest::post(ApiPath::parse("compliance/check")).multipart(parts);
        let response = match self.api.send(&mut request, &RetryPolicy::none()).await {
            Ok(response) => response,
            Err(Error::InvalidInput(msg)) => {
                return ComplianceResult::failure(
                    format!("Request error: {}", msg),
                    "Compliance check failed",
                );
            }
            Err(err) => {
                error!("Network error during compliance check: {}", err);
                return ComplianceResult::failure(
                    format!(
                        "Cannot connect to the server. Make sure your backend is running at {}",
                        self.api.base_url()
                    ),
                    "Server connection failed",
                );
            }
        };

        if !response.is_success() {
            error!("Server returned error status: {}", response.status());
            return ComplianceResult::failure(
                format!("Server error: {}", response.status_line()),
                "Compliance check failed",
            );
        }

        let value: Value = match response.json() {
            Ok(value) => value,
            Err(err) => {
                error!("Error parsing server response: {}", err);
                return ComplianceResult::failure(
                    "Could not parse server response",
                    "Compliance check error",
                );
            }
        };

        if !value.is_object() {
            error!("Unexpected response format: {}", value);
            return ComplianceResult::failure(
                "Server returned an unexpected response format",
                "Compliance check error",
            );
        }

        match serde_json::from_value::<ComplianceResult>(value) {
            Ok(result) => {
                info!(
                    "Compliance check: compliant={}, {} issues",
                    result.compliant,
                    result.issues.len()
                );
                result
            }
            Err(err) => {
                error!("Error parsing server response: {}", err);
                ComplianceResult::failure(
                    "Could not parse server response",
                    "Compliance check error",
                )
            }
        }
    }

    /// Normalize any accepted input into an [`ImageBlob`].
    ///
    /// A blob is returned unchanged; `blob:`/`http` text is fetched;
    /// data URLs and bare base64 are decoded.
    pub async fn process_image_for_compliance(&self, source: ImageSource) -> Result<ImageBlob> {
        let text = match source {
            ImageSource::Blob(blob) => {
                debug!("Image is already a blob, size {}", blob.len());
                return Ok(blob);
            }
            ImageSource::Text(text) => text,
        };

        if text.starts_with("blob:") || text.starts_with("http") {
            debug!("Image is a URL, fetching");
            return self.fetch_image(&text).await;
        }

        if text.contains("base64,") || is_base64(&text) {
            debug!("Image is base64, decoding");
            return base64_to_blob(&text)
                .ok_or_else(|| Error::InvalidInput("Invalid base64 image data".to_string()));
        }

        error!("Unsupported image source format");
        Err(Error::InvalidInput("Unsupported image source format".to_string()))
    }

    /// Normalize `source` and check it. Normalization failures are folded
    /// into the result.
    pub async fn check_source(
        &self,
        source: ImageSource,
        options: &ComplianceOptions,
    ) -> ComplianceResult {
        match self.process_image_for_compliance(source).await {
            Ok(blob) => self.check_image_compliance(Some(&blob), options).await,
            Err(err) => {
                error!("Error processing image for compliance: {}", err);
                ComplianceResult::failure(
                    format!("Request error: {}", err),
                    "Compliance check failed",
                )
            }
        }
    }

    async fn fetch_image(&self, url: &str) -> Result<ImageBlob> {
        let response = self.api.fetch_url(url).await?;
        if !response.is_success() {
            return Err(Error::Api {
                status: response.status().as_u16(),
                body: format!("Failed to fetch image: {}", response.status_line()),
            });
        }
        let mime = response
            .content_type()
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or(DEFAULT_IMAGE_MIME)
            .to_string();
        Ok(ImageBlob::new(response.body().clone(), mime))
    }

    /// Whether the backend answers `/api/ping` with a success status.
    pub async fn ping(&self) -> bool {
        let mut request = ApiRequest::get(ApiPath::parse("ping"));
        match self.api.send(&mut request, &self.status_retry).await {
            Ok(response) if response.is_success() => true,
            Ok(response) => {
                error!("Backend server responded with error: {}", response.status());
                false
            }
            Err(err) => {
                error!("Could not connect to backend server: {}", err);
                false
            }
        }
    }
}
