//! Dispatch of shell requests.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, error, info};

use photogate_common::{Error, Result};

use crate::dialog::{FileDialog, IMAGE_FILTER};
use crate::rpc::{ShellRequest, ShellResponse};

/// Reason reported when the user dismisses a dialog.
pub const USER_CANCELED: &str = "User canceled";

enum Outcome {
    Done(ShellResponse),
    Canceled,
}

impl From<Error> for ShellResponse {
    fn from(err: Error) -> Self {
        ShellResponse::failure(err.to_string())
    }
}

/// Answers shell requests using a [`FileDialog`].
pub struct ShellHandler<D> {
    dialog: D,
    app_version: String,
}

impl<D: FileDialog> ShellHandler<D> {
    pub fn new(dialog: D, app_version: impl Into<String>) -> Self {
        Self {
            dialog,
            app_version: app_version.into(),
        }
    }

    /// Answer a request. Failures are reported inside the envelope.
    pub async fn handle(&self, request: ShellRequest) -> ShellResponse {
        let channel = request.channel();
        debug!(channel, "Handling shell request");

        let result = match request {
            ShellRequest::SaveImage {
                buffer,
                file_name,
                default_path,
            } => self.save_image(&buffer, &file_name, default_path).await,
            ShellRequest::OpenImage => self.open_image().await,
            ShellRequest::GetAppVersion => {
                Ok(Outcome::Done(ShellResponse::version(&self.app_version)))
            }
        };

        match result {
            Ok(Outcome::Done(response)) => response,
            Ok(Outcome::Canceled) => {
                info!(channel, "Dialog canceled");
                ShellResponse::failure(USER_CANCELED)
            }
            Err(e) => {
                error!(channel, error = %e, "Shell request failed");
                e.into()
            }
        }
    }

    /// Answer a JSON-encoded request with a JSON-encoded envelope.
    pub async fn handle_json(&self, payload: &str) -> String {
        let response = match serde_json::from_str::<ShellRequest>(payload) {
            Ok(request) => self.handle(request).await,
            Err(e) => Error::from(e).into(),
        };
        // A response with only strings and bools always serializes.
        serde_json::to_string(&response)
            .unwrap_or_else(|_| r#"{"success":false,"reason":"Serialization failed"}"#.to_string())
    }

    async fn save_image(
        &self,
        buffer: &[u8],
        file_name: &str,
        default_path: Option<PathBuf>,
    ) -> Result<Outcome> {
        let default_path = default_path.unwrap_or_else(|| PathBuf::from(file_name));
        let Some(path) = self.dialog.pick_save_path(&default_path, &IMAGE_FILTER).await else {
            return Ok(Outcome::Canceled);
        };

        tokio::fs::write(&path, buffer).await?;
        info!(path = %path.display(), bytes = buffer.len(), "Image saved");
        Ok(Outcome::Done(ShellResponse::saved(path)))
    }

    async fn open_image(&self) -> Result<Outcome> {
        let paths = self.dialog.pick_open_paths(&IMAGE_FILTER).await;
        let Some(path) = paths.into_iter().next() else {
            return Ok(Outcome::Canceled);
        };

        if !IMAGE_FILTER.accepts(&path) {
            return Err(Error::InvalidInput(format!(
                "Unsupported file type: {}",
                path.display()
            )));
        }

        let bytes = tokio::fs::read(&path).await?;
        let file_name = file_name_of(&path);
        info!(path = %path.display(), bytes = bytes.len(), "Image opened");
        Ok(Outcome::Done(ShellResponse::opened(
            path,
            file_name,
            STANDARD.encode(bytes),
        )))
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
