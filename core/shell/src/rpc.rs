//! Request/response messages exchanged with the UI.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A request on one of the shell channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "kebab-case")]
pub enum ShellRequest {
    /// Ask the user where to save `buffer`, then write it.
    #[serde(rename_all = "camelCase")]
    SaveImage {
        #[serde(with = "base64_bytes")]
        buffer: Vec<u8>,
        file_name: String,
        #[serde(default)]
        default_path: Option<PathBuf>,
    },
    /// Ask the user for an image and return its content.
    OpenImage,
    /// Report the application version.
    GetAppVersion,
}

impl ShellRequest {
    /// Channel name as used on the wire.
    pub fn channel(&self) -> &'static str {
        match self {
            ShellRequest::SaveImage { .. } => "save-image",
            ShellRequest::OpenImage => "open-image",
            ShellRequest::GetAppVersion => "get-app-version",
        }
    }
}

/// Envelope returned on every channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Base64-encoded file content (`open-image`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Why the request did not succeed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ShellResponse {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn saved(path: PathBuf) -> Self {
        Self {
            success: true,
            file_path: Some(path),
            ..Self::default()
        }
    }

    pub fn opened(path: PathBuf, file_name: String, buffer: String) -> Self {
        Self {
            success: true,
            file_path: Some(path),
            file_name: Some(file_name),
            buffer: Some(buffer),
            ..Self::default()
        }
    }

    pub fn version(version: impl Into<String>) -> Self {
        Self {
            success: true,
            version: Some(version.into()),
            ..Self::default()
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.trim())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_request_wire_format() {
        let request: ShellRequest = serde_json::from_value(serde_json::json!({
            "channel": "save-image",
            "buffer": "aGVsbG8=",
            "fileName": "photo.jpg",
            "defaultPath": "/tmp/photo.jpg"
        }))
        .unwrap();
        assert_eq!(
            request,
            ShellRequest::SaveImage {
                buffer: b"hello".to_vec(),
                file_name: "photo.jpg".to_string(),
                default_path: Some(PathBuf::from("/tmp/photo.jpg")),
            }
        );
        assert_eq!(request.channel(), "save-image");
    }

    #[test]
    fn test_unit_channels() {
        let open: ShellRequest = serde_json::from_str(r#"{"channel":"open-image"}"#).unwrap();
        assert_eq!(open, ShellRequest::OpenImage);
        let version: ShellRequest =
            serde_json::from_str(r#"{"channel":"get-app-version"}"#).unwrap();
        assert_eq!(version.channel(), "get-app-version");
    }

    #[test]
    fn test_failure_envelope_omits_empty_fields() {
        let json = serde_json::to_value(ShellResponse::failure("User canceled")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "reason": "User canceled"}));
    }
}
