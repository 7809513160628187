//! Client for the backend's Google Drive proxy (`/api/drive`).
//!
//! Nothing is cached: every call goes to the backend. A 401 surfaces as
//! [`Error::NotAuthenticated`] and is never retried.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, error, info};

use photogate_common::{ApiPath, Error, FileId, Result};

use crate::auth::OperationStatus;
use crate::http::{ApiClient, ApiRequest, FormPart};
use crate::retry::RetryPolicy;

/// MIME type Google Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Drive file or folder metadata as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID.
    #[serde(alias = "fileId")]
    pub id: String,
    /// File name.
    #[serde(default, alias = "fileName")]
    pub name: String,
    /// MIME type.
    #[serde(default)]
    pub mime_type: String,
    /// Parent folder IDs.
    #[serde(default)]
    pub parents: Vec<String>,
    /// Single parent, when the backend reports it that way.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_folder_id: Option<String>,
    /// Size in bytes; Drive sends it as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Value>,
    /// Last modification time.
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub modified_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_content_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_link: Option<String>,
    /// Any other fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DriveFile {
    /// Check if this is a folder.
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// Check if this is an image.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Get size as u64.
    pub fn size_bytes(&self) -> Option<u64> {
        match self.size.as_ref()? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    /// Parent folder, from either representation.
    pub fn parent(&self) -> Option<&str> {
        self.parent_folder_id
            .as_deref()
            .or_else(|| self.parents.first().map(String::as_str))
    }
}

/// Accepts RFC 3339 strings or epoch milliseconds; anything else is `None`.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|d| d.with_timezone(&Utc)),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Some(Value::Object(map)) => map
            .get("value")
            .and_then(Value::as_i64)
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    })
}

/// Drive connection status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveStatus {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Set on the stand-in when the backend answered 401.
    #[serde(default)]
    pub login_required: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DriveStatus {
    fn disconnected(err: &Error) -> Self {
        Self {
            connected: false,
            message: Some(format!("Error: {}", err)),
            login_required: err.requires_login(),
            extra: Map::new(),
        }
    }
}

/// Result of listing a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileListing {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reply to an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of updating a file.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub file: DriveFile,
    /// The backend could not update in place and created a new file.
    pub created_new_file: bool,
    pub message: Option<String>,
}

/// Base64 file content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileContent {
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileContent {
    /// Decode the base64 payload.
    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.content.trim())
            .map_err(|e| Error::Serialization(format!("Invalid base64 content: {}", e)))
    }
}

/// Result of `/api/drive/test-connection`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTest {
    #[serde(default)]
    pub connection_successful: bool,
    #[serde(default)]
    pub login_required: bool,
    #[serde(default)]
    pub file_count: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A file to send to Drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Bytes,
    pub mime_type: String,
}

impl UploadFile {
    pub fn new(
        name: impl Into<String>,
        bytes: impl Into<Bytes>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Read a local file; the MIME type is derived from the extension.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidInput(format!("No file name in {}", path.display())))?
            .to_string();
        let mime_type = mime_for_name(&name).to_string();
        Ok(Self::new(name, bytes, mime_type))
    }

    fn into_part(self, field: &str) -> FormPart {
        FormPart::file(field, self.bytes, self.name, self.mime_type)
    }
}

/// MIME type for a file name, by extension.
pub fn mime_for_name(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Backend Drive API client.
#[derive(Clone)]
pub struct DriveClient {
    api: ApiClient,
    status_retry: RetryPolicy,
}

impl DriveClient {
    /// Create a Drive client; `status_retry` applies to status and
    /// connection-test calls only.
    pub fn new(api: ApiClient, status_retry: RetryPolicy) -> Self {
        Self { api, status_retry }
    }

    /// Drive connection status. Never fails; see [`DriveStatus`].
    pub async fn get_status(&self) -> DriveStatus {
        let mut request = ApiRequest::get(ApiPath::parse("drive/status"));
        let result = match self.api.send(&mut request, &self.status_retry).await {
            Ok(response) => response.error_for_status().and_then(|r| r.json()),
            Err(err) => Err(err),
        };

        result.unwrap_or_else(|err| {
            error!("Error checking drive status: {}", err);
            DriveStatus::disconnected(&err)
        })
    }

    /// List a folder (root when `folder_id` is `None`).
    pub async fn list_files(
        &self,
        folder_id: Option<&FileId>,
        only_images: bool,
    ) -> Result<FileListing> {
        let mut request = ApiRequest::get(ApiPath::parse("drive/files"))
            .query_opt("folderId", folder_id.map(FileId::as_str));
        if only_images {
            request = request.query("imagesOnly", "true");
        }

        let listing: FileListing = self.call(request, "listing files").await?;
        debug!("Listed {} files", listing.files.len());
        Ok(listing)
    }

    /// Upload a new file.
    pub async fn upload_file(
        &self,
        file: UploadFile,
        folder_id: Option<&FileId>,
    ) -> Result<UploadReceipt> {
        let mut parts = vec![file.into_part("file")];
        if let Some(folder) = folder_id {
            parts.push(FormPart::text("folderId", folder.as_str()));
        }

        let request = ApiRequest::post(ApiPath::parse("drive/upload")).multipart(parts);
        self.call(request, "uploading file").await
    }

    /// Replace the content (and optionally the name) of an existing file.
    pub async fn update_file(
        &self,
        file_id: &FileId,
        file: UploadFile,
        new_name: Option<&str>,
    ) -> Result<UpdateOutcome> {
        let mut parts = vec![file.into_part("file")];
        if let Some(name) = new_name {
            parts.push(FormPart::text("newName", name));
        }

        let request = ApiRequest::put(ApiPath::parse("drive/files").segment(file_id.as_str()))
            .multipart(parts);
        let body: Value = self.call(request, "updating file").await?;

        if body.get("isNewFile").and_then(Value::as_bool) == Some(true) {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(String::from);
            info!(
                "Created new file instead of updating: {}",
                message.as_deref().unwrap_or("")
            );
            let nested = body
                .get("file")
                .cloned()
                .ok_or_else(|| Error::Serialization("isNewFile reply without file".to_string()))?;
            return Ok(UpdateOutcome {
                file: serde_json::from_value(nested)?,
                created_new_file: true,
                message,
            });
        }

        Ok(UpdateOutcome {
            file: serde_json::from_value(body)?,
            created_new_file: false,
            message: None,
        })
    }

    /// Create a folder.
    pub async fn create_folder(&self, name: &str, parent_id: Option<&FileId>) -> Result<DriveFile> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("Folder name cannot be empty".to_string()));
        }
        let request = ApiRequest::post(ApiPath::parse("drive/folders"))
            .query("folderName", name)
            .query_opt("parentFolderId", parent_id.map(FileId::as_str));
        self.call(request, "creating folder").await
    }

    /// Full file content.
    pub async fn get_file_content(&self, file_id: &FileId) -> Result<FileContent> {
        let request = ApiRequest::get(Self::file_path(file_id, "content"));
        self.call(request, "getting file content").await
    }

    /// Thumbnail content.
    pub async fn get_thumbnail(&self, file_id: &FileId) -> Result<FileContent> {
        let request =
            ApiRequest::get(Self::file_path(file_id, "content")).query("thumbnail", "true");
        self.call(request, "getting thumbnail").await
    }

    /// Detailed metadata.
    pub async fn get_file_details(&self, file_id: &FileId) -> Result<DriveFile> {
        let request = ApiRequest::get(Self::file_path(file_id, "details"));
        self.call(request, "getting file details").await
    }

    /// Probe the backend's Drive connection. A 401 is reported as
    /// `{ connectionSuccessful: false, loginRequired: true }`.
    pub async fn test_connection(&self) -> Result<ConnectionTest> {
        let mut request = ApiRequest::get(ApiPath::parse("drive/test-connection"));
        let response = self.api.send(&mut request, &self.status_retry).await?;

        match response.error_for_status() {
            Ok(response) => response.json(),
            Err(err) if err.requires_login() => Ok(ConnectionTest {
                connection_successful: false,
                login_required: true,
                file_count: None,
                message: Some(err.to_string()),
                extra: Map::new(),
            }),
            Err(err) => {
                error!("Error testing drive connection: {}", err);
                Err(err)
            }
        }
    }

    /// Drop the backend's stored Drive credentials.
    pub async fn logout(&self) -> Result<OperationStatus> {
        let request = ApiRequest::post(ApiPath::parse("drive/logout"));
        self.call(request, "logging out from Drive").await
    }

    fn file_path(file_id: &FileId, leaf: &str) -> ApiPath {
        ApiPath::parse("drive/files")
            .segment(file_id.as_str())
            .join(leaf)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        mut request: ApiRequest,
        what: &str,
    ) -> Result<T> {
        let result = match self.api.send(&mut request, &RetryPolicy::none()).await {
            Ok(response) => response.error_for_status().and_then(|r| r.json()),
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            error!("Error {}: {}", what, err);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> DriveClient {
        let api = ApiClient::new(&ClientConfig::new(server.uri())).unwrap();
        DriveClient::new(api, RetryPolicy::new(2).with_retry_delay(Duration::from_millis(1)))
    }

    fn id(s: &str) -> FileId {
        FileId::new(s).unwrap()
    }

    #[test]
    fn test_drive_file_helpers() {
        let folder: DriveFile = serde_json::from_value(serde_json::json!({
            "id": "1",
            "name": "Photos",
            "mimeType": FOLDER_MIME_TYPE,
            "parents": ["root"]
        }))
        .unwrap();
        assert!(folder.is_folder());
        assert!(!folder.is_image());
        assert_eq!(folder.parent(), Some("root"));
        assert_eq!(folder.size_bytes(), None);

        let image: DriveFile = serde_json::from_value(serde_json::json!({
            "id": "2",
            "name": "me.jpg",
            "mimeType": "image/jpeg",
            "size": "12345",
            "modifiedTime": "2024-05-01T10:00:00.000Z",
            "iconLink": "https://example.com/icon.png"
        }))
        .unwrap();
        assert!(image.is_image());
        assert_eq!(image.size_bytes(), Some(12345));
        assert!(image.modified_time.is_some());
        assert_eq!(image.extra["iconLink"], "https://example.com/icon.png");
    }

    #[test]
    fn test_lenient_timestamp_epoch_millis() {
        let file: DriveFile = serde_json::from_value(serde_json::json!({
            "id": "3",
            "modifiedTime": 1714557600000i64
        }))
        .unwrap();
        assert_eq!(file.modified_time.unwrap().timestamp(), 1714557600);

        let odd: DriveFile =
            serde_json::from_value(serde_json::json!({"id": "4", "modifiedTime": true})).unwrap();
        assert!(odd.modified_time.is_none());
    }

    #[test]
    fn test_mime_for_name() {
        assert_eq!(mime_for_name("A.JPG"), "image/jpeg");
        assert_eq!(mime_for_name("b.png"), "image/png");
        assert_eq!(mime_for_name("noext"), "application/octet-stream");
    }

    #[test]
    fn test_file_content_decode() {
        let content = FileContent {
            content: STANDARD.encode(b"hello"),
            extra: Map::new(),
        };
        assert_eq!(content.decode().unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_get_status_passes_body_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/drive/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "connected": true,
                "message": "Connected"
            })))
            .mount(&server)
            .await;

        let status = client(&server).get_status().await;
        assert!(status.connected);
        assert!(!status.login_required);
    }

    #[tokio::test]
    async fn test_get_status_unauthorized_stand_in() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/drive/status"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let status = client(&server).get_status().await;
        assert!(!status.connected);
        assert!(status.login_required);
        assert!(status.message.unwrap().starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_list_files_query_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/drive/files"))
            .and(query_param("folderId", "folder-1"))
            .and(query_param("imagesOnly", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "files": [
                    {"id": "a", "name": "a.png", "mimeType": "image/png"},
                    {"id": "b", "name": "Sub", "mimeType": FOLDER_MIME_TYPE}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let listing = client(&server)
            .list_files(Some(&id("folder-1")), true)
            .await
            .unwrap();
        assert_eq!(listing.files.len(), 2);
        assert!(listing.files[1].is_folder());
    }

    #[tokio::test]
    async fn test_list_files_unauthorized_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/drive/files"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string("User must authenticate with Google Drive first"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).list_files(None, false).await.unwrap_err();
        assert!(err.requires_login());
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_files_server_error_is_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/drive/files"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": "Failed to list files: boom"
            })))
            .mount(&server)
            .await;

        match client(&server).list_files(None, false).await {
            Err(Error::Api { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("boom"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_file_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/drive/upload"))
            .and(body_string_contains("name=\"file\"; filename=\"photo.png\""))
            .and(body_string_contains("name=\"folderId\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "fileId": "new-id",
                "fileName": "photo.png",
                "webViewLink": "https://drive.google.com/file/d/new-id/view"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = UploadFile::new("photo.png", b"\x89PNG".to_vec(), "image/png");
        let receipt = client(&server)
            .upload_file(file, Some(&id("folder-1")))
            .await
            .unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.file_id.as_deref(), Some("new-id"));
    }

    #[tokio::test]
    async fn test_update_file_in_place() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/drive/files/abc"))
            .and(body_string_contains("name=\"newName\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "abc",
                "name": "renamed.jpg",
                "mimeType": "image/jpeg"
            })))
            .mount(&server)
            .await;

        let file = UploadFile::new("x.jpg", b"jpeg".to_vec(), "image/jpeg");
        let outcome = client(&server)
            .update_file(&id("abc"), file, Some("renamed.jpg"))
            .await
            .unwrap();
        assert!(!outcome.created_new_file);
        assert_eq!(outcome.file.name, "renamed.jpg");
    }

    #[tokio::test]
    async fn test_update_file_fallback_to_new_file() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/drive/files/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "isNewFile": true,
                "message": "Original file not writable",
                "file": {"id": "def", "name": "x.jpg", "mimeType": "image/jpeg"}
            })))
            .mount(&server)
            .await;

        let file = UploadFile::new("x.jpg", b"jpeg".to_vec(), "image/jpeg");
        let outcome = client(&server).update_file(&id("abc"), file, None).await.unwrap();
        assert!(outcome.created_new_file);
        assert_eq!(outcome.file.id, "def");
        assert_eq!(outcome.message.as_deref(), Some("Original file not writable"));
    }

    #[tokio::test]
    async fn test_create_folder_query_params() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/drive/folders"))
            .and(query_param("folderName", "ID Photos"))
            .and(query_param("parentFolderId", "root-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "f2",
                "name": "ID Photos",
                "mimeType": FOLDER_MIME_TYPE
            })))
            .expect(1)
            .mount(&server)
            .await;

        let folder = client(&server)
            .create_folder("ID Photos", Some(&id("root-1")))
            .await
            .unwrap();
        assert!(folder.is_folder());
    }

    #[tokio::test]
    async fn test_create_folder_rejects_empty_name() {
        let server = MockServer::start().await;
        let err = client(&server).create_folder("  ", None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_file_content_and_thumbnail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/drive/files/abc/content"))
            .and(query_param("thumbnail", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": STANDARD.encode(b"thumb")
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/drive/files/abc/content"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": STANDARD.encode(b"full")
            })))
            .mount(&server)
            .await;

        let drive = client(&server);
        let thumb = drive.get_thumbnail(&id("abc")).await.unwrap();
        assert_eq!(thumb.decode().unwrap(), b"thumb");
        let full = drive.get_file_content(&id("abc")).await.unwrap();
        assert_eq!(full.decode().unwrap(), b"full");
    }

    #[tokio::test]
    async fn test_get_file_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/drive/files/abc/details"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "abc",
                "name": "me.png",
                "mimeType": "image/png",
                "webContentLink": "https://drive.google.com/uc?export=view&id=abc"
            })))
            .mount(&server)
            .await;

        let details = client(&server).get_file_details(&id("abc")).await.unwrap();
        assert!(details.web_content_link.unwrap().ends_with("id=abc"));
    }

    #[tokio::test]
    async fn test_connection_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/drive/test-connection"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server).test_connection().await.unwrap();
        assert!(!result.connection_successful);
        assert!(result.login_required);
    }

    #[tokio::test]
    async fn test_logout_error_is_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/drive/logout"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(client(&server).logout().await.is_err());
    }
}
