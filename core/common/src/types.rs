//! Common types used throughout Photogate.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters escaped when a value is placed in a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Opaque identifier of a Drive resource (file or folder).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Create a new FileId from a string.
    ///
    /// # Errors
    /// - Returns error if id is empty or only whitespace
    pub fn new(id: impl Into<String>) -> crate::Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(crate::Error::InvalidInput(
                "FileId cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A backend endpoint path, relative to the `/api` prefix.
///
/// Static components are taken as-is; dynamic components added with
/// [`ApiPath::segment`] are percent-encoded so an identifier can never
/// escape its segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiPath {
    components: Vec<String>,
}

impl ApiPath {
    /// Parse a static path such as `"drive/files"`.
    pub fn parse(path: &str) -> Self {
        let components = path
            .split('/')
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect();
        Self { components }
    }

    /// Append a dynamic segment, percent-encoding it.
    pub fn segment(mut self, value: &str) -> Self {
        self.components
            .push(utf8_percent_encode(value, SEGMENT).to_string());
        self
    }

    /// Append a static component.
    pub fn join(mut self, child: &str) -> Self {
        self.components.extend(
            child
                .split('/')
                .filter(|c| !c.is_empty())
                .map(String::from),
        );
        self
    }

    /// Get the path components.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Full request path including the `/api` prefix.
    pub fn to_request_path(&self) -> String {
        if self.components.is_empty() {
            "/api".to_string()
        } else {
            format!("/api/{}", self.components.join("/"))
        }
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_request_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_file_id_creation() {
        let id = FileId::new("1AbC_xyz").unwrap();
        assert_eq!(id.as_str(), "1AbC_xyz");
    }

    #[test]
    fn test_file_id_empty_fails() {
        assert!(FileId::new("").is_err());
        assert!(FileId::new("   ").is_err());
    }

    #[test]
    fn test_api_path_parse() {
        let path = ApiPath::parse("/drive/files/");
        assert_eq!(path.components(), &["drive", "files"]);
        assert_eq!(path.to_request_path(), "/api/drive/files");
    }

    #[test]
    fn test_api_path_segment_encoding() {
        let path = ApiPath::parse("drive/files")
            .segment("a/b c")
            .join("content");
        assert_eq!(path.to_request_path(), "/api/drive/files/a%2Fb%20c/content");
    }

    #[test]
    fn test_api_path_empty() {
        assert_eq!(ApiPath::parse("").to_request_path(), "/api");
    }

    proptest! {
        #[test]
        fn segment_never_adds_separator(value in "\\PC{1,32}") {
            let path = ApiPath::parse("drive/files").segment(&value);
            prop_assert_eq!(path.components().len(), 3);
            prop_assert!(!path.components()[2].contains('/'));
        }
    }
}
