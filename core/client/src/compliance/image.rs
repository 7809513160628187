//! Image payloads and base64 conversion.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use tracing::{debug, warn};

/// MIME type assumed when none is known.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Base64 characters decoded per step. Multiple of 4, so every chunk but
/// the last is a whole number of quads.
const BASE64_CHUNK: usize = 512;

/// An in-memory image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl ImageBlob {
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard base64 of the bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:<mime>;base64,<payload>` form.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// Image input accepted by the compliance check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Already-decoded image; used as is.
    Blob(ImageBlob),
    /// A URL (`http...`, `blob:...`), a data URL, or bare base64.
    Text(String),
}

impl From<ImageBlob> for ImageSource {
    fn from(blob: ImageBlob) -> Self {
        ImageSource::Blob(blob)
    }
}

impl From<String> for ImageSource {
    fn from(text: String) -> Self {
        ImageSource::Text(text)
    }
}

impl From<&str> for ImageSource {
    fn from(text: &str) -> Self {
        ImageSource::Text(text.to_string())
    }
}

/// Split an optional `data:<mime>;base64,` prefix from the payload.
fn split_data_url(input: &str) -> (Option<&str>, &str) {
    match input.split_once(',') {
        Some((header, payload)) => {
            let mime = header
                .strip_prefix("data:")
                .and_then(|h| h.split(';').next())
                .filter(|m| !m.is_empty());
            (mime, payload)
        }
        None => (None, input),
    }
}

/// Decode base64 (optionally a data URL) into an image.
///
/// Decoding proceeds in fixed-size chunks appended to one buffer. Returns
/// `None` for empty or invalid input.
pub fn base64_to_blob(input: &str) -> Option<ImageBlob> {
    if input.is_empty() {
        warn!("No base64 image data provided");
        return None;
    }

    let (mime, payload) = split_data_url(input);
    let payload: String = if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        payload.chars().filter(|c| !c.is_ascii_whitespace()).collect()
    } else {
        payload.to_string()
    };
    if payload.is_empty() {
        warn!("Base64 image data has an empty payload");
        return None;
    }

    let mut bytes = Vec::with_capacity(payload.len() / 4 * 3);
    for chunk in payload.as_bytes().chunks(BASE64_CHUNK) {
        if let Err(e) = STANDARD.decode_vec(chunk, &mut bytes) {
            warn!("Error in base64 conversion: {}", e);
            return None;
        }
    }

    debug!("Decoded base64 image, {} bytes", bytes.len());
    Some(ImageBlob::new(
        bytes,
        mime.unwrap_or(DEFAULT_IMAGE_MIME).to_string(),
    ))
}

/// Whether `input` is canonical standard base64 (decoding and re-encoding
/// reproduces it). The empty string is not considered base64.
pub fn is_base64(input: &str) -> bool {
    if input.is_empty() {
        return false;
    }
    match STANDARD.decode(input) {
        Ok(bytes) => STANDARD.encode(bytes) == input,
        Err(_) => false,
    }
}
