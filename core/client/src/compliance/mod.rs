//! Image compliance checks.

pub mod client;
pub mod image;

pub use client::{ComplianceClient, ComplianceOptions, ComplianceResult};
pub use image::{base64_to_blob, is_base64, ImageBlob, ImageSource, DEFAULT_IMAGE_MIME};
