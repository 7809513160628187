//! Common utilities and types shared across Photogate crates.
//!
//! This crate provides the error type and the small identifier types used
//! by the client, shell and CLI crates.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ApiPath, FileId};
