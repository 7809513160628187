//! Native shell services for the Photogate desktop app.
//!
//! The UI talks to the shell over three channels: `save-image`,
//! `open-image` and `get-app-version`. Every reply is a [`ShellResponse`]
//! envelope; the handler never returns an error to the caller.

pub mod dialog;
pub mod handler;
pub mod rpc;

pub use dialog::{FileDialog, FileFilter, PresetDialog, IMAGE_FILTER};
pub use handler::{ShellHandler, USER_CANCELED};
pub use rpc::{ShellRequest, ShellResponse};
