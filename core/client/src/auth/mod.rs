//! Authentication against the backend's Google OAuth endpoints.
//!
//! - [`AuthClient`]: thin wrapper over `/api/auth/*`
//! - [`AuthFlow`]: sign-in redirect round trip and callback handling
//! - [`RedirectStore`] / [`Navigator`]: the flow's explicit state and side effects

pub mod client;
pub mod flow;
pub mod navigator;
pub mod store;

pub use client::{AuthClient, AuthStatus, AuthorizationUrl, OperationStatus};
pub use flow::{strip_callback_params, AuthFlow, RedirectOutcome};
pub use navigator::{BrowserNavigator, Navigator};
pub use store::{FileRedirectStore, MemoryRedirectStore, RedirectStore};
