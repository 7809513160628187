//! Page navigation used by the auth flow.

use std::sync::Mutex;
use tracing::info;
use url::Url;

use photogate_common::{Error, Result};

/// Moves the user between locations during sign-in.
pub trait Navigator: Send + Sync {
    /// Full redirect to `url`. Control does not come back to the flow.
    fn redirect(&self, url: &Url) -> Result<()>;

    /// Replace the visible location without navigating.
    fn replace(&self, url: &Url) -> Result<()>;
}

/// Opens redirects in the system browser and tracks the visible location
/// locally.
#[derive(Debug, Default)]
pub struct BrowserNavigator {
    current: Mutex<Option<Url>>,
}

impl BrowserNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last location set through `replace`.
    pub fn current(&self) -> Option<Url> {
        self.current.lock().ok().and_then(|c| c.clone())
    }
}

impl Navigator for BrowserNavigator {
    fn redirect(&self, url: &Url) -> Result<()> {
        info!("Opening {} in browser", url);
        open::that(url.as_str()).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to open browser: {}", e),
            ))
        })
    }

    fn replace(&self, url: &Url) -> Result<()> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| Error::InvalidInput("Navigator lock poisoned".to_string()))?;
        *current = Some(url.clone());
        Ok(())
    }
}
