//! Storage for auth-flow state that must survive the OAuth round trip.
//!
//! Two values are kept: the location to return to after sign-in, and a
//! flag marking that the user asked for a fresh login. Both are consumed
//! with read-then-delete semantics.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use url::Url;

use photogate_common::{Error, Result};

/// Persistence for the return-to location and the force-new-login flag.
pub trait RedirectStore: Send + Sync {
    /// Remember where to go after sign-in. Overwrites any previous value.
    fn save_return_to(&self, location: &Url) -> Result<()>;

    /// Remove and return the stored location.
    fn take_return_to(&self) -> Result<Option<Url>>;

    /// Set or clear the force-new-login flag.
    fn set_force_new_login(&self, force: bool) -> Result<()>;

    /// Remove and return the force-new-login flag.
    fn take_force_new_login(&self) -> Result<bool>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlowState {
    #[serde(default)]
    return_to: Option<String>,
    #[serde(default)]
    force_new_login: bool,
}

impl FlowState {
    /// An unparseable location is discarded along with the valid ones.
    fn take_return_to(&mut self) -> Option<Url> {
        let raw = self.return_to.take()?;
        match Url::parse(&raw) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Dropping stored redirect {:?}: {}", raw, e);
                None
            }
        }
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryRedirectStore {
    state: Mutex<FlowState>,
}

impl MemoryRedirectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FlowState) -> Result<T>) -> Result<T> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::InvalidInput("Redirect store lock poisoned".to_string()))?;
        f(&mut state)
    }
}

impl RedirectStore for MemoryRedirectStore {
    fn save_return_to(&self, location: &Url) -> Result<()> {
        self.with_state(|s| {
            s.return_to = Some(location.to_string());
            Ok(())
        })
    }

    fn take_return_to(&self) -> Result<Option<Url>> {
        self.with_state(|s| Ok(s.take_return_to()))
    }

    fn set_force_new_login(&self, force: bool) -> Result<()> {
        self.with_state(|s| {
            s.force_new_login = force;
            Ok(())
        })
    }

    fn take_force_new_login(&self) -> Result<bool> {
        self.with_state(|s| Ok(std::mem::take(&mut s.force_new_login)))
    }
}

/// JSON-file store, for flows that span process restarts (e.g. a CLI
/// that exits after opening the browser).
#[derive(Debug)]
pub struct FileRedirectStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileRedirectStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store under the per-user data directory.
    pub fn default_location() -> Result<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| Error::Config("No data directory available".to_string()))?;
        Ok(Self::new(dir.join("photogate").join("auth-flow.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<T>(&self, f: impl FnOnce(&mut FlowState) -> Result<T>) -> Result<T> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::InvalidInput("Redirect store lock poisoned".to_string()))?;

        let mut state = self.read()?;
        let before = state.clone();
        let result = f(&mut state)?;
        if state != before {
            self.write(&state)?;
        }
        Ok(result)
    }

    fn read(&self) -> Result<FlowState> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FlowState::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, state: &FlowState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(state)?)?;
        Ok(())
    }
}

impl RedirectStore for FileRedirectStore {
    fn save_return_to(&self, location: &Url) -> Result<()> {
        self.update(|s| {
            s.return_to = Some(location.to_string());
            Ok(())
        })
    }

    fn take_return_to(&self) -> Result<Option<Url>> {
        self.update(|s| Ok(s.take_return_to()))
    }

    fn set_force_new_login(&self, force: bool) -> Result<()> {
        self.update(|s| {
            s.force_new_login = force;
            Ok(())
        })
    }

    fn take_force_new_login(&self) -> Result<bool> {
        self.update(|s| Ok(std::mem::take(&mut s.force_new_login)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise(store: &dyn RedirectStore) {
        let location = Url::parse("http://localhost:5173/editingPage").unwrap();

        assert_eq!(store.take_return_to().unwrap(), None);
        store.save_return_to(&location).unwrap();
        assert_eq!(store.take_return_to().unwrap(), Some(location));
        assert_eq!(store.take_return_to().unwrap(), None);

        assert!(!store.take_force_new_login().unwrap());
        store.set_force_new_login(true).unwrap();
        assert!(store.take_force_new_login().unwrap());
        assert!(!store.take_force_new_login().unwrap());
    }

    #[test]
    fn test_memory_store_read_then_delete() {
        exercise(&MemoryRedirectStore::new());
    }

    #[test]
    fn test_file_store_read_then_delete() {
        let dir = TempDir::new().unwrap();
        exercise(&FileRedirectStore::new(dir.path().join("nested").join("flow.json")));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flow.json");
        let location = Url::parse("http://localhost:5173/drive").unwrap();

        FileRedirectStore::new(&path).save_return_to(&location).unwrap();
        let reopened = FileRedirectStore::new(&path);
        assert_eq!(reopened.take_return_to().unwrap(), Some(location));
    }

    #[test]
    fn test_file_store_drops_invalid_location() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flow.json");
        std::fs::write(&path, r#"{"returnTo":"not a url","forceNewLogin":true}"#).unwrap();

        let store = FileRedirectStore::new(&path);
        assert_eq!(store.take_return_to().unwrap(), None);

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(saved["returnTo"].is_null());
        assert!(store.take_force_new_login().unwrap());
        assert_eq!(store.take_return_to().unwrap(), None);
    }
}
