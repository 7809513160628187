//! Native file dialogs.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// A named set of accepted file extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFilter {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

impl FileFilter {
    /// Whether `path` has one of the accepted extensions (case-insensitive).
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|a| a.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

/// Filter used by both image channels.
pub const IMAGE_FILTER: FileFilter = FileFilter {
    name: "Images",
    extensions: &["jpg", "jpeg", "png"],
};

/// Asks the user to pick files. `None` / empty means the user canceled.
#[async_trait]
pub trait FileDialog: Send + Sync {
    /// Pick a destination, starting at `default_path`.
    async fn pick_save_path(&self, default_path: &Path, filter: &FileFilter) -> Option<PathBuf>;

    /// Pick files to open.
    async fn pick_open_paths(&self, filter: &FileFilter) -> Vec<PathBuf>;
}

/// Dialog answering with paths chosen up front, for headless use.
#[derive(Debug, Clone, Default)]
pub struct PresetDialog {
    save: Option<PathBuf>,
    open: Option<PathBuf>,
}

impl PresetDialog {
    /// A dialog where every prompt is canceled.
    pub fn canceled() -> Self {
        Self::default()
    }

    pub fn saving_to(path: impl Into<PathBuf>) -> Self {
        Self {
            save: Some(path.into()),
            open: None,
        }
    }

    pub fn opening(path: impl Into<PathBuf>) -> Self {
        Self {
            save: None,
            open: Some(path.into()),
        }
    }
}

#[async_trait]
impl FileDialog for PresetDialog {
    async fn pick_save_path(&self, default_path: &Path, _filter: &FileFilter) -> Option<PathBuf> {
        // A bare directory answer keeps the suggested file name.
        self.save.as_ref().map(|p| {
            if p.is_dir() {
                match default_path.file_name() {
                    Some(name) => p.join(name),
                    None => p.clone(),
                }
            } else {
                p.clone()
            }
        })
    }

    async fn pick_open_paths(&self, _filter: &FileFilter) -> Vec<PathBuf> {
        self.open.iter().cloned().collect()
    }
}
