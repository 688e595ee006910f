//! # Media Store
//!
//! Read-only access to uploaded event photos, addressed by the relative paths
//! stored on event records.

use log::warn;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Read access to uploaded media, keyed by the relative paths the event
/// catalog stores.
pub trait MediaStore: Send + Sync {
    /// The blob at `path`, or `None` when there is nothing readable there.
    fn read(&self, path: &str) -> Option<Vec<u8>>;

    fn exists(&self, path: &str) -> bool;
}

/// Media stored as plain files under a root directory.
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsMediaStore { root: root.into() }
    }

    /// Joins `path` onto the root. Absolute paths and `..` are refused so a
    /// stored path can never point outside the media root.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || !contained {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl MediaStore for FsMediaStore {
    fn read(&self, path: &str) -> Option<Vec<u8>> {
        let full = self.resolve(path)?;
        match fs::read(&full) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Could not read media file {}: {}", full.display(), e);
                None
            }
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|full| full.is_file())
    }
}
