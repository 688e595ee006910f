//! # Report Artifacts
//!
//! Where finished report documents live once they have been composed.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Storage for generated report documents.
pub trait ReportStore: Send + Sync {
    /// Stores `bytes` at `path`. Returning `Ok` means the artifact is durable
    /// and readable; an existing file at `path` is never overwritten.
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Deletes an artifact that was stored but never registered.
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Writes artifacts to the local filesystem.
///
/// Bytes go to a temporary file in the destination directory first, are
/// synced, and are then moved into place, so a crash never leaves a truncated
/// document at the final path.
pub struct FsReportStore;

impl ReportStore for FsReportStore {
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist_noclobber(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}
