//! Advisory lock serializing mutating operations on an installation root.

use crate::layout::Layout;
use fs4::FileExt;
use phpvm_core::{Error, Result};
use std::fs::{self, File, OpenOptions};
use tracing::debug;

/// Exclusive lock on `<root>/.lock`, released on drop.
#[derive(Debug)]
pub struct InstallLock {
    file: File,
}

impl InstallLock {
    /// Block until the lock for `layout` is held.
    ///
    /// Creates the root directory if needed.
    pub fn acquire(layout: &Layout) -> Result<Self> {
        fs::create_dir_all(layout.root())
            .map_err(|e| Error::io("Failed to create installation root", layout.root(), e))?;

        let path = layout.lock_file();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| Error::io("Failed to open lock file", &path, e))?;

        debug!("Waiting for lock {}", path.display());
        file.lock_exclusive()
            .map_err(|e| Error::io("Failed to lock installation root", &path, e))?;
        debug!("Acquired lock {}", path.display());

        Ok(Self { file })
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
