//! Filesystem listing store.
//!
//! Each listing lives in its own text file under the data directory
//! (`students.txt`, `tutors.txt`). A listing that was never saved loads as
//! empty text.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Result;

use tutoria_core::traits::{ListingKind, ListingStore};

use crate::error::StoreError;

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `kind`.
    pub fn path_for(&self, kind: ListingKind) -> PathBuf {
        self.dir.join(format!("{kind}.txt"))
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        if self.dir.exists() && !self.dir.is_dir() {
            return Err(StoreError::NotADirectory(self.dir.clone()));
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))
    }
}

impl ListingStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    fn save(&self, kind: ListingKind, listing: &str) -> Result<()> {
        self.ensure_dir()?;
        let path = self.path_for(kind);
        std::fs::write(&path, listing).map_err(|e| StoreError::io(&path, e))?;
        tracing::debug!(path = %path.display(), bytes = listing.len(), "listing saved");
        Ok(())
    }

    fn load(&self, kind: ListingKind) -> Result<String> {
        let path = self.path_for(kind);
        match std::fs::read_to_string(&path) {
            Ok(listing) => Ok(listing),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no saved listing");
                Ok(String::new())
            }
            Err(e) => Err(StoreError::io(&path, e).into()),
        }
    }

    /// Truncates the listing file. A missing file stays missing.
    fn clear(&self, kind: ListingKind) -> Result<()> {
        let path = self.path_for(kind);
        if !path.exists() {
            return Ok(());
        }
        std::fs::write(&path, "").map_err(|e| StoreError::io(&path, e))?;
        tracing::debug!(path = %path.display(), "listing cleared");
        Ok(())
    }
}
