//! Filesystem-backed blob store.
//!
//! Each key maps to a file under the store directory. Writes go to a temp
//! file in the same directory first and are renamed over the target on
//! success, so an interrupted write never leaves a truncated ledger behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::config;
use crate::error::{FareError, Result};
use crate::store::{validate_key, BlobStore};

/// Stores blobs as files in a local directory.
pub struct LocalBlobStore {
    /// Directory holding every stored object.
    pub root: PathBuf,
}

impl LocalBlobStore {
    /// Open a store rooted at `root`, or the platform default data directory.
    ///
    /// Creates the directory if it does not exist.
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let dir = root.unwrap_or_else(config::default_store_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self { root: dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

impl BlobStore for LocalBlobStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read(&path)?))
    }

    fn write(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        let path = self.path_for(key)?;
        debug!(key, content_type, bytes = data.len(), "writing blob");
        write_atomic(&path, data).map_err(|e| FareError::persistence(key, e))
    }

    fn public_url(&self, key: &str) -> String {
        // The report is written beside the other blobs, so a relative link resolves.
        key.to_string()
    }

    fn describe(&self) -> String {
        format!("file://{}", self.root.display())
    }
}

fn write_atomic(dest: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}
