//! In-process blob store, used for dry runs and tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{FareError, Result};
use crate::store::{validate_key, BlobStore};

#[derive(Default)]
struct Inner {
    objects: HashMap<String, StoredBlob>,
    public: HashSet<String>,
    failing_keys: HashSet<String>,
}

/// A stored object and the content type it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Blob store backed by a shared in-memory map.
///
/// Clones share the same contents, so a caller can keep a handle to inspect
/// what a [`Fareboard`](crate::Fareboard) wrote.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned map is still a consistent map.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed an object without going through [`BlobStore::write`].
    pub fn insert(&self, key: &str, data: impl Into<Vec<u8>>) {
        self.lock().objects.insert(
            key.to_string(),
            StoredBlob {
                data: data.into(),
                content_type: "application/octet-stream".to_string(),
            },
        );
    }

    /// Make every subsequent write to `key` fail.
    pub fn fail_writes_to(&self, key: &str) {
        self.lock().failing_keys.insert(key.to_string());
    }

    pub fn get(&self, key: &str) -> Option<StoredBlob> {
        self.lock().objects.get(key).cloned()
    }

    /// Stored object decoded as UTF-8, lossily.
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|blob| String::from_utf8_lossy(&blob.data).into_owned())
    }

    pub fn is_public(&self, key: &str) -> bool {
        self.lock().public.contains(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().objects.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.lock().objects.get(key).map(|blob| blob.data.clone()))
    }

    fn write(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        validate_key(key)?;
        let mut inner = self.lock();
        if inner.failing_keys.contains(key) {
            return Err(FareError::persistence(key, "write rejected by store"));
        }
        inner.objects.insert(
            key.to_string(),
            StoredBlob {
                data: data.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn make_public(&self, key: &str) -> Result<()> {
        let mut inner = self.lock();
        if !inner.objects.contains_key(key) {
            return Err(FareError::NotFound(format!("blob '{}'", key)));
        }
        inner.public.insert(key.to_string());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("memory://{}", key)
    }

    fn describe(&self) -> String {
        "memory://".to_string()
    }
}
