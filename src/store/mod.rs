//! Durable blob storage for run state and published artifacts.
//!
//! The pipeline reads its prior state (snapshot, history, run counter) once at
//! the start of a run and writes the new state and the rendered report once at
//! the end. A missing object is a normal first-run condition and is reported
//! as `Ok(None)`, never as an error.

pub mod gcs;
pub mod local;
pub mod memory;

pub use gcs::GcsBlobStore;
pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use crate::error::{FareError, Result};

/// Key/value object store holding run state and published artifacts.
pub trait BlobStore: Send {
    /// Fetch an object, or `None` if it does not exist.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace an object. Implementations must not leave a partially
    /// written object behind on failure.
    fn write(&self, key: &str, data: &[u8], content_type: &str) -> Result<()>;

    /// Mark an object as publicly readable. No-op by default.
    fn make_public(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    /// URL under which a published object can be fetched by a viewer of the report.
    fn public_url(&self, key: &str) -> String;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Reject keys that are empty, absolute, or escape the store root.
pub fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(FareError::InvalidArgument("blob key must not be empty".into()));
    }
    if key.starts_with('/') || key.split('/').any(|seg| seg == "..") {
        return Err(FareError::InvalidArgument(format!(
            "blob key '{}' must be relative and normalized",
            key
        )));
    }
    Ok(())
}
