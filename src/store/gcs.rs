//! Google Cloud Storage blob store over the JSON API.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use tracing::{debug, info};

use crate::config;
use crate::error::{FareError, Result};
use crate::store::{validate_key, BlobStore};

/// Stores blobs as objects in a GCS bucket, authenticating with an OAuth2
/// bearer token.
pub struct GcsBlobStore {
    bucket: String,
    token: String,
    base: String,
    client: Client,
}

impl GcsBlobStore {
    pub fn new(bucket: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            bucket: bucket.into(),
            token: token.into(),
            base: config::GCS_API_BASE.to_string(),
            client,
        })
    }

    /// Build from `GCS_ACCESS_TOKEN`.
    pub fn from_env(bucket: impl Into<String>, timeout: Duration) -> Result<Self> {
        let token = std::env::var("GCS_ACCESS_TOKEN").map_err(|_| {
            FareError::InvalidArgument("GCS_ACCESS_TOKEN is not set".to_string())
        })?;
        Self::new(bucket, token, timeout)
    }

    /// Point the store at a different API host (emulators, tests).
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base)
            .map_err(|e| FareError::InvalidArgument(format!("bad GCS base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| FareError::InvalidArgument("GCS base URL cannot hold a path".into()))?
            .extend(segments);
        Ok(url)
    }

    fn object_url(&self, key: &str) -> Result<Url> {
        self.url(&["storage", "v1", "b", self.bucket.as_str(), "o", key])
    }
}

impl BlobStore for GcsBlobStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        let mut url = self.object_url(key)?;
        url.query_pairs_mut().append_pair("alt", "media");
        let resp = self.client.get(url).bearer_auth(&self.token).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let bytes = resp.error_for_status()?.bytes()?;
        Ok(Some(bytes.to_vec()))
    }

    fn write(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        validate_key(key)?;
        let mut url = self.url(&["upload", "storage", "v1", "b", self.bucket.as_str(), "o"])?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);
        debug!(key, content_type, bytes = data.len(), "uploading object");
        self.client
            .post(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data.to_vec())
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| FareError::persistence(key, e))?;
        Ok(())
    }

    fn make_public(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let url = self.url(&["storage", "v1", "b", self.bucket.as_str(), "o", key, "acl"])?;
        self.client
            .post(url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "entity": "allUsers", "role": "READER" }))
            .send()?
            .error_for_status()?;
        info!(key, url = %self.public_url(key), "object made public");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", config::GCS_API_BASE, self.bucket, key)
    }

    fn describe(&self) -> String {
        format!("gs://{}", self.bucket)
    }
}
