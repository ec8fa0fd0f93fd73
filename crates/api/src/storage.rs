//! Object storage for uploaded media.
//!
//! [`SupabaseStore`] talks to a Supabase Storage bucket over HTTP.
//! [`LocalStore`] writes under a directory that the router serves at
//! [`LOCAL_PUBLIC_PREFIX`]; it is what development and tests run against.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

/// URL prefix under which [`LocalStore`] files are served.
pub const LOCAL_PUBLIC_PREFIX: &str = "/uploads";

/// Upload timeout. Photos from phones can be several megabytes.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Storage returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage path '{0}'")]
    InvalidPath(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// How a stored object is served from its public URL.
#[derive(Debug, Clone, Copy)]
pub struct ObjectMeta<'a> {
    pub content_type: &'a str,
    /// `Cache-Control` for the public URL; the backend's default when `None`.
    pub cache_control: Option<&'a str>,
}

impl<'a> ObjectMeta<'a> {
    pub fn new(content_type: &'a str) -> Self {
        Self {
            content_type,
            cache_control: None,
        }
    }

    pub fn cache_control(mut self, value: &'a str) -> Self {
        self.cache_control = Some(value);
        self
    }
}

/// A place uploaded bytes live, addressed by a bucket-relative path.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `bytes` at `path`, overwriting any existing object.
    /// Returns the public URL of the stored object.
    async fn put(
        &self,
        path: &str,
        meta: ObjectMeta<'_>,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError>;

    /// Remove the object at `path`. Missing objects are not an error.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    fn public_url(&self, path: &str) -> String;
}

/// Reject absolute paths and `..` segments.
fn check_relative(path: &str) -> Result<(), StorageError> {
    let ok = !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidPath(path.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Supabase
// ---------------------------------------------------------------------------

pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    service_role_key: String,
    bucket: String,
}

impl SupabaseStore {
    pub fn new(base_url: &str, service_role_key: &str, bucket: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_role_key: service_role_key.to_string(),
            bucket: bucket.to_string(),
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{path}", self.base_url, self.bucket)
    }

    fn upload_request(
        &self,
        path: &str,
        meta: ObjectMeta<'_>,
        bytes: Vec<u8>,
    ) -> reqwest::RequestBuilder {
        let request = self
            .client
            .put(self.object_url(path))
            .bearer_auth(&self.service_role_key)
            .header("apikey", &self.service_role_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, meta.content_type);
        match meta.cache_control {
            Some(value) => request.header(reqwest::header::CACHE_CONTROL, value),
            None => request,
        }
        .body(bytes)
    }
}

#[async_trait]
impl MediaStore for SupabaseStore {
    async fn put(
        &self,
        path: &str,
        meta: ObjectMeta<'_>,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        check_relative(path)?;
        let size = bytes.len();
        let response = self.upload_request(path, meta, bytes).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::error!(path, status, "Supabase upload rejected");
            return Err(StorageError::HttpStatus(status));
        }

        tracing::debug!(path, size, bucket = %self.bucket, "Uploaded object");
        Ok(self.public_url(path))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        check_relative(path)?;
        let response = self
            .client
            .delete(self.object_url(path))
            .bearer_auth(&self.service_role_key)
            .header("apikey", &self.service_role_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(StorageError::HttpStatus(status.as_u16()))
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{path}",
            self.base_url, self.bucket
        )
    }
}

// ---------------------------------------------------------------------------
// Local filesystem
// ---------------------------------------------------------------------------

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn file_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        check_relative(path)?;
        Ok(self.root.join(path))
    }
}

/// Headers for served files come from `ServeDir`, so [`ObjectMeta`] is not
/// persisted.
#[async_trait]
impl MediaStore for LocalStore {
    async fn put(
        &self,
        path: &str,
        _meta: ObjectMeta<'_>,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let file = self.file_path(path)?;
        if let Some(dir) = file.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&file, bytes).await?;
        Ok(self.public_url(path))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let file = self.file_path(path)?;
        match tokio::fs::remove_file(&file).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{LOCAL_PUBLIC_PREFIX}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn supabase_urls() {
        let store = SupabaseStore::new("https://abc.supabase.co/", "key", "housephotos");
        assert_eq!(
            store.object_url("spaces/2026/10/a.jpg"),
            "https://abc.supabase.co/storage/v1/object/housephotos/spaces/2026/10/a.jpg"
        );
        assert_eq!(
            store.public_url("spaces/2026/10/a.jpg"),
            "https://abc.supabase.co/storage/v1/object/public/housephotos/spaces/2026/10/a.jpg"
        );
    }

    #[test]
    fn supabase_upload_headers() {
        let store = SupabaseStore::new("https://abc.supabase.co", "key", "housephotos");
        let meta = ObjectMeta::new("image/jpeg").cache_control("max-age=30");
        let request = store
            .upload_request("cameras/blink-latest.jpg", meta, vec![0xFF])
            .build()
            .unwrap();

        let headers = request.headers();
        assert_eq!(headers["x-upsert"], "true");
        assert_eq!(headers["content-type"], "image/jpeg");
        assert_eq!(headers["cache-control"], "max-age=30");
        assert_eq!(headers["authorization"], "Bearer key");

        let plain = store
            .upload_request("spaces/a.jpg", ObjectMeta::new("image/jpeg"), vec![0xFF])
            .build()
            .unwrap();
        assert!(plain.headers().get("cache-control").is_none());
    }

    #[test]
    fn traversal_rejected() {
        assert_matches!(check_relative("../etc/passwd"), Err(StorageError::InvalidPath(_)));
        assert_matches!(check_relative("/abs/path.jpg"), Err(StorageError::InvalidPath(_)));
        assert_matches!(check_relative(""), Err(StorageError::InvalidPath(_)));
        assert!(check_relative("spaces/a.jpg").is_ok());
    }

    #[tokio::test]
    async fn local_store_put_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let url = store
            .put("spaces/2026/10/porch.png", ObjectMeta::new("image/png"), vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(url, "/uploads/spaces/2026/10/porch.png");

        let on_disk = dir.path().join("spaces/2026/10/porch.png");
        assert_eq!(std::fs::read(&on_disk).unwrap(), vec![1, 2, 3]);

        store.delete("spaces/2026/10/porch.png").await.unwrap();
        assert!(!on_disk.exists());

        // Deleting again is fine.
        store.delete("spaces/2026/10/porch.png").await.unwrap();
    }
}
