//! Object storage for uploaded sources and generated documents.
//!
//! [`GcsStore`] talks to the Cloud Storage JSON API; [`FilesystemStore`]
//! keeps objects in a local directory for development and tests.

use crate::auth::TokenSource;
use crate::error::Pdf2DocxError;
use crate::pipeline::docx::DOCX_CONTENT_TYPE;
use async_trait::async_trait;
use reqwest::Url;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Storage backend keyed by slash-separated object paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `path`, replacing any existing object.
    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), Pdf2DocxError>;

    /// Fetch the object stored under `path`.
    async fn get(&self, path: &str) -> Result<Vec<u8>, Pdf2DocxError>;

    /// Address a client can use to retrieve `path`.
    fn public_url(&self, path: &str) -> String;
}

/// Content type inferred from the object name's extension.
pub fn content_type_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("docx") => DOCX_CONTENT_TYPE,
        _ => "application/octet-stream",
    }
}

// ── Cloud Storage ────────────────────────────────────────────────────────────

const GCS_API: &str = "https://storage.googleapis.com/storage/v1/b/";
const GCS_UPLOAD_API: &str = "https://storage.googleapis.com/upload/storage/v1/b/";

/// Cloud Storage bucket accessed through the JSON API.
#[derive(Debug, Clone)]
pub struct GcsStore {
    client: reqwest::Client,
    tokens: TokenSource,
    bucket: String,
    public_url_base: String,
}

impl GcsStore {
    pub fn new(
        client: reqwest::Client,
        tokens: TokenSource,
        bucket: impl Into<String>,
        public_url_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            tokens,
            bucket: bucket.into(),
            public_url_base: public_url_base.into(),
        }
    }

    fn upload_url(&self, path: &str) -> Result<Url, Pdf2DocxError> {
        let mut url = Url::parse(GCS_UPLOAD_API)
            .map_err(|e| Pdf2DocxError::Internal(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| Pdf2DocxError::Internal("upload URL cannot be a base".into()))?
            .pop_if_empty()
            .push(&self.bucket)
            .push("o");
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", path);
        Ok(url)
    }

    fn download_url(&self, path: &str) -> Result<Url, Pdf2DocxError> {
        let mut url = Url::parse(GCS_API).map_err(|e| Pdf2DocxError::Internal(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| Pdf2DocxError::Internal("download URL cannot be a base".into()))?
            .pop_if_empty()
            .push(&self.bucket)
            .push("o")
            .push(path);
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url)
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), Pdf2DocxError> {
        let url = self.upload_url(path)?;
        let token = self.tokens.access_token().await?;
        let size = bytes.len();

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type_for(path))
            .body(bytes)
            .send()
            .await
            .map_err(|e| Pdf2DocxError::storage("upload", path, e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Pdf2DocxError::storage(
                "upload",
                path,
                format!("HTTP {}: {}", status, detail.trim()),
            ));
        }

        info!("Uploaded gs://{}/{} ({} bytes)", self.bucket, path, size);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, Pdf2DocxError> {
        let url = self.download_url(path)?;
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Pdf2DocxError::storage("download", path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Pdf2DocxError::storage(
                "download",
                path,
                format!("HTTP {}", status),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Pdf2DocxError::storage("download", path, e))?;
        debug!("Downloaded gs://{}/{} ({} bytes)", self.bucket, path, bytes.len());
        Ok(bytes.to_vec())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.public_url_base, self.bucket, path)
    }
}

// ── Local filesystem ─────────────────────────────────────────────────────────

/// Objects stored as files below a base directory.
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    base_path: PathBuf,
}

impl FilesystemStore {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, Pdf2DocxError> {
        let base_path = base_path.into();
        tokio::fs::create_dir_all(&base_path)
            .await
            .map_err(|e| Pdf2DocxError::OutputWriteFailed {
                path: base_path.clone(),
                source: e,
            })?;
        Ok(Self { base_path })
    }

    /// Map an object path to a file below the base directory.
    ///
    /// Absolute paths and `..` components are rejected.
    fn file_path(&self, path: &str) -> Result<PathBuf, Pdf2DocxError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || path.is_empty() {
            return Err(Pdf2DocxError::storage(
                "resolve",
                path,
                "object path must be relative and stay inside the store",
            ));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FilesystemStore {
    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), Pdf2DocxError> {
        let dest = self.file_path(path)?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Pdf2DocxError::storage("upload", path, e))?;
        }
        tokio::fs::write(&dest, bytes)
            .await
            .map_err(|e| Pdf2DocxError::storage("upload", path, e))?;
        debug!("Stored {}", dest.display());
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, Pdf2DocxError> {
        let src = self.file_path(path)?;
        tokio::fs::read(&src)
            .await
            .map_err(|e| Pdf2DocxError::storage("download", path, e))
    }

    fn public_url(&self, path: &str) -> String {
        self.base_path.join(path).display().to_string()
    }
}
