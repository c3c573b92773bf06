//! Storage for uploaded product images.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;

use super::config::ImageStorageConfig;

const UPLOAD_PREFIX: &str = "products";
const FALLBACK_EXTENSION: &str = "bin";

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("no file provided")]
    EmptyFile,
    #[error("network error: {0}")]
    Transport(String),
    #[error("storage rejected upload (http {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// An object store that makes stored bytes publicly reachable.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `bytes` under `key` and return its public URL.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str)
    -> Result<String, ImageStoreError>;
}

pub fn from_config(config: &ImageStorageConfig) -> Result<Arc<dyn ImageStore>, ImageStoreError> {
    Ok(match config {
        ImageStorageConfig::Supabase {
            base_url,
            service_key,
            bucket,
        } => Arc::new(SupabaseStorage::new(
            base_url.clone(),
            SecretString::from(service_key.expose_secret()),
            bucket.clone(),
        )?),
        ImageStorageConfig::LocalDisk {
            root,
            public_base_url,
        } => Arc::new(LocalDiskStorage::new(root.clone(), public_base_url.clone())),
    })
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct UploadedImage {
    pub url: String,
}

/// Store one product image under a fresh, collision-resistant key.
pub async fn upload_product_image(
    store: &dyn ImageStore,
    file_name: &str,
    content_type: &str,
    bytes: Bytes,
) -> Result<UploadedImage, ImageStoreError> {
    if bytes.is_empty() {
        return Err(ImageStoreError::EmptyFile);
    }
    let key = upload_key(file_name);
    let size = bytes.len();
    let url = store.put(&key, bytes, content_type).await?;
    info!(key = %key, size, "Product image uploaded");
    Ok(UploadedImage { url })
}

/// `products/<unix-millis>-<random>.<ext>`
fn upload_key(file_name: &str) -> String {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
    let nonce: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!(
        "{UPLOAD_PREFIX}/{}-{nonce}.{extension}",
        Utc::now().timestamp_millis()
    )
}

/// Supabase Storage bucket accessed over its REST API.
pub struct SupabaseStorage {
    http: Client,
    base_url: String,
    service_key: SecretString,
    bucket: String,
}

impl SupabaseStorage {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(
        base_url: String,
        service_key: SecretString,
        bucket: String,
    ) -> Result<Self, ImageStoreError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("storefront-catalog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ImageStoreError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            service_key,
            bucket,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{key}", self.base_url, self.bucket)
    }

    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{key}",
            self.base_url, self.bucket
        )
    }
}

#[async_trait]
impl ImageStore for SupabaseStorage {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, ImageStoreError> {
        let key_header = self.service_key.expose_secret();
        let res = self
            .http
            .post(self.object_url(key))
            .bearer_auth(key_header)
            .header("apikey", key_header)
            .header("content-type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| ImageStoreError::Transport(e.to_string()))?;

        match res.status() {
            s if s.is_success() => Ok(self.public_url(key)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ImageStoreError::Rejected {
                status: res.status().as_u16(),
                body: "storage credentials were refused".to_string(),
            }),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                Err(ImageStoreError::Rejected { status, body })
            }
        }
    }
}

/// Images written to a local directory that the HTTP server exposes at `/uploads`.
pub struct LocalDiskStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalDiskStorage {
    pub const MOUNT_PATH: &'static str = "/uploads";

    pub fn new(root: PathBuf, public_base_url: String) -> Self {
        Self {
            root,
            public_base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ImageStore for LocalDiskStorage {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<String, ImageStoreError> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        Ok(format!(
            "{}{}/{key}",
            self.public_base_url,
            Self::MOUNT_PATH
        ))
    }
}
