use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Opaque blob storage for answer-sheet images. Callers only ever keep the returned URL.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store_image(&self, key: &str, bytes: Vec<u8>) -> Result<String>;
    async fn remove_image(&self, url: &str) -> Result<()>;
}

/// Writes images below a directory that is served at `public_base_url`.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if key.is_empty() || !is_plain {
            bail!("image key '{key}' must be a relative path without '..'");
        }

        Ok(self.root.join(relative))
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }

    fn key_for<'a>(&self, url: &'a str) -> Result<&'a str> {
        url.strip_prefix(&self.public_base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| anyhow!("image url '{url}' does not belong to this store"))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store_image(&self, key: &str, bytes: Vec<u8>) -> Result<String> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        // Never overwrite an existing sheet.
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .with_context(|| format!("failed to create image file {}", path.display()))?;
        file.write_all(&bytes)
            .await
            .with_context(|| format!("failed to write image file {}", path.display()))?;
        file.flush().await?;

        info!(key, size = bytes.len(), "answer sheet image stored");
        Ok(self.url_for(key))
    }

    async fn remove_image(&self, url: &str) -> Result<()> {
        let path = self.resolve(self.key_for(url)?)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to remove {}", path.display())),
        }
    }
}
