use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

type Result<T> = anyhow::Result<T>;

pub const CONFIG_PATH_ENV: &str = "QUIZDESK_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "quizdesk.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Falls back to `DATABASE_URL` when unset.
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Acts as this profile on every request instead of reading the gateway header.
    #[serde(default)]
    pub dev_identity: Option<DevIdentity>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DevIdentity {
    pub user_id: Uuid,
    pub role: DevRole,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DevRole {
    Student,
    Doctor,
}

impl ServerConfig {
    /// Reads the file named by `QUIZDESK_CONFIG`, or `quizdesk.toml`. A missing file means
    /// defaults.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let path = Path::new(&path);

        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Self::from_str("");
        }

        Self::from_file(path)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).context("failed to deserialize server config")?;
        config.uploads_route()?;
        Ok(config)
    }

    /// Route prefix that serves stored images: the path part of `public_base_url`.
    pub fn uploads_route(&self) -> Result<String> {
        let url = self.public_base_url.as_str();
        let path = match url.split_once("://") {
            Some((_, rest)) => rest.find('/').map_or("", |start| &rest[start..]),
            None => url,
        };
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');

        if !path.starts_with('/') {
            bail!("public_base_url '{url}' must have a non-root path such as /uploads");
        }
        Ok(path.to_string())
    }

    pub fn database_url(&self) -> Result<String> {
        if let Some(url) = self.database_url.as_ref().filter(|url| !url.is_empty()) {
            return Ok(url.clone());
        }

        std::env::var("DATABASE_URL")
            .map_err(|_| anyhow!("database_url is not configured and DATABASE_URL is not set"))
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_public_base_url() -> String {
    "/uploads".to_string()
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}
