use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the `module_registry` module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Registry root. Archives are stored below `<storage_dir>/modules`.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    /// Externally visible base URL. When unset, links are derived from the
    /// scheme and host of each request.
    #[serde(default)]
    pub public_url: Option<Url>,
    #[serde(default = "default_max_upload_size_mb")]
    pub max_upload_size_mb: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            public_url: None,
            max_upload_size_mb: default_max_upload_size_mb(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("public_url must be an absolute http(s) URL, got '{0}'")]
    InvalidPublicUrl(String),
    #[error("max_upload_size_mb must be greater than zero")]
    ZeroUploadLimit,
}

impl RegistryConfig {
    /// # Errors
    /// Returns an error if `public_url` is not an http(s) URL or the upload
    /// limit is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.public_url
            && (!matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base())
        {
            return Err(ConfigError::InvalidPublicUrl(url.to_string()));
        }
        if self.max_upload_size_mb == 0 {
            return Err(ConfigError::ZeroUploadLimit);
        }
        Ok(())
    }

    /// Upload limit in bytes, saturating on narrow targets.
    #[must_use]
    pub fn max_upload_size_bytes(&self) -> usize {
        usize::try_from(self.max_upload_size_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("store")
}

fn default_max_upload_size_mb() -> u64 {
    100
}
