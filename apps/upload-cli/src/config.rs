//! Uploader configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/searchhub/upload.toml`
//! - Windows: `%APPDATA%/searchhub/upload.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use searchhub_transfer::DEFAULT_CHUNK_SIZE;
use searchhub_uploader::{ResumeMode, UploadOptions};
use serde::{Deserialize, Serialize};

/// Uploader configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the file store.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Chunk size in bytes. Must match the server's constant.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,

    /// Chunks sent together per batch.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout in seconds (0 = wait indefinitely).
    #[serde(default)]
    pub request_timeout_secs: u64,

    /// What resuming a paused upload does.
    #[serde(default)]
    pub resume_mode: ResumeMode,

    /// Destination folder used when `--folder` is not given (empty = root).
    #[serde(default)]
    pub default_folder: String,
}

fn default_server_url() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_chunk_size() -> u64 {
    DEFAULT_CHUNK_SIZE
}

fn default_concurrency() -> usize {
    UploadOptions::default().concurrency
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            chunk_size: default_chunk_size(),
            concurrency: default_concurrency(),
            request_timeout_secs: 0,
            resume_mode: ResumeMode::default(),
            default_folder: String::new(),
        }
    }
}

impl Config {
    /// Loads configuration from disk, or creates a default if not found.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // Restrict permissions on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// `None` when no timeout is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Builds upload options; a `folder` given on the command line wins.
    pub fn upload_options(&self, folder: Option<String>, add_to_index: bool) -> UploadOptions {
        let folder = folder.unwrap_or_else(|| self.default_folder.clone());
        UploadOptions {
            folder: (!folder.is_empty()).then_some(folder),
            add_to_index,
            chunk_size: self.chunk_size,
            concurrency: self.concurrency,
            resume_mode: self.resume_mode,
        }
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("searchhub")
            .join("upload.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("searchhub").join("upload.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/searchhub/upload.toml"))
    }
}
