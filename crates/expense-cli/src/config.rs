//! Configuration for the expense CLI

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml
#[derive(Debug, Deserialize)]
pub struct FileConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub backup: BackupConfig,
}

/// Spreadsheet-backed expense API
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Web app URL; `?action=getData` is appended for reads
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct ConnectivityConfig {
    #[serde(default = "default_probe_url")]
    pub probe_url: String,
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Where charts, reports and long listings are written
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct BackupConfig {
    #[serde(default = "default_backup_dir")]
    pub dir: PathBuf,
    /// Period used by `backup --every-hours` when the flag has no value
    #[serde(default = "default_backup_interval")]
    pub interval_hours: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_url: default_probe_url(),
            timeout_secs: default_probe_timeout(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            dir: default_backup_dir(),
            interval_hours: default_backup_interval(),
        }
    }
}

fn default_backend_timeout() -> u64 {
    10
}

fn default_probe_url() -> String {
    "https://google.com".to_string()
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("backups")
}

fn default_backup_interval() -> u64 {
    24
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| {
            "Failed to parse config.toml. Check for:\n\
             - A missing [backend] section\n\
             - Invalid TOML syntax (missing quotes, brackets, etc.)\n\
             - Incorrect data types (strings vs numbers)\n\n\
             See config.toml.example for the expected format."
        })
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Resolved settings used by every command
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub backend_timeout: Duration,
    pub probe_url: String,
    pub probe_timeout: Duration,
    pub output_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub backup_interval_hours: u64,
}

impl Config {
    /// Create config from file config and optional backend URL override
    pub fn from_file(file_config: &FileConfig, backend_url: Option<String>) -> Result<Self> {
        let backend_url = backend_url
            .or_else(|| file_config.backend.url.clone())
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .context("No backend URL: set backend.url in config.toml or pass --backend-url")?;

        if !backend_url.starts_with("http://") && !backend_url.starts_with("https://") {
            bail!("Backend URL must start with http:// or https://, got {backend_url}");
        }
        if file_config.backend.timeout_secs == 0 {
            bail!("backend.timeout_secs must be greater than 0");
        }
        if file_config.backup.interval_hours == 0 {
            bail!("backup.interval_hours must be greater than 0");
        }

        Ok(Self {
            backend_url,
            backend_timeout: Duration::from_secs(file_config.backend.timeout_secs),
            probe_url: file_config.connectivity.probe_url.clone(),
            probe_timeout: Duration::from_secs(file_config.connectivity.timeout_secs),
            output_dir: file_config.output.dir.clone(),
            backup_dir: file_config.backup.dir.clone(),
            backup_interval_hours: file_config.backup.interval_hours,
        })
    }

    /// Like [`Config::from_file`]. A missing default `config.toml` falls back
    /// to built-in defaults so `--backend-url` alone is enough to run; any
    /// other missing path is an error.
    pub fn load(path: &Path, backend_url: Option<String>) -> Result<Self> {
        let file_config = if path.exists() {
            FileConfig::load(path)?
        } else if path == Path::new(DEFAULT_CONFIG_PATH) {
            warn!(path = %path.display(), "config file not found, using defaults");
            FileConfig::parse("[backend]")?
        } else {
            bail!("Config file not found: {}", path.display());
        };
        Self::from_file(&file_config, backend_url)
    }
}
