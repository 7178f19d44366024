//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `LEXIDRAFT__SECTION__KEY`
//! 3. Config file: `--config`, else the platform config directory
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use lexidraft_adapters::GenerativeSettings;
use lexidraft_core::application::DocumentLimits;

const ENV_PREFIX: &str = "LEXIDRAFT";
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub documents: DocumentsConfig,
    /// Handed to the generative collaborators as-is.
    pub generative: GenerativeSettings,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Unset means the platform data directory.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    pub max_file_size_mb: u64,
    pub allowed_mime_types: Vec<String>,
    pub chunk_size: usize,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        let limits = DocumentLimits::default();
        Self {
            max_file_size_mb: limits.max_bytes / BYTES_PER_MB,
            allowed_mime_types: limits.allowed_mime_types,
            chunk_size: limits.chunk_size,
        }
    }
}

impl DocumentsConfig {
    pub fn limits(&self) -> DocumentLimits {
        DocumentLimits {
            max_bytes: self.max_file_size_mb.saturating_mul(BYTES_PER_MB),
            allowed_mime_types: self
                .allowed_mime_types
                .iter()
                .map(|m| m.trim().to_ascii_lowercase())
                .collect(),
            chunk_size: self.chunk_size.max(1),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write JSON lines to this file.
    pub file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from file and environment over the defaults.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let file = match config_file {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::from(Self::config_path())
                .format(FileFormat::Toml)
                .required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("documents.allowed_mime_types"),
            )
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `lexidraft.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "lexidraft", "lexidraft")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("lexidraft.toml"))
    }

    /// Data directory: the flag, then `storage.data_dir`, then the platform
    /// data directory, then `./.lexidraft`.
    pub fn data_dir(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.storage.data_dir.clone())
            .or_else(|| {
                directories::ProjectDirs::from("com", "lexidraft", "lexidraft")
                    .map(|d| d.data_dir().to_path_buf())
            })
            .unwrap_or_else(|| PathBuf::from(".lexidraft"))
    }
}
