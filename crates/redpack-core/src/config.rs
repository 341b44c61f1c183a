//! Application configuration management.
//!
//! Handles loading, saving and validating user settings: which folders to
//! import on start, where the built-in kit lives, page size, volume, export
//! target and key bindings. Settings are stored as JSON.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, FileSystemError, Result};
use crate::export::ExportTarget;
use crate::ingest::IngestOptions;
use crate::input::KeyBindings;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::playback::{MAX_VOLUME, MIN_VOLUME};

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default location of the built-in kit inside the sample bundle.
pub const DEFAULT_BUILTIN_KIT: &str = "Sounds/TestKit";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Folders imported on start, in order.
    pub library_roots: Vec<PathBuf>,
    /// Root of the bundled samples, used to resolve `builtin_kit`.
    pub bundle_root: Option<PathBuf>,
    /// Built-in kit path relative to `bundle_root`.
    pub builtin_kit: String,
    /// Samples per page.
    pub page_size: usize,
    /// Playback volume (0.0 - 1.0).
    pub volume: f32,
    /// Where exports go by default.
    pub export_target: ExportTarget,
    /// Skip files already in the library when importing.
    pub deduplicate_on_import: bool,
    /// Navigation keys.
    pub key_bindings: KeyBindings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            library_roots: Vec::new(),
            bundle_root: None,
            builtin_kit: DEFAULT_BUILTIN_KIT.to_string(),
            page_size: DEFAULT_PAGE_SIZE.get(),
            volume: MAX_VOLUME,
            export_target: ExportTarget::default(),
            deduplicate_on_import: false,
            key_bindings: KeyBindings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location, or defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `path`, or defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed, or
    /// fails validation.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            Error::FileSystem(FileSystemError::ReadFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to read config file: {e}"),
            })
        })?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {e}")))?;
        config.validate()?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                Error::FileSystem(FileSystemError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    reason: format!("Failed to create config directory: {e}"),
                })
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| {
            Error::FileSystem(FileSystemError::WriteFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to write config file: {e}"),
            })
        })?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Check value ranges and key bindings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Configuration(
                "page_size must be at least 1".to_string(),
            ));
        }
        if !(MIN_VOLUME..=MAX_VOLUME).contains(&self.volume) {
            return Err(Error::Configuration(format!(
                "volume must be between {MIN_VOLUME} and {MAX_VOLUME}, got {}",
                self.volume
            )));
        }
        if self.builtin_kit.trim().is_empty() {
            warn!("builtin_kit is empty; the kit import will scan the bundle root");
        }
        self.key_bindings.validate()
    }

    /// Page size as a non-zero value, falling back to the default.
    #[must_use]
    pub fn page_size(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.page_size).unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Ingestion options derived from this configuration.
    #[must_use]
    pub const fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            deduplicate: self.deduplicate_on_import,
        }
    }
}

/// Directory holding RedPack's configuration.
#[must_use]
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("redpack")
}

/// Full path of the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}
