//! Configuration service implementation.
//!
//! Loads the Loopdeck configuration from the user config directory
//! (`~/.config/loopdeck/config.toml`) and caches it. A missing file or
//! missing config directory yields the defaults; a file that exists but
//! does not parse is an error, never silently ignored.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use loopdeck_core::config::LoopdeckConfig;
use loopdeck_core::error::{LoopdeckError, Result};

const CONFIG_DIR: &str = "loopdeck";
const CONFIG_FILE: &str = "config.toml";

/// Configuration service that loads and caches the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigService {
    /// Cached configuration loaded from file.
    /// Uses RwLock for thread-safe lazy loading.
    config: Arc<RwLock<Option<LoopdeckConfig>>>,
    /// Override for the config file location (tests, portable installs).
    path_override: Option<PathBuf>,
}

impl ConfigService {
    /// Creates a service reading from the default location.
    ///
    /// The configuration is loaded lazily on first access to avoid
    /// blocking during initialization.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service reading from an explicit file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config: Arc::new(RwLock::new(None)),
            path_override: Some(path.into()),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// Load errors are logged and replaced with the defaults so an
    /// unreadable config file cannot take the client down.
    pub fn get_config(&self) -> LoopdeckConfig {
        {
            let read_lock = self.config.read().unwrap();
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = match self.load_config() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("[ConfigService] falling back to defaults: {e}");
                LoopdeckConfig::default()
            }
        };

        {
            let mut write_lock = self.config.write().unwrap();
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap();
        *write_lock = None;
    }

    /// Loads the configuration from disk.
    ///
    /// # Errors
    ///
    /// `Io` if an existing file cannot be read, `Serialization` if it
    /// cannot be parsed. A missing file is not an error.
    pub fn load_config(&self) -> Result<LoopdeckConfig> {
        let Some(path) = self.config_path() else {
            return Ok(LoopdeckConfig::default());
        };
        if !path.exists() {
            return Ok(LoopdeckConfig::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            LoopdeckError::io(format!("Failed to read config file at {path:?}: {e}"))
        })?;
        if content.trim().is_empty() {
            return Ok(LoopdeckConfig::default());
        }

        let config: LoopdeckConfig = toml::from_str(&content)?;
        Ok(config)
    }

    fn config_path(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.path_override {
            return Some(path.clone());
        }
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_yields_defaults() {
        let service = ConfigService::with_path("/nonexistent/loopdeck/config.toml");
        assert_eq!(service.get_config(), LoopdeckConfig::default());
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_open_tabs = 5").unwrap();
        file.flush().unwrap();

        let service = ConfigService::with_path(file.path());
        let config = service.get_config();

        assert_eq!(config.max_open_tabs, 5);
        assert_eq!(config.switch_debounce_ms, 200);
    }

    #[test]
    fn test_invalid_file_is_a_serialization_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_open_tabs = \"lots\"").unwrap();
        file.flush().unwrap();

        let service = ConfigService::with_path(file.path());
        let err = service.load_config().unwrap_err();
        assert!(matches!(err, LoopdeckError::Serialization { .. }));

        // get_config degrades to defaults instead of failing.
        assert_eq!(service.get_config(), LoopdeckConfig::default());
    }

    #[test]
    fn test_cache_and_invalidate() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_open_tabs = 5").unwrap();
        file.flush().unwrap();

        let service = ConfigService::with_path(file.path());
        assert_eq!(service.get_config().max_open_tabs, 5);

        writeln!(file, "switch_debounce_ms = 50").unwrap();
        file.flush().unwrap();

        // Cached until invalidated.
        assert_eq!(service.get_config().switch_debounce_ms, 200);
        service.invalidate_cache();
        assert_eq!(service.get_config().switch_debounce_ms, 50);
    }
}
