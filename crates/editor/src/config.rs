// Chunk: docs/chunks/editor_config - Config and recent-documents persistence
//!
//! Editor configuration.
//!
//! The config file is optional. It lives at:
//! - macOS: `~/Library/Application Support/shadow-edit/config.json`
//! - Linux: `$XDG_CONFIG_HOME/shadow-edit/config.json`
//!
//! Every field has a default, so a partial file only overrides what it names.
//! A missing, unreadable or unparsable file falls back to defaults (logged at
//! `warn`) rather than preventing startup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::file_change_debouncer::DEFAULT_DEBOUNCE_MS;

/// Application name used for config and data directories.
pub const APP_DIR_NAME: &str = "shadow-edit";

/// Config file name.
const CONFIG_FILENAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Shown after the document name in every window title.
    pub app_name: String,
    /// Appended to the title while the document has unsaved edits.
    pub dirty_marker: String,
    /// Title label for windows with no file binding.
    pub untitled_label: String,
    /// Quiet period before a burst of filesystem events is reported.
    pub debounce_ms: u64,
    /// Number of recently opened documents remembered.
    pub recent_documents_limit: usize,
    /// Starting directory for save pickers. Defaults to the user's documents folder.
    pub documents_dir: Option<PathBuf>,
    /// Stop the coordinator when the last window closes.
    pub quit_when_last_window_closed: bool,
    pub logging: LoggingConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            app_name: "Shadow Editor".to_string(),
            dirty_marker: "●".to_string(),
            untitled_label: "untitled".to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            recent_documents_limit: 10,
            documents_dir: None,
            quit_when_last_window_closed: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Directory save pickers start in.
    pub fn documents_dir(&self) -> Option<PathBuf> {
        self.documents_dir
            .clone()
            .or_else(dirs::document_dir)
            .or_else(dirs::home_dir)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// A simple level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    pub level: String,
    /// Emit logs as JSON lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Returns the path to the config file, if the platform has a config directory.
pub fn config_file_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join(APP_DIR_NAME).join(CONFIG_FILENAME))
}

/// Loads the config from an explicit path.
pub fn load_config_from(path: &Path) -> Result<EditorConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the config from the platform location, falling back to defaults.
pub fn load_config() -> EditorConfig {
    let Some(path) = config_file_path() else {
        return EditorConfig::default();
    };

    if !path.exists() {
        return EditorConfig::default();
    }

    match load_config_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "using default configuration");
            EditorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.app_name, "Shadow Editor");
        assert_eq!(config.dirty_marker, "●");
        assert_eq!(config.untitled_label, "untitled");
        assert_eq!(config.debounce_ms, 100);
        assert!(config.quit_when_last_window_closed);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_overrides_named_fields_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "app_name": "Notes", "logging": { "level": "debug" } }"#).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.app_name, "Notes");
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json);
        assert_eq!(config.dirty_marker, "●");
        assert_eq!(config.recent_documents_limit, 10);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_config_from(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_documents_dir_override_wins() {
        let config = EditorConfig {
            documents_dir: Some(PathBuf::from("/srv/docs")),
            ..Default::default()
        };
        assert_eq!(config.documents_dir(), Some(PathBuf::from("/srv/docs")));
    }
}
