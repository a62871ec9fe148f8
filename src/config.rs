//! Configuration file parser for ~/.config/taskboard/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted but logged as warnings, since they are usually
//! typos.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::board::summary::{is_valid_date_format, DEFAULT_DATE_FORMAT};
use crate::board::{GroupingMode, Priority};
use crate::theme::ThemeVariant;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme variant name ("dark" or "light").
    pub theme: String,

    /// Priority preselected in the new-task form.
    pub default_priority: String,

    /// Initial grouping of the task lists ("category" or "priority").
    pub default_grouping: String,

    /// Ask before deleting a category and its tasks.
    pub confirm_delete_category: bool,

    /// chrono strftime pattern for dates in the summary and done list.
    pub date_format: String,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            default_priority: Priority::default().as_str().to_string(),
            default_grouping: GroupingMode::default().as_str().to_string(),
            confirm_delete_category: true,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "theme",
        "default_priority",
        "default_grouping",
        "confirm_delete_category",
        "date_format",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown enum value (theme, priority, grouping, date format) →
    ///   `Err(ConfigError::Invalid)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check size before reading so a huge file is never pulled into memory.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse TOML text into a validated config.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config.validate()?;
        tracing::info!(theme = %config.theme, grouping = %config.default_grouping, "Loaded configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if ThemeVariant::from_str_name(&self.theme).is_none() {
            return Err(ConfigError::Invalid {
                key: "theme",
                message: format!("'{}' (expected dark or light)", self.theme),
            });
        }
        if let Err(e) = self.default_priority.parse::<Priority>() {
            return Err(ConfigError::Invalid {
                key: "default_priority",
                message: e.to_string(),
            });
        }
        if GroupingMode::from_str_name(&self.default_grouping).is_none() {
            return Err(ConfigError::Invalid {
                key: "default_grouping",
                message: format!("'{}' (expected category or priority)", self.default_grouping),
            });
        }
        if !is_valid_date_format(&self.date_format) {
            return Err(ConfigError::Invalid {
                key: "date_format",
                message: format!("'{}' is not a date pattern", self.date_format),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, "dark");
        assert_eq!(config.default_priority, "soon");
        assert_eq!(config.default_grouping, "category");
        assert!(config.confirm_delete_category);
        assert_eq!(config.date_format, "%-m/%-d/%Y");
        assert!(config.keybindings.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/taskboard_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn test_whitespace_only_returns_default() {
        let config = Config::parse("   \n  \n  ").unwrap();
        assert_eq!(config.default_priority, "soon");
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let config = Config::parse("theme = \"light\"\n").unwrap();
        assert_eq!(config.theme, "light");
        assert_eq!(config.default_grouping, "category");
        assert!(config.confirm_delete_category);
    }

    #[test]
    fn test_full_config_from_file() {
        let dir = std::env::temp_dir().join("taskboard_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let content = r#"
theme = "light"
default_priority = "today"
default_grouping = "priority"
confirm_delete_category = false
date_format = "%Y-%m-%d"

[keybindings]
quit = "Ctrl+q"
add_task = "a"
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "light");
        assert_eq!(config.default_priority, "today");
        assert_eq!(config.default_grouping, "priority");
        assert!(!config.confirm_delete_category);
        assert_eq!(config.date_format, "%Y-%m-%d");
        assert_eq!(
            config.keybindings.get("add_task").map(String::as_str),
            Some("a")
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::parse("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config = Config::parse("theme = \"dark\"\nrefresh_interval = 5\n").unwrap();
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn test_wrong_type_returns_error() {
        assert!(Config::parse("confirm_delete_category = \"yes\"\n").is_err());
    }

    #[test]
    fn test_invalid_priority_rejected() {
        let err = Config::parse("default_priority = \"urgent\"\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "default_priority",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_theme_and_grouping_rejected() {
        assert!(Config::parse("theme = \"neon\"\n").is_err());
        assert!(Config::parse("default_grouping = \"color\"\n").is_err());
    }

    #[test]
    fn test_time_only_date_format_rejected() {
        let err = Config::parse("date_format = \"%H:%M\"\n").unwrap_err();
        assert!(err.to_string().contains("date_format"));
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("taskboard_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
