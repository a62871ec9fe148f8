//! Preference manager that merges config.toml defaults with DB overrides.
//!
//! Config values serve as defaults; DB values (user_preferences table) override them.
//! Writes always go to the DB, never to the config file.
use std::collections::HashMap;

use anyhow::Result;

use crate::board::summary::{is_valid_date_format, DEFAULT_DATE_FORMAT};
use crate::board::{GroupingMode, Priority};
use crate::config::Config;
use crate::storage::Database;
use crate::theme::ThemeVariant;

/// Preference key for the theme variant.
pub const THEME_KEY: &str = "theme";
/// Preference key for the task list grouping mode.
pub const GROUPING_KEY: &str = "view.grouping";
/// Preference key for the strftime pattern used to show dates.
pub const DATE_FORMAT_KEY: &str = "date_format";

// ============================================================================
// PreferenceManager
// ============================================================================

/// Merged preference store: config.toml defaults + DB overrides.
///
/// Reads are in-memory. Writes persist to the DB first and only then update
/// the in-memory map.
#[derive(Debug, Clone)]
pub struct PreferenceManager {
    prefs: HashMap<String, String>,
    /// `date_format` checked against a sample date when it was last stored.
    date_format: String,
}

impl PreferenceManager {
    /// Load preferences by merging config defaults with DB overrides.
    pub async fn load(config: &Config, db: &Database) -> Result<Self> {
        let mut prefs = Self::flatten_config(config);

        for (key, value) in db.all_preferences().await? {
            prefs.insert(key, value);
        }

        Ok(Self::from_map(prefs))
    }

    /// Create from config only (no DB). Fallback for when DB load fails.
    pub fn from_config(config: &Config) -> Self {
        Self::from_map(Self::flatten_config(config))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.prefs.get(key).map(String::as_str)
    }

    /// Set a preference: writes to DB and updates in-memory map.
    pub async fn set(&mut self, db: &Database, key: &str, value: &str) -> Result<()> {
        db.set_preference(key, value).await?;
        self.prefs.insert(key.to_string(), value.to_string());
        if key == DATE_FORMAT_KEY {
            self.date_format = Self::checked_date_format(&self.prefs);
        }
        Ok(())
    }

    // ========================================================================
    // Type-safe Accessors
    // ========================================================================
    //
    // A stored value that no longer parses (hand-edited DB, older build)
    // falls back to the built-in default rather than failing startup.

    pub fn theme_variant(&self) -> ThemeVariant {
        self.get(THEME_KEY)
            .and_then(ThemeVariant::from_str_name)
            .unwrap_or(ThemeVariant::Dark)
    }

    pub fn grouping_mode(&self) -> GroupingMode {
        self.get(GROUPING_KEY)
            .and_then(GroupingMode::from_str_name)
            .unwrap_or_default()
    }

    pub fn default_priority(&self) -> Priority {
        self.get("default_priority")
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    pub fn confirm_delete_category(&self) -> bool {
        self.get("confirm_delete_category")
            .and_then(|v| v.parse().ok())
            .unwrap_or(true)
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Keybinding overrides as `(action, key)` pairs.
    pub fn keybinding_overrides(&self) -> HashMap<String, String> {
        self.prefs
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix("keybind.")
                    .map(|action| (action.to_string(), v.clone()))
            })
            .collect()
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn from_map(prefs: HashMap<String, String>) -> Self {
        let date_format = Self::checked_date_format(&prefs);
        Self { prefs, date_format }
    }

    fn checked_date_format(prefs: &HashMap<String, String>) -> String {
        match prefs.get(DATE_FORMAT_KEY) {
            Some(f) if is_valid_date_format(f) => f.clone(),
            Some(f) => {
                tracing::warn!(format = %f, "Invalid date format, using default");
                DEFAULT_DATE_FORMAT.to_string()
            }
            None => DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Flatten Config struct into dotted key-value pairs.
    fn flatten_config(config: &Config) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert(THEME_KEY.to_string(), config.theme.clone());
        map.insert(GROUPING_KEY.to_string(), config.default_grouping.clone());
        map.insert(
            "default_priority".to_string(),
            config.default_priority.clone(),
        );
        map.insert(
            "confirm_delete_category".to_string(),
            config.confirm_delete_category.to_string(),
        );
        map.insert(DATE_FORMAT_KEY.to_string(), config.date_format.clone());

        for (action, key_str) in &config.keybindings {
            map.insert(format!("keybind.{}", action), key_str.clone());
        }

        map
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_load_defaults_from_config() {
        let db = test_db().await;
        let pm = PreferenceManager::load(&Config::default(), &db).await.unwrap();

        assert_eq!(pm.theme_variant(), ThemeVariant::Dark);
        assert_eq!(pm.grouping_mode(), GroupingMode::Category);
        assert_eq!(pm.default_priority(), Priority::Soon);
        assert!(pm.confirm_delete_category());
        assert_eq!(pm.date_format(), "%-m/%-d/%Y");
    }

    #[tokio::test]
    async fn test_db_overrides_config() {
        let db = test_db().await;
        db.set_preference(THEME_KEY, "light").await.unwrap();
        db.set_preference(GROUPING_KEY, "priority").await.unwrap();

        let pm = PreferenceManager::load(&Config::default(), &db).await.unwrap();
        assert_eq!(pm.theme_variant(), ThemeVariant::Light);
        assert_eq!(pm.grouping_mode(), GroupingMode::Priority);
    }

    #[tokio::test]
    async fn test_set_persists_across_reload() {
        let db = test_db().await;
        let config = Config::default();
        let mut pm = PreferenceManager::load(&config, &db).await.unwrap();

        pm.set(&db, GROUPING_KEY, "priority").await.unwrap();
        assert_eq!(pm.grouping_mode(), GroupingMode::Priority);
        drop(pm);

        let pm2 = PreferenceManager::load(&config, &db).await.unwrap();
        assert_eq!(pm2.grouping_mode(), GroupingMode::Priority);
        assert_eq!(
            db.get_preference(GROUPING_KEY).await.unwrap(),
            Some("priority".to_string())
        );
    }

    #[tokio::test]
    async fn test_unparseable_stored_values_fall_back() {
        let db = test_db().await;
        db.set_preference(THEME_KEY, "neon").await.unwrap();
        db.set_preference("default_priority", "urgent").await.unwrap();
        db.set_preference(DATE_FORMAT_KEY, "%H").await.unwrap();

        let pm = PreferenceManager::load(&Config::default(), &db).await.unwrap();
        assert_eq!(pm.theme_variant(), ThemeVariant::Dark);
        assert_eq!(pm.default_priority(), Priority::Soon);
        assert_eq!(pm.date_format(), DEFAULT_DATE_FORMAT);
    }

    #[tokio::test]
    async fn test_set_date_format_replaces_checked_value() {
        let db = test_db().await;
        let mut pm = PreferenceManager::load(&Config::default(), &db).await.unwrap();

        pm.set(&db, DATE_FORMAT_KEY, "%Y-%m-%d").await.unwrap();
        assert_eq!(pm.date_format(), "%Y-%m-%d");

        pm.set(&db, DATE_FORMAT_KEY, "%M:%S").await.unwrap();
        assert_eq!(pm.date_format(), DEFAULT_DATE_FORMAT);
        assert_eq!(pm.get(DATE_FORMAT_KEY), Some("%M:%S"));

        pm.set(&db, THEME_KEY, "light").await.unwrap();
        assert_eq!(pm.date_format(), DEFAULT_DATE_FORMAT);
    }

    #[test]
    fn test_keybinding_overrides_from_config() {
        let mut config = Config::default();
        config
            .keybindings
            .insert("quit".to_string(), "Ctrl+q".to_string());

        let pm = PreferenceManager::from_config(&config);
        assert_eq!(pm.get("keybind.quit"), Some("Ctrl+q"));
        let overrides = pm.keybinding_overrides();
        assert_eq!(overrides.get("quit").map(String::as_str), Some("Ctrl+q"));
        assert_eq!(overrides.len(), 1);
    }

    #[test]
    fn test_from_config_fallback() {
        let config = Config {
            theme: "light".to_string(),
            default_priority: "later".to_string(),
            confirm_delete_category: false,
            ..Config::default()
        };

        let pm = PreferenceManager::from_config(&config);
        assert_eq!(pm.theme_variant(), ThemeVariant::Light);
        assert_eq!(pm.default_priority(), Priority::Later);
        assert!(!pm.confirm_delete_category());
    }
}
