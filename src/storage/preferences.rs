use anyhow::Result;

use super::schema::Database;

const UPSERT_PREFERENCE: &str = "INSERT INTO user_preferences (key, value, updated_at) \
     VALUES (?, ?, datetime('now')) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

impl Database {
    // ========================================================================
    // User Preferences
    // ========================================================================

    /// Stored value for `key` (`theme`, `view.grouping`), if any.
    pub async fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM user_preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    pub async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(UPSERT_PREFERENCE)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        tracing::debug!(key, value, "Preference saved");
        Ok(())
    }

    /// Every stored preference, ordered by key.
    pub async fn all_preferences(&self) -> Result<Vec<(String, String)>> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM user_preferences ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
