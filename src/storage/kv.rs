use serde::{de::DeserializeOwned, Serialize};

use super::schema::Database;
use super::types::{LoadedBoard, StorageError};
use crate::board::{Category, Task};

/// Slot holding the JSON array of categories.
pub const CATEGORIES_SLOT: &str = "categories";
/// Slot holding the JSON array of tasks.
pub const TASKS_SLOT: &str = "tasks";

const UPSERT_SLOT: &str = r#"
    INSERT INTO kv_store (key, value, updated_at)
    VALUES (?, ?, datetime('now'))
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
"#;

fn encode<T: Serialize + ?Sized>(slot: &str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|source| StorageError::Encode {
        slot: slot.to_owned(),
        source,
    })
}

impl Database {
    // ========================================================================
    // Key-Value Slots
    // ========================================================================

    /// Read and decode a slot. An absent key is `None`.
    pub async fn load_slot<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, StorageError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from_sqlx)?;

        row.map(|(json,)| {
            serde_json::from_str(&json).map_err(|source| StorageError::Corrupt {
                slot: key.to_owned(),
                source,
            })
        })
        .transpose()
    }

    /// Encode and write a slot (UPSERT).
    pub async fn save_slot<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let json = encode(key, value)?;
        sqlx::query(UPSERT_SLOT)
            .bind(key)
            .bind(json)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from_sqlx)?;
        Ok(())
    }

    /// Write both board slots in one transaction.
    ///
    /// Either both slots reflect the new state or neither does, so a cascade
    /// delete never leaves tasks pointing at a category that is gone on disk.
    pub async fn save_board(
        &self,
        categories: &[Category],
        tasks: &[Task],
    ) -> Result<(), StorageError> {
        let categories_json = encode(CATEGORIES_SLOT, categories)?;
        let tasks_json = encode(TASKS_SLOT, tasks)?;

        let mut tx = self.pool.begin().await.map_err(StorageError::from_sqlx)?;
        sqlx::query(UPSERT_SLOT)
            .bind(CATEGORIES_SLOT)
            .bind(categories_json)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from_sqlx)?;
        sqlx::query(UPSERT_SLOT)
            .bind(TASKS_SLOT)
            .bind(tasks_json)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from_sqlx)?;
        tx.commit().await.map_err(StorageError::from_sqlx)?;

        tracing::debug!(
            categories = categories.len(),
            tasks = tasks.len(),
            "Board saved"
        );
        Ok(())
    }

    /// Load both board slots. Missing slots are empty lists.
    pub async fn load_board(&self) -> Result<LoadedBoard, StorageError> {
        let categories: Vec<Category> = self.load_slot(CATEGORIES_SLOT).await?.unwrap_or_default();
        let tasks: Vec<Task> = self.load_slot(TASKS_SLOT).await?.unwrap_or_default();
        tracing::info!(
            categories = categories.len(),
            tasks = tasks.len(),
            "Board loaded"
        );
        Ok(LoadedBoard { categories, tasks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Priority};
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_missing_slot_is_none() {
        let db = test_db().await;
        let value: Option<Vec<Task>> = db.load_slot(TASKS_SLOT).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_slot_upsert_overwrites() {
        let db = test_db().await;
        db.save_slot("numbers", &vec![1, 2, 3]).await.unwrap();
        db.save_slot("numbers", &vec![4]).await.unwrap();
        let value: Option<Vec<i32>> = db.load_slot("numbers").await.unwrap();
        assert_eq!(value, Some(vec![4]));
    }

    #[tokio::test]
    async fn test_corrupt_slot_reports_slot_name() {
        let db = test_db().await;
        sqlx::query("INSERT INTO kv_store (key, value) VALUES ('tasks', 'not json')")
            .execute(&db.pool)
            .await
            .unwrap();

        match db.load_board().await {
            Err(StorageError::Corrupt { slot, .. }) => assert_eq!(slot, "tasks"),
            other => panic!("expected Corrupt, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_board_round_trip() {
        let db = test_db().await;
        let mut board = Board::from_parts(Vec::new(), Vec::new(), StdRng::seed_from_u64(3));
        let work = board.add_category("Work").unwrap();
        let task = board.add_task("Ship report", &work.id, Priority::Today).unwrap();
        board.toggle_complete(&task.id);

        db.save_board(board.categories().as_slice(), board.tasks().as_slice())
            .await
            .unwrap();

        let loaded = db.load_board().await.unwrap();
        assert_eq!(loaded.categories, board.categories().as_slice());
        assert_eq!(loaded.tasks, board.tasks().as_slice());
    }

    #[tokio::test]
    async fn test_empty_database_loads_empty_board() {
        let db = test_db().await;
        let loaded = db.load_board().await.unwrap();
        assert!(loaded.categories.is_empty());
        assert!(loaded.tasks.is_empty());
    }
}
