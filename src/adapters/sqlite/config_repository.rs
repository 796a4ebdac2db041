//! SQLite implementation of the key/value configuration table.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::OrchestratorResult;
use crate::domain::ports::ConfigRepository;

#[derive(Clone)]
pub struct SqliteConfigRepository {
    pool: SqlitePool,
}

impl SqliteConfigRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigRepository for SqliteConfigRepository {
    async fn get(&self, key: &str) -> OrchestratorResult<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT config_value FROM config WHERE config_key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(v,)| v))
    }

    async fn set(&self, key: &str, value: &str) -> OrchestratorResult<()> {
        sqlx::query(
            r#"INSERT INTO config (config_key, config_value)
               VALUES (?, ?)
               ON CONFLICT(config_key) DO UPDATE SET config_value = excluded.config_value"#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self) -> OrchestratorResult<Vec<(String, String)>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT config_key, config_value FROM config ORDER BY config_key")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteConfigRepository::new(pool);

        assert!(repo.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_overwrite() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteConfigRepository::new(pool);

        repo.set("translator.model", "gpt-4o").await.unwrap();
        repo.set("translator.model", "gpt-4o-mini").await.unwrap();

        assert_eq!(
            repo.get("translator.model").await.unwrap().as_deref(),
            Some("gpt-4o-mini")
        );
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
