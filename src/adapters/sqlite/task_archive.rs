//! SQLite implementation of the completed-task archive.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::{ArchivedTask, TaskStatus};
use crate::domain::ports::TaskArchive;

#[derive(Clone)]
pub struct SqliteTaskArchive {
    pool: SqlitePool,
}

impl SqliteTaskArchive {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskArchive for SqliteTaskArchive {
    async fn upsert(&self, task: &ArchivedTask) -> OrchestratorResult<()> {
        sqlx::query(
            r#"INSERT INTO completed_tasks (task_id, agent_id, input, script_code, status,
               submitted_at, approved_at, completed_at, output, error, interpretation)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(task_id) DO UPDATE SET
                   agent_id = excluded.agent_id,
                   input = excluded.input,
                   script_code = excluded.script_code,
                   status = excluded.status,
                   submitted_at = excluded.submitted_at,
                   approved_at = excluded.approved_at,
                   completed_at = excluded.completed_at,
                   output = excluded.output,
                   error = excluded.error,
                   interpretation = excluded.interpretation"#,
        )
        .bind(task.task_id.to_string())
        .bind(&task.agent_id)
        .bind(&task.input)
        .bind(&task.script_code)
        .bind(task.status.as_str())
        .bind(task.submitted_at.to_rfc3339())
        .bind(task.approved_at.map(|t| t.to_rfc3339()))
        .bind(task.completed_at.map(|t| t.to_rfc3339()))
        .bind(&task.output)
        .bind(&task.error)
        .bind(&task.interpretation)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, task_id: Uuid) -> OrchestratorResult<Option<ArchivedTask>> {
        let row: Option<ArchivedTaskRow> =
            sqlx::query_as("SELECT * FROM completed_tasks WHERE task_id = ?")
                .bind(task_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn list(&self) -> OrchestratorResult<Vec<ArchivedTask>> {
        let rows: Vec<ArchivedTaskRow> =
            sqlx::query_as("SELECT * FROM completed_tasks ORDER BY submitted_at")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn count(&self) -> OrchestratorResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM completed_tasks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[derive(sqlx::FromRow)]
struct ArchivedTaskRow {
    task_id: String,
    agent_id: String,
    input: String,
    script_code: String,
    status: String,
    submitted_at: String,
    approved_at: Option<String>,
    completed_at: Option<String>,
    output: String,
    error: String,
    interpretation: String,
}

impl TryFrom<ArchivedTaskRow> for ArchivedTask {
    type Error = OrchestratorError;

    fn try_from(row: ArchivedTaskRow) -> Result<Self, Self::Error> {
        let task_id = super::parse_uuid(&row.task_id)?;
        let status = TaskStatus::parse_str(&row.status).ok_or_else(|| {
            OrchestratorError::Serialization(format!("Invalid task status: {}", row.status))
        })?;
        let submitted_at = super::parse_datetime(&row.submitted_at)?;
        let approved_at = super::parse_optional_datetime(row.approved_at)?;
        let completed_at = super::parse_optional_datetime(row.completed_at)?;

        Ok(ArchivedTask {
            task_id,
            agent_id: row.agent_id,
            input: row.input,
            script_code: row.script_code,
            status,
            submitted_at,
            approved_at,
            completed_at,
            output: row.output,
            error: row.error,
            interpretation: row.interpretation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::{Task, TaskResult};

    async fn setup_test_archive() -> SqliteTaskArchive {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteTaskArchive::new(pool)
    }

    fn completed_task(agent_id: &str) -> ArchivedTask {
        let mut task = Task::new("list files", "ls -la", agent_id);
        task.transition_to(TaskStatus::Approved).unwrap();
        task.transition_to(TaskStatus::Completed).unwrap();
        let result = TaskResult::new(task.task_id, "file1\nfile2", "")
            .with_interpretation("two files present");
        ArchivedTask::merge(&task, &result)
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let archive = setup_test_archive().await;

        let task = completed_task("A1");
        archive.upsert(&task).await.unwrap();

        let found = archive.get(task.task_id).await.unwrap().unwrap();
        assert_eq!(found, task);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let archive = setup_test_archive().await;

        let task = completed_task("A1");
        archive.upsert(&task).await.unwrap();
        archive.upsert(&task).await.unwrap();

        assert_eq!(archive.count().await.unwrap(), 1);
        assert_eq!(archive.get(task.task_id).await.unwrap().unwrap(), task);
    }

    #[tokio::test]
    async fn test_upsert_replaces_fields() {
        let archive = setup_test_archive().await;

        let mut task = completed_task("A1");
        archive.upsert(&task).await.unwrap();

        task.interpretation = "revised summary".to_string();
        archive.upsert(&task).await.unwrap();

        let found = archive.get(task.task_id).await.unwrap().unwrap();
        assert_eq!(found.interpretation, "revised summary");
        assert_eq!(archive.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_all() {
        let archive = setup_test_archive().await;

        archive.upsert(&completed_task("A1")).await.unwrap();
        archive.upsert(&completed_task("A2")).await.unwrap();

        let all = archive.list().await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
