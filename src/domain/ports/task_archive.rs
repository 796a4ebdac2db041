use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::OrchestratorResult;
use crate::domain::models::ArchivedTask;

/// Repository port for the durable completed-task archive.
///
/// Rows stay forever once written (audit trail); `upsert` replaces on
/// conflict so repeated reconciliation passes are idempotent.
#[async_trait]
pub trait TaskArchive: Send + Sync {
    /// Insert or replace an archived task keyed by task id.
    async fn upsert(&self, task: &ArchivedTask) -> OrchestratorResult<()>;

    /// Get an archived task by id.
    async fn get(&self, task_id: Uuid) -> OrchestratorResult<Option<ArchivedTask>>;

    /// List all archived tasks.
    async fn list(&self) -> OrchestratorResult<Vec<ArchivedTask>>;

    /// Count archived rows.
    async fn count(&self) -> OrchestratorResult<i64>;
}
