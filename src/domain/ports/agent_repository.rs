use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::errors::OrchestratorResult;
use crate::domain::models::{Agent, AgentStatus};

/// Repository port for durable agent records.
#[async_trait]
pub trait AgentRepository: Send + Sync {
    /// Create or overwrite an agent record (re-registration overwrites).
    async fn upsert(&self, agent: &Agent) -> OrchestratorResult<()>;

    /// Get an agent by id.
    async fn get(&self, agent_id: &str) -> OrchestratorResult<Option<Agent>>;

    /// List all agents.
    async fn list(&self) -> OrchestratorResult<Vec<Agent>>;

    /// Update status and refresh the last-report timestamp. Fails with
    /// `AgentNotFound` when no row matches.
    async fn update_status(
        &self,
        agent_id: &str,
        status: AgentStatus,
        last_update_time: DateTime<Utc>,
    ) -> OrchestratorResult<()>;

    /// Set status without touching the last-report timestamp. Used only by
    /// the liveness monitor's downgrade.
    async fn set_status(&self, agent_id: &str, status: AgentStatus) -> OrchestratorResult<()>;

    /// Delete an agent record. Fails with `AgentNotFound` when no row
    /// matches.
    async fn delete(&self, agent_id: &str) -> OrchestratorResult<()>;
}
