//! Agent registry: registration, status reports, and removal.

use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::{Agent, AgentRegistration, AgentStatus, OsType};
use crate::domain::ports::{AgentRepository, QueueStore};
use crate::services::keys;

pub struct AgentRegistryService {
    agents: Arc<dyn AgentRepository>,
    store: Arc<dyn QueueStore>,
}

impl AgentRegistryService {
    pub fn new(agents: Arc<dyn AgentRepository>, store: Arc<dyn QueueStore>) -> Self {
        Self { agents, store }
    }

    /// Register an agent. Upsert: re-registration overwrites the record
    /// and unconditionally puts the agent back to active.
    #[instrument(skip(self, registration), fields(agent_id = %registration.agent_id), err)]
    pub async fn register(&self, registration: AgentRegistration) -> OrchestratorResult<Agent> {
        if registration.agent_id.trim().is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "agent_id is required".to_string(),
            ));
        }
        let os_type = OsType::from_str(&registration.os_type)
            .map_err(|_| OrchestratorError::UnsupportedOs(registration.os_type.clone()))?;

        let agent = Agent::new(registration.agent_id, os_type).with_metadata(registration.metadata);
        self.agents.upsert(&agent).await?;

        info!(agent_id = %agent.agent_id, os = %agent.os_type, "agent registered");
        Ok(agent)
    }

    /// Record a status report from an agent, refreshing its last-report
    /// timestamp. Any status value is accepted; a report always overrides
    /// a liveness downgrade.
    #[instrument(skip(self), err)]
    pub async fn report_status(
        &self,
        agent_id: &str,
        status: AgentStatus,
    ) -> OrchestratorResult<()> {
        self.agents
            .update_status(agent_id, status, chrono::Utc::now())
            .await
    }

    /// All known agents.
    #[instrument(skip(self), err)]
    pub async fn list(&self) -> OrchestratorResult<Vec<Agent>> {
        self.agents.list().await
    }

    /// One agent by id.
    #[instrument(skip(self), err)]
    pub async fn get(&self, agent_id: &str) -> OrchestratorResult<Option<Agent>> {
        self.agents.get(agent_id).await
    }

    /// Administrative removal: deletes the record and purges the agent's
    /// dispatch and history queues. Archived completed tasks stay.
    #[instrument(skip(self), err)]
    pub async fn remove(&self, agent_id: &str) -> OrchestratorResult<()> {
        self.agents.delete(agent_id).await?;
        self.store.delete(&keys::dispatch_key(agent_id)).await?;
        self.store.delete(&keys::history_key(agent_id)).await?;

        info!(agent_id = %agent_id, "agent removed");
        Ok(())
    }
}
