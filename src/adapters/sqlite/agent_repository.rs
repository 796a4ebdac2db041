//! SQLite implementation of the AgentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::{Agent, AgentMetadata, AgentStatus, OsType};
use crate::domain::ports::AgentRepository;

#[derive(Clone)]
pub struct SqliteAgentRepository {
    pool: SqlitePool,
}

impl SqliteAgentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgentRepository for SqliteAgentRepository {
    async fn upsert(&self, agent: &Agent) -> OrchestratorResult<()> {
        sqlx::query(
            r#"INSERT INTO agents (agent_id, os_type, status, computer_name, private_ip,
               shell_version, last_update_time)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(agent_id) DO UPDATE SET
                   os_type = excluded.os_type,
                   status = excluded.status,
                   computer_name = excluded.computer_name,
                   private_ip = excluded.private_ip,
                   shell_version = excluded.shell_version,
                   last_update_time = excluded.last_update_time"#,
        )
        .bind(&agent.agent_id)
        .bind(agent.os_type.as_str())
        .bind(agent.status.to_string())
        .bind(&agent.metadata.computer_name)
        .bind(&agent.metadata.private_ip)
        .bind(&agent.metadata.shell_version)
        .bind(agent.last_update_time.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, agent_id: &str) -> OrchestratorResult<Option<Agent>> {
        let row: Option<AgentRow> = sqlx::query_as("SELECT * FROM agents WHERE agent_id = ?")
            .bind(agent_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_into()).transpose()
    }

    async fn list(&self) -> OrchestratorResult<Vec<Agent>> {
        let rows: Vec<AgentRow> = sqlx::query_as("SELECT * FROM agents ORDER BY agent_id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn update_status(
        &self,
        agent_id: &str,
        status: AgentStatus,
        last_update_time: DateTime<Utc>,
    ) -> OrchestratorResult<()> {
        let result =
            sqlx::query("UPDATE agents SET status = ?, last_update_time = ? WHERE agent_id = ?")
                .bind(status.to_string())
                .bind(last_update_time.to_rfc3339())
                .bind(agent_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::AgentNotFound(agent_id.to_string()));
        }

        Ok(())
    }

    async fn set_status(&self, agent_id: &str, status: AgentStatus) -> OrchestratorResult<()> {
        let result = sqlx::query("UPDATE agents SET status = ? WHERE agent_id = ?")
            .bind(status.to_string())
            .bind(agent_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::AgentNotFound(agent_id.to_string()));
        }

        Ok(())
    }

    async fn delete(&self, agent_id: &str) -> OrchestratorResult<()> {
        let result = sqlx::query("DELETE FROM agents WHERE agent_id = ?")
            .bind(agent_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::AgentNotFound(agent_id.to_string()));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct AgentRow {
    agent_id: String,
    os_type: String,
    status: String,
    computer_name: Option<String>,
    private_ip: Option<String>,
    shell_version: Option<String>,
    last_update_time: String,
}

impl TryFrom<AgentRow> for Agent {
    type Error = OrchestratorError;

    fn try_from(row: AgentRow) -> Result<Self, Self::Error> {
        let os_type = OsType::from_str(&row.os_type)
            .map_err(|e| OrchestratorError::Serialization(e.to_string()))?;
        let status = AgentStatus::from_str(&row.status)
            .map_err(|e| OrchestratorError::Serialization(e.to_string()))?;
        let last_update_time = super::parse_datetime(&row.last_update_time)?;

        Ok(Agent {
            agent_id: row.agent_id,
            os_type,
            status,
            metadata: AgentMetadata {
                computer_name: row.computer_name,
                private_ip: row.private_ip,
                shell_version: row.shell_version,
            },
            last_update_time,
        })
    }
}
