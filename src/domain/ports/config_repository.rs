use async_trait::async_trait;

use crate::domain::errors::OrchestratorResult;

/// Repository port for the durable key/value configuration table
/// (translator model override, webhook URL, API keys).
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// Get a configuration value.
    async fn get(&self, key: &str) -> OrchestratorResult<Option<String>>;

    /// Set a configuration value, replacing any existing one.
    async fn set(&self, key: &str, value: &str) -> OrchestratorResult<()>;

    /// List all configuration entries.
    async fn list(&self) -> OrchestratorResult<Vec<(String, String)>>;
}
