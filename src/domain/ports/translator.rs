use async_trait::async_trait;

use crate::domain::errors::OrchestratorResult;
use crate::domain::models::OsType;

/// Port for the external natural-language-to-script transformer.
#[async_trait]
pub trait ScriptTranslator: Send + Sync {
    /// Convert a free-text command into a script executable on the given
    /// OS. Failures abort submission and are never retried here.
    async fn translate(&self, input: &str, os_type: OsType) -> OrchestratorResult<String>;

    /// Summarize an execution result for the operator. Best-effort: the
    /// caller degrades to an empty interpretation on failure.
    async fn summarize(
        &self,
        input: &str,
        output: &str,
        error: &str,
    ) -> OrchestratorResult<String>;
}
