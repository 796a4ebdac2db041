//! Deterministic translator for tests and offline development.

use async_trait::async_trait;

use crate::domain::errors::OrchestratorResult;
use crate::domain::models::OsType;
use crate::domain::ports::ScriptTranslator;

/// Echoes the command back as a trivially-shaped script and produces a
/// canned interpretation. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticTranslator;

impl StaticTranslator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScriptTranslator for StaticTranslator {
    async fn translate(&self, input: &str, os_type: OsType) -> OrchestratorResult<String> {
        let script = match os_type {
            OsType::Windows => format!("# powershell\n{input}"),
            OsType::Linux | OsType::Darwin => format!("#!/bin/bash\n{input}"),
        };
        Ok(script)
    }

    async fn summarize(
        &self,
        input: &str,
        _output: &str,
        error: &str,
    ) -> OrchestratorResult<String> {
        if error.is_empty() {
            Ok(format!("Command '{input}' completed successfully"))
        } else {
            Ok(format!("Command '{input}' failed: {error}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_translate_per_os() {
        let translator = StaticTranslator::new();

        let bash = translator.translate("ls", OsType::Linux).await.unwrap();
        assert!(bash.starts_with("#!/bin/bash"));

        let ps = translator.translate("dir", OsType::Windows).await.unwrap();
        assert!(ps.starts_with("# powershell"));
    }

    #[tokio::test]
    async fn test_summarize_reflects_error() {
        let translator = StaticTranslator::new();

        let ok = translator.summarize("ls", "file", "").await.unwrap();
        assert!(ok.contains("successfully"));

        let failed = translator.summarize("ls", "", "boom").await.unwrap();
        assert!(failed.contains("failed"));
    }
}
