//! HTTP script translator backed by an OpenAI-compatible chat endpoint.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::{OsType, TranslatorConfig};
use crate::domain::ports::ScriptTranslator;

const BASH_SYSTEM_PROMPT: &str = "You are a helpful assistant that converts natural language \
     commands into Bash scripts. Make sure to provide a complete and executable Bash script.";

const POWERSHELL_SYSTEM_PROMPT: &str = "You are a helpful assistant that converts natural \
     language commands into PowerShell scripts. Make sure to provide a complete and executable \
     PowerShell script.";

const SUMMARIZE_SYSTEM_PROMPT: &str = "You are an assistant that summarizes the output and \
     error of a command execution. Respond in the language of the command text. Provide a \
     simple interpretation of the output and error.";

/// `ScriptTranslator` over a chat-completions HTTP API.
pub struct LlmTranslator {
    http_client: ReqwestClient,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmTranslator {
    pub fn new(config: &TranslatorConfig) -> OrchestratorResult<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OrchestratorError::Upstream(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Override the model, e.g. from the durable config table.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn chat(&self, system: &str, user: String) -> OrchestratorResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
        };

        let mut builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| OrchestratorError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrchestratorError::Upstream(format!(
                "translator returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OrchestratorError::Upstream(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OrchestratorError::Upstream("translator returned no choices".to_string()))
    }
}

#[async_trait]
impl ScriptTranslator for LlmTranslator {
    async fn translate(&self, input: &str, os_type: OsType) -> OrchestratorResult<String> {
        let system = match os_type {
            OsType::Windows => POWERSHELL_SYSTEM_PROMPT,
            OsType::Linux | OsType::Darwin => BASH_SYSTEM_PROMPT,
        };
        let user = format!("OS: {os_type}\nCommand: {input}");

        let response = self.chat(system, user).await?;
        let script = extract_script(&response, os_type);
        debug!(os = %os_type, "translated command into {} byte script", script.len());
        Ok(script)
    }

    async fn summarize(
        &self,
        input: &str,
        output: &str,
        error: &str,
    ) -> OrchestratorResult<String> {
        let user = format!("Command: {input}\nOutput: {output}\nError: {error}");
        self.chat(SUMMARIZE_SYSTEM_PROMPT, user).await
    }
}

/// Pull the script body out of a model response. Prefers the first fenced
/// code block matching the OS shell; falls back to the whole response.
fn extract_script(response: &str, os_type: OsType) -> String {
    let fences = [
        format!("```{}", os_type.shell_name()),
        "```sh".to_string(),
        "```".to_string(),
    ];

    for fence in &fences {
        if let Some(start) = response.find(fence.as_str()) {
            let body_start = start + fence.len();
            let rest = &response[body_start..];
            if let Some(end) = rest.find("```") {
                let script = rest[..end].trim();
                if !script.is_empty() {
                    return script.to_string();
                }
            }
        }
    }

    response.trim().to_string()
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f64,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fenced_bash() {
        let response = "Here is the script:\n```bash\nls -la\n```\nDone.";
        assert_eq!(extract_script(response, OsType::Linux), "ls -la");
    }

    #[test]
    fn test_extract_fenced_powershell() {
        let response = "```powershell\nGet-ChildItem\n```";
        assert_eq!(extract_script(response, OsType::Windows), "Get-ChildItem");
    }

    #[test]
    fn test_extract_plain_fence() {
        let response = "```\nuptime\n```";
        assert_eq!(extract_script(response, OsType::Darwin), "uptime");
    }

    #[test]
    fn test_extract_unfenced_falls_back() {
        assert_eq!(extract_script("  df -h  ", OsType::Linux), "df -h");
    }
}
