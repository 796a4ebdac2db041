//! Notifications queued for out-of-band delivery (webhook, chat).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An event worth telling the operator about. Serialized onto the
/// `notifications` list and drained by the notification loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// An agent reported a result for a task.
    TaskCompleted {
        task_id: Uuid,
        agent_id: String,
        failed: bool,
    },
    /// The liveness monitor demoted an agent to down.
    AgentDown { agent_id: String },
}

impl Notification {
    /// Render the one-line message handed to the sink.
    pub fn message(&self) -> String {
        match self {
            Self::TaskCompleted {
                task_id,
                agent_id,
                failed: false,
            } => format!("Task {task_id} completed on agent {agent_id}"),
            Self::TaskCompleted {
                task_id,
                agent_id,
                failed: true,
            } => format!("Task {task_id} failed on agent {agent_id}"),
            Self::AgentDown { agent_id } => format!("Agent {agent_id} marked as down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_rendering() {
        let id = Uuid::new_v4();
        let ok = Notification::TaskCompleted {
            task_id: id,
            agent_id: "A1".to_string(),
            failed: false,
        };
        assert!(ok.message().contains("completed on agent A1"));

        let down = Notification::AgentDown {
            agent_id: "A2".to_string(),
        };
        assert_eq!(down.message(), "Agent A2 marked as down");
    }

    #[test]
    fn test_tagged_serialization() {
        let down = Notification::AgentDown {
            agent_id: "A2".to_string(),
        };
        let json = serde_json::to_string(&down).unwrap();
        assert!(json.contains("\"kind\":\"agent_down\""));

        let back: Notification = serde_json::from_str(&json).unwrap();
        assert_eq!(back, down);
    }
}
