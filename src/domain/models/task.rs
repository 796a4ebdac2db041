//! Task domain model.
//!
//! A task is one operator command: translated to a script at submission,
//! held for review, dispatched to a single agent, and completed when that
//! agent reports back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::result::TaskResult;

/// Status of a task in the review/dispatch pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Awaiting operator review.
    Pending,
    /// Approved and queued (or already pulled) for the target agent.
    Approved,
    /// Rejected by the operator. Terminal.
    Rejected,
    /// Agent reported a result. Terminal.
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    /// Valid transitions from this status. Transitions are one-directional;
    /// nothing ever returns to `Pending`.
    pub fn valid_transitions(&self) -> Vec<TaskStatus> {
        match self {
            Self::Pending => vec![Self::Approved, Self::Rejected],
            Self::Approved => vec![Self::Completed],
            Self::Rejected | Self::Completed => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

/// A single operator command addressed to one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, allocated at submission.
    pub task_id: Uuid,

    /// Target agent, fixed at submission.
    pub agent_id: String,

    /// The operator's natural-language command.
    pub input: String,

    /// Script produced by the translator for the agent's OS.
    pub script_code: String,

    /// Current status.
    pub status: TaskStatus,

    /// When the task was submitted.
    pub submitted_at: DateTime<Utc>,

    /// When the task was approved, if it was.
    pub approved_at: Option<DateTime<Utc>>,

    /// When the task was rejected, if it was.
    pub rejected_at: Option<DateTime<Utc>>,

    /// When the agent reported a result, if it has.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new pending task.
    pub fn new(
        input: impl Into<String>,
        script_code: impl Into<String>,
        agent_id: impl Into<String>,
    ) -> Self {
        Self {
            task_id: Uuid::new_v4(),
            agent_id: agent_id.into(),
            input: input.into(),
            script_code: script_code.into(),
            status: TaskStatus::default(),
            submitted_at: Utc::now(),
            approved_at: None,
            rejected_at: None,
            completed_at: None,
        }
    }

    pub fn can_transition_to(&self, new_status: TaskStatus) -> bool {
        self.status.can_transition_to(new_status)
    }

    /// Transition to a new status, stamping the matching timestamp.
    pub fn transition_to(&mut self, new_status: TaskStatus) -> OrchestratorResult<()> {
        if !self.can_transition_to(new_status) {
            return Err(OrchestratorError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: new_status.as_str().to_string(),
            });
        }

        self.status = new_status;
        match new_status {
            TaskStatus::Approved => self.approved_at = Some(Utc::now()),
            TaskStatus::Rejected => self.rejected_at = Some(Utc::now()),
            TaskStatus::Completed => self.completed_at = Some(Utc::now()),
            TaskStatus::Pending => {}
        }

        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// A completed task as stored in the durable `completed_tasks` table:
/// the task fields merged with its result record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedTask {
    pub task_id: Uuid,
    pub agent_id: String,
    pub input: String,
    pub script_code: String,
    pub status: TaskStatus,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub output: String,
    pub error: String,
    pub interpretation: String,
}

impl ArchivedTask {
    /// Merge a task with its result record for archival.
    pub fn merge(task: &Task, result: &TaskResult) -> Self {
        Self {
            task_id: task.task_id,
            agent_id: task.agent_id.clone(),
            input: task.input.clone(),
            script_code: task.script_code.clone(),
            status: task.status,
            submitted_at: task.submitted_at,
            approved_at: task.approved_at,
            completed_at: task.completed_at,
            output: result.output.clone(),
            error: result.error.clone(),
            interpretation: result.interpretation.clone(),
        }
    }

    /// Split back into the task object and result record for cache warm-up.
    pub fn split(&self) -> (Task, TaskResult) {
        let task = Task {
            task_id: self.task_id,
            agent_id: self.agent_id.clone(),
            input: self.input.clone(),
            script_code: self.script_code.clone(),
            status: self.status,
            submitted_at: self.submitted_at,
            approved_at: self.approved_at,
            rejected_at: None,
            completed_at: self.completed_at,
        };
        let result = TaskResult {
            task_id: self.task_id,
            output: self.output.clone(),
            error: self.error.clone(),
            interpretation: self.interpretation.clone(),
        };
        (task, result)
    }
}

/// An approved task as handed to a polling agent, together with any result
/// already reported for it (covers a duplicate fetch by a flaky agent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchedTask {
    pub task: Task,
    pub output: String,
    pub error: String,
    pub interpretation: String,
}

impl DispatchedTask {
    /// Wrap a freshly popped task with no result yet.
    pub fn without_result(task: Task) -> Self {
        Self {
            task,
            output: String::new(),
            error: String::new(),
            interpretation: String::new(),
        }
    }

    /// Wrap a popped task with an already-reported result.
    pub fn with_result(task: Task, result: &TaskResult) -> Self {
        Self {
            task,
            output: result.output.clone(),
            error: result.error.clone(),
            interpretation: result.interpretation.clone(),
        }
    }
}
