//! Result records reported by agents after executing a script.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The outcome of one script execution, keyed by task id.
///
/// Stored as a field hash in the ephemeral store; writes for the same task
/// are idempotent overwrites, never merges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: Uuid,
    pub output: String,
    pub error: String,
    pub interpretation: String,
}

impl TaskResult {
    pub fn new(task_id: Uuid, output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            task_id,
            output: output.into(),
            error: error.into(),
            interpretation: String::new(),
        }
    }

    pub fn with_interpretation(mut self, interpretation: impl Into<String>) -> Self {
        self.interpretation = interpretation.into();
        self
    }

    /// A result counts as a failure iff its error field is non-empty.
    pub fn is_failure(&self) -> bool {
        !self.error.is_empty()
    }

    /// Flatten into store hash fields.
    pub fn to_fields(&self) -> Vec<(String, String)> {
        vec![
            ("output".to_string(), self.output.clone()),
            ("error".to_string(), self.error.clone()),
            ("interpretation".to_string(), self.interpretation.clone()),
        ]
    }

    /// Rebuild from store hash fields. Missing fields default to empty.
    pub fn from_fields(task_id: Uuid, fields: &HashMap<String, String>) -> Self {
        Self {
            task_id,
            output: fields.get("output").cloned().unwrap_or_default(),
            error: fields.get("error").cloned().unwrap_or_default(),
            interpretation: fields.get("interpretation").cloned().unwrap_or_default(),
        }
    }
}

/// Aggregate success/failure counts over all result records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub success_count: u64,
    pub failure_count: u64,
}

impl TaskSummary {
    pub fn record(&mut self, result: &TaskResult) {
        if result.is_failure() {
            self.failure_count += 1;
        } else {
            self.success_count += 1;
        }
    }
}
