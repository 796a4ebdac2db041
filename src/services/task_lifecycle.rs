//! Task lifecycle manager.
//!
//! Owns the task state machine (pending -> approved/rejected -> completed)
//! and mediates every task read/write against the ephemeral queue store.
//! Approval pushes a snapshot onto the target agent's dispatch queue; a
//! poll pops exactly one snapshot; a reported result completes the task.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::{
    DispatchedTask, Notification, Task, TaskResult, TaskStatus, TaskSummary,
};
use crate::domain::ports::{AgentRepository, QueueStore, ScriptTranslator, TaskArchive};
use crate::services::keys;

/// Per-task locks serializing approve/reject/report on the same task.
/// Each of those updates spans several store calls; racing them on one
/// task id could dispatch a task twice or resurrect a rejected one.
#[derive(Default)]
struct TaskLockMap {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl TaskLockMap {
    async fn acquire(&self, task_id: Uuid) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(task_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

pub struct TaskLifecycleService {
    store: Arc<dyn QueueStore>,
    agents: Arc<dyn AgentRepository>,
    archive: Arc<dyn TaskArchive>,
    translator: Arc<dyn ScriptTranslator>,
    task_locks: TaskLockMap,
}

impl TaskLifecycleService {
    pub fn new(
        store: Arc<dyn QueueStore>,
        agents: Arc<dyn AgentRepository>,
        archive: Arc<dyn TaskArchive>,
        translator: Arc<dyn ScriptTranslator>,
    ) -> Self {
        Self {
            store,
            agents,
            archive,
            translator,
            task_locks: TaskLockMap::default(),
        }
    }

    /// Submit an operator command targeting one agent.
    ///
    /// Translation failure aborts the submission with nothing created;
    /// on success the task is pending and visible to `list_pending`.
    #[instrument(skip(self, input), err)]
    pub async fn submit(&self, input: &str, target_agent_id: &str) -> OrchestratorResult<Uuid> {
        if input.trim().is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "command text is required".to_string(),
            ));
        }

        let agent = self
            .agents
            .get(target_agent_id)
            .await?
            .ok_or_else(|| OrchestratorError::AgentNotFound(target_agent_id.to_string()))?;

        let script_code = self.translator.translate(input, agent.os_type).await?;

        let task = Task::new(input, script_code, target_agent_id);
        self.write_task(&task).await?;
        self.store
            .push_front(keys::PENDING_INDEX, &task.task_id.to_string())
            .await?;

        info!(task_id = %task.task_id, agent_id = %target_agent_id, "task submitted for review");
        Ok(task.task_id)
    }

    /// All tasks awaiting review, optionally filtered by target agent.
    /// Index order; ids whose task object has vanished are skipped.
    #[instrument(skip(self), err)]
    pub async fn list_pending(&self, agent_id: Option<&str>) -> OrchestratorResult<Vec<Task>> {
        let ids = self.store.list_range(keys::PENDING_INDEX).await?;
        let mut tasks = Vec::with_capacity(ids.len());

        for id in ids {
            let Ok(task_id) = Uuid::parse_str(&id) else {
                warn!(entry = %id, "skipping malformed pending index entry");
                continue;
            };
            if let Some(task) = self.read_task(task_id).await? {
                if agent_id.is_none_or(|a| task.agent_id == a) {
                    tasks.push(task);
                }
            }
        }

        Ok(tasks)
    }

    /// Approve a pending task: queue it for the target agent and drop it
    /// from the pending index. The per-task lock makes the index removal
    /// and dispatch push one critical section, so a second approve sees a
    /// non-pending task and can never enqueue the snapshot twice.
    #[instrument(skip(self), err)]
    pub async fn approve(&self, task_id: Uuid) -> OrchestratorResult<()> {
        let _guard = self.task_locks.acquire(task_id).await;

        let mut task = self
            .read_task(task_id)
            .await?
            .ok_or(OrchestratorError::TaskNotFound(task_id))?;
        task.transition_to(TaskStatus::Approved)?;

        self.write_task(&task).await?;
        self.store
            .push_front(&keys::dispatch_key(&task.agent_id), &serde_json::to_string(&task)?)
            .await?;
        self.store
            .list_remove(keys::PENDING_INDEX, &task_id.to_string())
            .await?;

        info!(task_id = %task_id, agent_id = %task.agent_id, "task approved and dispatched");
        Ok(())
    }

    /// Reject a pending task. Terminal; no dispatch-queue write.
    #[instrument(skip(self), err)]
    pub async fn reject(&self, task_id: Uuid) -> OrchestratorResult<()> {
        let _guard = self.task_locks.acquire(task_id).await;

        let mut task = self
            .read_task(task_id)
            .await?
            .ok_or(OrchestratorError::TaskNotFound(task_id))?;
        task.transition_to(TaskStatus::Rejected)?;

        self.write_task(&task).await?;
        self.store
            .list_remove(keys::PENDING_INDEX, &task_id.to_string())
            .await?;

        info!(task_id = %task_id, "task rejected");
        Ok(())
    }

    /// Pop exactly one approved task from the agent's dispatch queue.
    ///
    /// Destructive read: the queue entry is gone whether or not the agent
    /// survives to report. If a result was already reported for the task
    /// (duplicate fetch by a flaky agent) it is returned alongside.
    #[instrument(skip(self), err)]
    pub async fn pull_next(&self, agent_id: &str) -> OrchestratorResult<Option<DispatchedTask>> {
        let Some(snapshot) = self.store.pop_back(&keys::dispatch_key(agent_id)).await? else {
            return Ok(None);
        };

        let task: Task = serde_json::from_str(&snapshot)?;
        let fields = self.store.hash_get_all(&keys::result_key(task.task_id)).await?;

        let dispatched = if fields.is_empty() {
            DispatchedTask::without_result(task)
        } else {
            let result = TaskResult::from_fields(task.task_id, &fields);
            DispatchedTask::with_result(task, &result)
        };

        info!(task_id = %dispatched.task.task_id, agent_id = %agent_id, "task pulled");
        Ok(Some(dispatched))
    }

    /// Record an execution result reported by an agent.
    ///
    /// The summarizer is best-effort: on failure the interpretation is
    /// empty and the report still succeeds. Re-reporting the same task
    /// overwrites the result record without duplicating history.
    #[instrument(skip(self, output, error), err)]
    pub async fn report_result(
        &self,
        task_id: Uuid,
        output: &str,
        error: &str,
    ) -> OrchestratorResult<String> {
        let _guard = self.task_locks.acquire(task_id).await;

        let mut task = self
            .read_task(task_id)
            .await?
            .ok_or(OrchestratorError::TaskNotFound(task_id))?;

        let interpretation = match self.translator.summarize(&task.input, output, error).await {
            Ok(text) => text,
            Err(e) => {
                warn!(task_id = %task_id, "summarizer failed, storing empty interpretation: {e}");
                String::new()
            }
        };

        let result = TaskResult::new(task_id, output, error)
            .with_interpretation(interpretation.clone());
        let result_key = keys::result_key(task_id);
        for (field, value) in result.to_fields() {
            self.store.hash_set(&result_key, &field, &value).await?;
        }

        let first_completion = task.status != TaskStatus::Completed;
        if first_completion {
            task.transition_to(TaskStatus::Completed)?;
            self.write_task(&task).await?;
            self.store
                .push_front(&keys::history_key(&task.agent_id), &serde_json::to_string(&task)?)
                .await?;
            self.enqueue_notification(&Notification::TaskCompleted {
                task_id,
                agent_id: task.agent_id.clone(),
                failed: result.is_failure(),
            })
            .await;
        }

        info!(task_id = %task_id, failed = result.is_failure(), "result reported");
        Ok(interpretation)
    }

    /// Success/failure counts over every result record.
    #[instrument(skip(self), err)]
    pub async fn summary(&self) -> OrchestratorResult<TaskSummary> {
        let result_keys = self.store.keys_with_prefix(keys::RESULT_PREFIX).await?;
        let mut summary = TaskSummary::default();

        for key in result_keys {
            let Some(task_id) = keys::task_id_from_result_key(&key) else {
                continue;
            };
            let fields = self.store.hash_get_all(&key).await?;
            summary.record(&TaskResult::from_fields(task_id, &fields));
        }

        Ok(summary)
    }

    /// The result record for one task, if reported.
    #[instrument(skip(self), err)]
    pub async fn task_status(&self, task_id: Uuid) -> OrchestratorResult<Option<TaskResult>> {
        let fields = self.store.hash_get_all(&keys::result_key(task_id)).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(TaskResult::from_fields(task_id, &fields)))
    }

    /// Completed-task log for one agent, most recent first.
    #[instrument(skip(self), err)]
    pub async fn agent_history(&self, agent_id: &str) -> OrchestratorResult<Vec<Task>> {
        let entries = self.store.list_range(&keys::history_key(agent_id)).await?;
        let mut tasks = Vec::with_capacity(entries.len());
        for entry in entries {
            tasks.push(serde_json::from_str(&entry)?);
        }
        Ok(tasks)
    }

    /// Every completed task. Reads the ephemeral store first and falls
    /// back to the durable archive when the cache is cold.
    #[instrument(skip(self), err)]
    pub async fn completed_tasks(&self) -> OrchestratorResult<Vec<Task>> {
        let result_keys = self.store.keys_with_prefix(keys::RESULT_PREFIX).await?;
        let mut tasks = Vec::new();

        for key in result_keys {
            let Some(task_id) = keys::task_id_from_result_key(&key) else {
                continue;
            };
            if let Some(task) = self.read_task(task_id).await? {
                if task.status == TaskStatus::Completed {
                    tasks.push(task);
                }
            }
        }

        if tasks.is_empty() {
            tasks = self
                .archive
                .list()
                .await?
                .iter()
                .map(|row| row.split().0)
                .collect();
        }

        Ok(tasks)
    }

    async fn read_task(&self, task_id: Uuid) -> OrchestratorResult<Option<Task>> {
        match self.store.get(&keys::task_key(task_id)).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn write_task(&self, task: &Task) -> OrchestratorResult<()> {
        self.store
            .set(&keys::task_key(task.task_id), &serde_json::to_string(task)?)
            .await
    }

    /// Notification enqueueing never fails a lifecycle operation.
    async fn enqueue_notification(&self, notification: &Notification) {
        let Ok(json) = serde_json::to_string(notification) else {
            return;
        };
        if let Err(e) = self.store.push_front(keys::NOTIFICATIONS, &json).await {
            warn!("failed to enqueue notification: {e}");
        }
    }
}
