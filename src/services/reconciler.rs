//! Reconciliation between the ephemeral queue store and the durable
//! archive.
//!
//! Each run makes two passes: completed tasks in the ephemeral store are
//! upserted into the archive, then every archived row is rewritten back
//! into the ephemeral store (cache warm-up after a flush or restart).
//! Both passes are idempotent and order-independent; a crash mid-run costs
//! a repeated-but-harmless pass on the next tick, never a completed task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::OrchestratorResult;
use crate::domain::models::{ArchivedTask, Task, TaskResult, TaskStatus};
use crate::domain::ports::{QueueStore, TaskArchive};
use crate::services::keys;

/// Configuration for the reconciliation loop.
#[derive(Debug, Clone)]
pub struct ReconcileLoopConfig {
    /// Interval between runs.
    pub run_interval: Duration,
    /// A lock older than this is treated as abandoned by a crashed holder.
    pub lock_stale_after: chrono::Duration,
}

impl Default for ReconcileLoopConfig {
    fn default() -> Self {
        Self {
            run_interval: Duration::from_secs(60),
            lock_stale_after: chrono::Duration::seconds(300),
        }
    }
}

/// What one reconciliation run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Completed tasks upserted into the durable archive.
    pub archived: u64,
    /// Archived rows rewritten into the ephemeral store.
    pub rehydrated: u64,
}

/// Handle to stop a running reconciler.
pub struct ReconcilerHandle {
    stop_flag: Arc<AtomicBool>,
}

impl ReconcilerHandle {
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
    }
}

pub struct Reconciler {
    store: Arc<dyn QueueStore>,
    archive: Arc<dyn TaskArchive>,
    config: ReconcileLoopConfig,
    stop_flag: Arc<AtomicBool>,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn QueueStore>,
        archive: Arc<dyn TaskArchive>,
        config: ReconcileLoopConfig,
    ) -> Self {
        Self {
            store,
            archive,
            config,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle(&self) -> ReconcilerHandle {
        ReconcilerHandle {
            stop_flag: self.stop_flag.clone(),
        }
    }

    /// Spawn the reconciliation loop. Store failures in one run are logged
    /// and the loop retries after the full interval.
    pub fn run(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.config.run_interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if self.stop_flag.load(Ordering::Acquire) {
                            break;
                        }
                        match self.run_once().await {
                            Ok(Some(report)) => {
                                debug!(archived = report.archived, rehydrated = report.rehydrated,
                                       "reconciliation run complete");
                            }
                            Ok(None) => debug!("reconciliation skipped, lock held elsewhere"),
                            Err(e) => error!("reconciliation run failed: {e}"),
                        }
                    }
                }

                if self.stop_flag.load(Ordering::Acquire) {
                    break;
                }
            }
        })
    }

    /// One reconciliation run. Returns `None` when another instance holds
    /// the store-level lock.
    ///
    /// The lock is a conditional set in the shared store rather than a
    /// process-level mutex, so several orchestrator instances can share
    /// one queue store without doubling work.
    #[instrument(skip(self), err)]
    pub async fn run_once(&self) -> OrchestratorResult<Option<ReconcileReport>> {
        if !self.acquire_lock().await? {
            return Ok(None);
        }

        let result = self.reconcile_both_ways().await;
        // Release even when a pass failed; the next tick retries.
        self.store.delete(keys::RECONCILE_LOCK).await?;

        result.map(Some)
    }

    async fn reconcile_both_ways(&self) -> OrchestratorResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        // Pass 1: ephemeral -> durable. Every completed task with a result
        // record is upserted; replace-on-conflict tolerates reruns and
        // partially-failed prior runs.
        let result_keys = self.store.keys_with_prefix(keys::RESULT_PREFIX).await?;
        for key in result_keys {
            let Some(task_id) = keys::task_id_from_result_key(&key) else {
                warn!(key = %key, "skipping malformed result key");
                continue;
            };
            let Some(task) = self.read_task(task_id).await? else {
                continue;
            };
            if task.status != TaskStatus::Completed {
                continue;
            }

            let fields = self.store.hash_get_all(&key).await?;
            let result = TaskResult::from_fields(task_id, &fields);
            self.archive.upsert(&ArchivedTask::merge(&task, &result)).await?;
            report.archived += 1;
        }

        // Pass 2: durable -> ephemeral. Rewrites survive an ephemeral
        // store flush; rewriting identical state is harmless.
        for row in self.archive.list().await? {
            let (task, result) = row.split();
            self.store
                .set(&keys::task_key(task.task_id), &serde_json::to_string(&task)?)
                .await?;
            let result_key = keys::result_key(task.task_id);
            for (field, value) in result.to_fields() {
                self.store.hash_set(&result_key, &field, &value).await?;
            }
            report.rehydrated += 1;
        }

        info!(archived = report.archived, rehydrated = report.rehydrated, "stores reconciled");
        Ok(report)
    }

    /// Take the store-level reconcile lock, stealing it when the previous
    /// holder left a timestamp past the staleness window (crashed holder).
    async fn acquire_lock(&self) -> OrchestratorResult<bool> {
        let stamp = chrono::Utc::now().to_rfc3339();
        if self.store.set_if_absent(keys::RECONCILE_LOCK, &stamp).await? {
            return Ok(true);
        }

        let held_since = self.store.get(keys::RECONCILE_LOCK).await?;
        let stale = held_since
            .as_deref()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .is_none_or(|t| chrono::Utc::now() - t.with_timezone(&chrono::Utc) > self.config.lock_stale_after);

        if stale {
            warn!("taking over stale reconcile lock");
            self.store.set(keys::RECONCILE_LOCK, &stamp).await?;
            return Ok(true);
        }

        Ok(false)
    }

    async fn read_task(&self, task_id: Uuid) -> OrchestratorResult<Option<Task>> {
        match self.store.get(&keys::task_key(task_id)).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}
