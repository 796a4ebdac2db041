//! Integration tests for the task lifecycle and agent registry.
//!
//! Drives the full path an operator command takes: submit -> pending
//! review -> approve/reject -> single pull by the target agent -> result
//! report -> summary, against an in-memory queue store and a migrated
//! in-memory SQLite durable store.

use std::sync::Arc;

use relayops::adapters::memory::MemoryQueueStore;
use relayops::adapters::sqlite::{
    create_migrated_test_pool, SqliteAgentRepository, SqliteTaskArchive,
};
use relayops::adapters::translator::StaticTranslator;
use relayops::domain::models::{AgentMetadata, AgentRegistration, AgentStatus, TaskStatus};
use relayops::{AgentRegistryService, OrchestratorError, TaskLifecycleService};

struct Harness {
    lifecycle: TaskLifecycleService,
    registry: AgentRegistryService,
}

async fn setup() -> Harness {
    let pool = create_migrated_test_pool().await.expect("test pool");
    let store = Arc::new(MemoryQueueStore::new());
    let agents = Arc::new(SqliteAgentRepository::new(pool.clone()));
    let archive = Arc::new(SqliteTaskArchive::new(pool));

    Harness {
        lifecycle: TaskLifecycleService::new(
            store.clone(),
            agents.clone(),
            archive,
            Arc::new(StaticTranslator::new()),
        ),
        registry: AgentRegistryService::new(agents, store),
    }
}

fn linux_agent(agent_id: &str) -> AgentRegistration {
    AgentRegistration {
        agent_id: agent_id.to_string(),
        os_type: "linux".to_string(),
        metadata: AgentMetadata::default(),
    }
}

#[tokio::test]
async fn submitted_task_is_pending_and_listed() {
    let h = setup().await;
    h.registry.register(linux_agent("A1")).await.unwrap();

    let task_id = h.lifecycle.submit("list files", "A1").await.unwrap();

    let pending = h.lifecycle.list_pending(None).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].task_id, task_id);
    assert_eq!(pending[0].status, TaskStatus::Pending);
    assert_eq!(pending[0].input, "list files");
    assert!(pending[0].script_code.contains("list files"));
}

#[tokio::test]
async fn pending_list_filters_by_agent() {
    let h = setup().await;
    h.registry.register(linux_agent("A1")).await.unwrap();
    h.registry.register(linux_agent("A2")).await.unwrap();

    h.lifecycle.submit("uptime", "A1").await.unwrap();
    h.lifecycle.submit("uptime", "A2").await.unwrap();

    assert_eq!(h.lifecycle.list_pending(None).await.unwrap().len(), 2);
    let only_a1 = h.lifecycle.list_pending(Some("A1")).await.unwrap();
    assert_eq!(only_a1.len(), 1);
    assert_eq!(only_a1[0].agent_id, "A1");
}

#[tokio::test]
async fn approve_dispatches_exactly_once() {
    let h = setup().await;
    h.registry.register(linux_agent("A1")).await.unwrap();

    let task_id = h.lifecycle.submit("list files", "A1").await.unwrap();
    h.lifecycle.approve(task_id).await.unwrap();

    // Gone from the pending index
    assert!(h.lifecycle.list_pending(None).await.unwrap().is_empty());

    // Pulled exactly once
    let first = h.lifecycle.pull_next("A1").await.unwrap();
    assert_eq!(first.unwrap().task.task_id, task_id);
    assert!(h.lifecycle.pull_next("A1").await.unwrap().is_none());
}

#[tokio::test]
async fn double_approve_never_double_enqueues() {
    let h = setup().await;
    h.registry.register(linux_agent("A1")).await.unwrap();

    let task_id = h.lifecycle.submit("list files", "A1").await.unwrap();
    h.lifecycle.approve(task_id).await.unwrap();

    let second = h.lifecycle.approve(task_id).await;
    assert!(matches!(
        second,
        Err(OrchestratorError::InvalidTransition { .. })
    ));

    // Still only one queue entry
    assert!(h.lifecycle.pull_next("A1").await.unwrap().is_some());
    assert!(h.lifecycle.pull_next("A1").await.unwrap().is_none());
}

#[tokio::test]
async fn rejected_task_cannot_be_approved() {
    let h = setup().await;
    h.registry.register(linux_agent("A1")).await.unwrap();

    let task_id = h.lifecycle.submit("rm -rf /", "A1").await.unwrap();
    h.lifecycle.reject(task_id).await.unwrap();

    assert!(h.lifecycle.list_pending(None).await.unwrap().is_empty());
    assert!(h.lifecycle.approve(task_id).await.is_err());
    // Nothing reaches the agent
    assert!(h.lifecycle.pull_next("A1").await.unwrap().is_none());
}

#[tokio::test]
async fn queue_is_fifo_per_agent() {
    let h = setup().await;
    h.registry.register(linux_agent("A1")).await.unwrap();

    let first = h.lifecycle.submit("first", "A1").await.unwrap();
    let second = h.lifecycle.submit("second", "A1").await.unwrap();
    h.lifecycle.approve(first).await.unwrap();
    h.lifecycle.approve(second).await.unwrap();

    let pulled = h.lifecycle.pull_next("A1").await.unwrap().unwrap();
    assert_eq!(pulled.task.task_id, first);
    let pulled = h.lifecycle.pull_next("A1").await.unwrap().unwrap();
    assert_eq!(pulled.task.task_id, second);
}

#[tokio::test]
async fn other_agents_queue_is_private() {
    let h = setup().await;
    h.registry.register(linux_agent("A1")).await.unwrap();
    h.registry.register(linux_agent("A2")).await.unwrap();

    let task_id = h.lifecycle.submit("uptime", "A1").await.unwrap();
    h.lifecycle.approve(task_id).await.unwrap();

    assert!(h.lifecycle.pull_next("A2").await.unwrap().is_none());
    assert!(h.lifecycle.pull_next("A1").await.unwrap().is_some());
}

#[tokio::test]
async fn report_completes_task_and_updates_summary() {
    let h = setup().await;
    h.registry.register(linux_agent("A1")).await.unwrap();

    let task_id = h.lifecycle.submit("list files", "A1").await.unwrap();
    h.lifecycle.approve(task_id).await.unwrap();
    h.lifecycle.pull_next("A1").await.unwrap();

    let interpretation = h.lifecycle.report_result(task_id, "ok", "").await.unwrap();
    assert!(!interpretation.is_empty());

    let summary = h.lifecycle.summary().await.unwrap();
    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.failure_count, 0);

    let history = h.lifecycle.agent_history("A1").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, TaskStatus::Completed);
    assert!(history[0].completed_at.is_some());
}

#[tokio::test]
async fn failed_result_counts_as_failure() {
    let h = setup().await;
    h.registry.register(linux_agent("A1")).await.unwrap();

    let task_id = h.lifecycle.submit("bad command", "A1").await.unwrap();
    h.lifecycle.approve(task_id).await.unwrap();
    h.lifecycle.pull_next("A1").await.unwrap();
    h.lifecycle
        .report_result(task_id, "", "command not found")
        .await
        .unwrap();

    let summary = h.lifecycle.summary().await.unwrap();
    assert_eq!(summary.success_count, 0);
    assert_eq!(summary.failure_count, 1);

    let result = h.lifecycle.task_status(task_id).await.unwrap().unwrap();
    assert!(result.is_failure());
}

#[tokio::test]
async fn duplicate_fetch_sees_reported_result() {
    let h = setup().await;
    h.registry.register(linux_agent("A1")).await.unwrap();

    let task_id = h.lifecycle.submit("uptime", "A1").await.unwrap();
    h.lifecycle.approve(task_id).await.unwrap();

    // A flaky agent reports out of band while its snapshot is still
    // queued; the later pull surfaces the already-reported result.
    h.lifecycle.report_result(task_id, "up 2 days", "").await.unwrap();

    let pulled = h.lifecycle.pull_next("A1").await.unwrap().unwrap();
    assert_eq!(pulled.task.task_id, task_id);
    assert_eq!(pulled.output, "up 2 days");
    assert!(!pulled.interpretation.is_empty());
}

#[tokio::test]
async fn unsupported_os_rejected_at_registration() {
    let h = setup().await;

    let result = h
        .registry
        .register(AgentRegistration {
            agent_id: "A9".to_string(),
            os_type: "templeos".to_string(),
            metadata: AgentMetadata::default(),
        })
        .await;
    assert!(matches!(result, Err(OrchestratorError::UnsupportedOs(_))));
}

#[tokio::test]
async fn submit_to_unknown_agent_fails() {
    let h = setup().await;

    let result = h.lifecycle.submit("uptime", "nope").await;
    assert!(matches!(result, Err(OrchestratorError::AgentNotFound(_))));
}

#[tokio::test]
async fn status_report_flow() {
    let h = setup().await;
    h.registry.register(linux_agent("A1")).await.unwrap();

    h.registry
        .report_status("A1", AgentStatus::Idle)
        .await
        .unwrap();
    let agent = h.registry.get("A1").await.unwrap().unwrap();
    assert_eq!(agent.status, AgentStatus::Idle);

    // Re-registration flips it back to active
    h.registry.register(linux_agent("A1")).await.unwrap();
    let agent = h.registry.get("A1").await.unwrap().unwrap();
    assert_eq!(agent.status, AgentStatus::Active);
}

#[tokio::test]
async fn removed_agent_loses_queued_work() {
    let h = setup().await;
    h.registry.register(linux_agent("A1")).await.unwrap();

    let task_id = h.lifecycle.submit("uptime", "A1").await.unwrap();
    h.lifecycle.approve(task_id).await.unwrap();

    h.registry.remove("A1").await.unwrap();

    assert!(h.registry.get("A1").await.unwrap().is_none());
    assert!(h.lifecycle.pull_next("A1").await.unwrap().is_none());
    assert!(h.lifecycle.agent_history("A1").await.unwrap().is_empty());
}
