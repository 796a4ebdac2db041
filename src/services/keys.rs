//! Ephemeral store key conventions shared by the services.

use uuid::Uuid;

/// List of task ids awaiting operator review.
pub(crate) const PENDING_INDEX: &str = "pending_tasks";

/// List of queued notifications awaiting delivery.
pub(crate) const NOTIFICATIONS: &str = "notifications";

/// Lock key serializing concurrent reconciliation runs.
pub(crate) const RECONCILE_LOCK: &str = "reconcile:lock";

/// Prefix of all result hashes, used by scans.
pub(crate) const RESULT_PREFIX: &str = "result:";

/// Task object, JSON-serialized.
pub(crate) fn task_key(task_id: Uuid) -> String {
    format!("task:{task_id}")
}

/// Result record hash for a task.
pub(crate) fn result_key(task_id: Uuid) -> String {
    format!("{RESULT_PREFIX}{task_id}")
}

/// Per-agent dispatch queue of approved task snapshots.
pub(crate) fn dispatch_key(agent_id: &str) -> String {
    format!("dispatch:{agent_id}")
}

/// Per-agent history of completed tasks.
pub(crate) fn history_key(agent_id: &str) -> String {
    format!("history:{agent_id}")
}

/// Task id embedded in a result key, if it parses.
pub(crate) fn task_id_from_result_key(key: &str) -> Option<Uuid> {
    key.strip_prefix(RESULT_PREFIX)
        .and_then(|s| Uuid::parse_str(s).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_key_round_trip() {
        let id = Uuid::new_v4();
        assert_eq!(task_id_from_result_key(&result_key(id)), Some(id));
        assert_eq!(task_id_from_result_key("task:abc"), None);
        assert_eq!(task_id_from_result_key("result:not-a-uuid"), None);
    }
}
