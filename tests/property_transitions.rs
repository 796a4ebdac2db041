//! Property tests for the task state machine.

use proptest::prelude::*;
use relayops::domain::models::{Task, TaskStatus};

const ALL_STATUSES: [TaskStatus; 4] = [
    TaskStatus::Pending,
    TaskStatus::Approved,
    TaskStatus::Rejected,
    TaskStatus::Completed,
];

fn status_strategy() -> impl Strategy<Value = TaskStatus> {
    (0..ALL_STATUSES.len()).prop_map(|i| ALL_STATUSES[i])
}

proptest! {
    /// Property: the only edges in the state machine are
    /// pending -> {approved, rejected} and approved -> completed.
    #[test]
    fn prop_only_specified_edges_exist(
        from in status_strategy(),
        to in status_strategy(),
    ) {
        let expected = matches!(
            (from, to),
            (TaskStatus::Pending, TaskStatus::Approved)
                | (TaskStatus::Pending, TaskStatus::Rejected)
                | (TaskStatus::Approved, TaskStatus::Completed)
        );
        prop_assert_eq!(from.can_transition_to(to), expected);
    }

    /// Property: driving a task through any sequence of attempted
    /// transitions never leaves the specified edges, never revisits
    /// pending, and stops at a terminal state.
    #[test]
    fn prop_random_walks_respect_the_machine(
        attempts in prop::collection::vec(status_strategy(), 1..16),
    ) {
        let mut task = Task::new("prop test", "true", "A1");
        let mut left_pending = false;

        for next in attempts {
            let before = task.status;
            match task.transition_to(next) {
                Ok(()) => {
                    prop_assert!(before.can_transition_to(next));
                    prop_assert_eq!(task.status, next);
                    if before == TaskStatus::Pending {
                        left_pending = true;
                    }
                }
                Err(_) => {
                    // Failed transition leaves the task untouched
                    prop_assert_eq!(task.status, before);
                }
            }

            if left_pending {
                prop_assert_ne!(task.status, TaskStatus::Pending);
            }
            if task.is_terminal() {
                for blocked in ALL_STATUSES {
                    prop_assert!(!task.status.can_transition_to(blocked));
                }
            }
        }
    }

    /// Property: timestamps are stamped exactly when their transition
    /// happens and never erased afterwards.
    #[test]
    fn prop_timestamps_follow_transitions(
        attempts in prop::collection::vec(status_strategy(), 1..16),
    ) {
        let mut task = Task::new("prop test", "true", "A1");

        for next in attempts {
            let _ = task.transition_to(next);

            match task.status {
                TaskStatus::Pending => {
                    prop_assert!(task.approved_at.is_none());
                    prop_assert!(task.rejected_at.is_none());
                    prop_assert!(task.completed_at.is_none());
                }
                TaskStatus::Approved => {
                    prop_assert!(task.approved_at.is_some());
                    prop_assert!(task.rejected_at.is_none());
                }
                TaskStatus::Rejected => {
                    prop_assert!(task.rejected_at.is_some());
                    prop_assert!(task.completed_at.is_none());
                }
                TaskStatus::Completed => {
                    prop_assert!(task.approved_at.is_some());
                    prop_assert!(task.completed_at.is_some());
                }
            }
        }
    }
}
