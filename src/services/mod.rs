//! Service layer: the orchestration engine proper.

pub mod agent_registry;
pub(crate) mod keys;
pub mod liveness_monitor;
pub mod notification_loop;
pub mod reconciler;
pub mod task_lifecycle;

pub use agent_registry::AgentRegistryService;
pub use liveness_monitor::{LivenessMonitor, LivenessMonitorConfig, MonitorHandle};
pub use notification_loop::{NotificationLoop, NotificationLoopHandle};
pub use reconciler::{ReconcileLoopConfig, ReconcileReport, Reconciler, ReconcilerHandle};
pub use task_lifecycle::TaskLifecycleService;
