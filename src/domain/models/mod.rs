//! Domain models for the relayops orchestrator.

pub mod agent;
pub mod config;
pub mod notification;
pub mod result;
pub mod task;

pub use agent::{Agent, AgentMetadata, AgentRegistration, AgentStatus, OsType};
pub use config::{
    Config, DatabaseConfig, LivenessConfig, LoggingConfig, NotificationConfig, ReconcilerConfig,
    TranslatorConfig,
};
pub use notification::Notification;
pub use result::{TaskResult, TaskSummary};
pub use task::{ArchivedTask, DispatchedTask, Task, TaskStatus};
