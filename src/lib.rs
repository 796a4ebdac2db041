//! Relayops - Remote Ops Command Orchestrator
//!
//! Relayops turns natural-language operator commands into OS-specific
//! scripts, routes them through a human approval queue to remote agents,
//! and collects execution results centrally. Live task state lives in a
//! fast ephemeral queue store; completed work is reconciled into a durable
//! SQLite archive that survives restarts.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **Domain Layer** (`domain`): models, errors, and port traits
//! - **Service Layer** (`services`): task lifecycle, agent registry, and
//!   the background loops (liveness, reconciliation, notifications)
//! - **Adapters** (`adapters`): SQLite durable store, in-process queue
//!   store, HTTP translator, webhook sink
//! - **Infrastructure** (`infrastructure`): configuration loading

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{OrchestratorError, OrchestratorResult};
pub use domain::models::{
    Agent, AgentMetadata, AgentRegistration, AgentStatus, ArchivedTask, Config, DispatchedTask,
    Notification, OsType, Task, TaskResult, TaskStatus, TaskSummary,
};
pub use domain::ports::{
    AgentRepository, ConfigRepository, Notifier, QueueStore, ScriptTranslator, TaskArchive,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    AgentRegistryService, LivenessMonitor, NotificationLoop, Reconciler, TaskLifecycleService,
};
