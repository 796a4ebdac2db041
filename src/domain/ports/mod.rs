//! Port trait definitions (Hexagonal Architecture).
//!
//! Async trait interfaces the adapters implement:
//! - `QueueStore`: ephemeral key/list/hash store for live task state
//! - `AgentRepository` / `TaskArchive` / `ConfigRepository`: durable store
//! - `ScriptTranslator`: external text-to-script transformer
//! - `Notifier`: out-of-band notification delivery

pub mod agent_repository;
pub mod config_repository;
pub mod notifier;
pub mod queue_store;
pub mod task_archive;
pub mod translator;

pub use agent_repository::AgentRepository;
pub use config_repository::ConfigRepository;
pub use notifier::Notifier;
pub use queue_store::QueueStore;
pub use task_archive::TaskArchive;
pub use translator::ScriptTranslator;
