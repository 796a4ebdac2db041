//! In-process adapters backing the ephemeral store ports.

pub mod queue_store;

pub use queue_store::MemoryQueueStore;
