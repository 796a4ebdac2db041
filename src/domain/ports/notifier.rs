use async_trait::async_trait;

use crate::domain::errors::OrchestratorResult;
use crate::domain::models::Notification;

/// Port for out-of-band notification delivery (webhook, chat).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> OrchestratorResult<()>;
}
