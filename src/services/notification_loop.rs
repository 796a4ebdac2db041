//! Notification dispatch background loop.
//!
//! Drains the `notifications` list and hands each payload to the sink.
//! A payload that fails to deliver is logged and dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::domain::errors::OrchestratorResult;
use crate::domain::models::Notification;
use crate::domain::ports::{Notifier, QueueStore};
use crate::services::keys;

pub struct NotificationLoopHandle {
    stop_flag: Arc<AtomicBool>,
}

impl NotificationLoopHandle {
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
    }
}

pub struct NotificationLoop {
    store: Arc<dyn QueueStore>,
    notifier: Arc<dyn Notifier>,
    drain_interval: Duration,
    stop_flag: Arc<AtomicBool>,
}

impl NotificationLoop {
    pub fn new(
        store: Arc<dyn QueueStore>,
        notifier: Arc<dyn Notifier>,
        drain_interval: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            drain_interval,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle(&self) -> NotificationLoopHandle {
        NotificationLoopHandle {
            stop_flag: self.stop_flag.clone(),
        }
    }

    pub fn run(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.drain_interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if self.stop_flag.load(Ordering::Acquire) {
                            break;
                        }
                        if let Err(e) = self.drain_once().await {
                            error!("notification drain failed: {e}");
                        }
                    }
                }

                if self.stop_flag.load(Ordering::Acquire) {
                    break;
                }
            }
        })
    }

    /// Drain everything currently queued. Returns how many were delivered.
    pub async fn drain_once(&self) -> OrchestratorResult<u32> {
        let mut delivered = 0;

        while let Some(payload) = self.store.pop_back(keys::NOTIFICATIONS).await? {
            let notification: Notification = match serde_json::from_str(&payload) {
                Ok(n) => n,
                Err(e) => {
                    warn!("dropping malformed notification payload: {e}");
                    continue;
                }
            };

            match self.notifier.send(&notification).await {
                Ok(()) => {
                    info!("notification sent: {}", notification.message());
                    delivered += 1;
                }
                Err(e) => {
                    // Dropped, not requeued; delivery is best-effort
                    warn!("failed to deliver notification: {e}");
                }
            }
        }

        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryQueueStore;
    use crate::domain::errors::OrchestratorError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, notification: &Notification) -> OrchestratorResult<()> {
            if self.fail {
                return Err(OrchestratorError::Upstream("sink offline".to_string()));
            }
            self.sent.lock().unwrap().push(notification.message());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_drain_delivers_in_order() {
        let store = Arc::new(MemoryQueueStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let worker = NotificationLoop::new(store.clone(), notifier.clone(), Duration::from_secs(10));

        for agent_id in ["A1", "A2"] {
            let n = Notification::AgentDown {
                agent_id: agent_id.to_string(),
            };
            store
                .push_front(keys::NOTIFICATIONS, &serde_json::to_string(&n).unwrap())
                .await
                .unwrap();
        }

        assert_eq!(worker.drain_once().await.unwrap(), 2);
        let sent = notifier.sent.lock().unwrap();
        assert!(sent[0].contains("A1"));
        assert!(sent[1].contains("A2"));
    }

    #[tokio::test]
    async fn test_failed_delivery_is_dropped() {
        let store = Arc::new(MemoryQueueStore::new());
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let worker = NotificationLoop::new(store.clone(), notifier, Duration::from_secs(10));

        let n = Notification::AgentDown {
            agent_id: "A1".to_string(),
        };
        store
            .push_front(keys::NOTIFICATIONS, &serde_json::to_string(&n).unwrap())
            .await
            .unwrap();

        assert_eq!(worker.drain_once().await.unwrap(), 0);
        // Queue is empty: the payload was not requeued
        assert!(store.list_range(keys::NOTIFICATIONS).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_payload_skipped() {
        let store = Arc::new(MemoryQueueStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let worker = NotificationLoop::new(store.clone(), notifier.clone(), Duration::from_secs(10));

        store.push_front(keys::NOTIFICATIONS, "not json").await.unwrap();

        assert_eq!(worker.drain_once().await.unwrap(), 0);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }
}
