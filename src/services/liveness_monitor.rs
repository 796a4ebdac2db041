//! Agent liveness background monitor.
//!
//! Periodically demotes agents whose last report is older than the
//! staleness threshold to `down`. This is the only place `down` is set;
//! any subsequent report or re-registration lifts it again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, instrument};

use crate::domain::errors::OrchestratorResult;
use crate::domain::models::{AgentStatus, Notification};
use crate::domain::ports::{AgentRepository, QueueStore};
use crate::services::keys;

/// Configuration for the liveness monitor.
#[derive(Debug, Clone)]
pub struct LivenessMonitorConfig {
    /// Interval between checks.
    pub check_interval: Duration,
    /// An agent silent longer than this is considered down.
    pub staleness_threshold: chrono::Duration,
}

impl Default for LivenessMonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60),
            staleness_threshold: chrono::Duration::seconds(60),
        }
    }
}

/// Handle to stop a running monitor.
pub struct MonitorHandle {
    stop_flag: Arc<AtomicBool>,
}

impl MonitorHandle {
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
    }
}

pub struct LivenessMonitor {
    agents: Arc<dyn AgentRepository>,
    store: Arc<dyn QueueStore>,
    config: LivenessMonitorConfig,
    stop_flag: Arc<AtomicBool>,
}

impl LivenessMonitor {
    pub fn new(
        agents: Arc<dyn AgentRepository>,
        store: Arc<dyn QueueStore>,
        config: LivenessMonitorConfig,
    ) -> Self {
        Self {
            agents,
            store,
            config,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            stop_flag: self.stop_flag.clone(),
        }
    }

    /// Spawn the monitor loop. A failed check is logged and the loop
    /// retries after the full interval; it never crashes.
    pub fn run(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.config.check_interval);
            // The first tick of tokio's interval fires immediately; skip
            // it so a fresh start does not race agent registration.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if self.stop_flag.load(Ordering::Acquire) {
                            break;
                        }
                        if let Err(e) = self.check_once().await {
                            error!("liveness check failed: {e}");
                        }
                    }
                }

                if self.stop_flag.load(Ordering::Acquire) {
                    break;
                }
            }
        })
    }

    /// One liveness sweep. Returns how many agents were demoted.
    #[instrument(skip(self), err)]
    pub async fn check_once(&self) -> OrchestratorResult<u32> {
        let agents = self.agents.list().await?;
        let mut demoted = 0;

        for agent in agents {
            if agent.status != AgentStatus::Down
                && agent.is_stale(self.config.staleness_threshold)
            {
                self.agents.set_status(&agent.agent_id, AgentStatus::Down).await?;
                info!(agent_id = %agent.agent_id, "agent marked as down");
                demoted += 1;

                let notification = Notification::AgentDown {
                    agent_id: agent.agent_id.clone(),
                };
                if let Ok(json) = serde_json::to_string(&notification) {
                    // Best-effort; the demotion itself already happened
                    let _ = self.store.push_front(keys::NOTIFICATIONS, &json).await;
                }
            }
        }

        Ok(demoted)
    }
}
