//! Relayops orchestrator daemon entry point.
//!
//! Wires the stores, services, and background loops together and runs
//! until interrupted. The HTTP surface mounts on top of the service
//! structs exposed by the library.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use relayops::adapters::memory::MemoryQueueStore;
use relayops::adapters::sqlite::{
    initialize_database, SqliteAgentRepository, SqliteConfigRepository, SqliteTaskArchive,
};
use relayops::adapters::translator::LlmTranslator;
use relayops::adapters::webhook::WebhookNotifier;
use relayops::domain::ports::ConfigRepository;
use relayops::infrastructure::config::ConfigLoader;
use relayops::services::{
    LivenessMonitor, LivenessMonitorConfig, NotificationLoop, ReconcileLoopConfig, Reconciler,
    TaskLifecycleService,
};
use relayops::{AgentRegistryService, Config};

#[derive(Parser)]
#[command(name = "relayops", version, about = "Remote ops command orchestrator")]
struct Cli {
    /// Path to a configuration file (defaults to .relayops/config.yaml)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Override the database path
    #[arg(long, env = "RELAYOPS_DATABASE__PATH")]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    if let Some(database) = cli.database {
        config.database.path = database;
    }

    init_tracing(&config);
    info!("starting relayops orchestrator");

    let pool = initialize_database(
        &format!("sqlite:{}", config.database.path),
        config.database.max_connections,
    )
    .await
    .context("Failed to initialize durable store")?;

    let store = Arc::new(MemoryQueueStore::new());
    let agents = Arc::new(SqliteAgentRepository::new(pool.clone()));
    let archive = Arc::new(SqliteTaskArchive::new(pool.clone()));
    let config_repo = SqliteConfigRepository::new(pool);

    // The transport layer mounts these two services; the daemon itself
    // only drives the background loops.
    let translator = Arc::new(build_translator(&config, &config_repo).await?);
    let _lifecycle = Arc::new(TaskLifecycleService::new(
        store.clone(),
        agents.clone(),
        archive.clone(),
        translator,
    ));
    let _registry = Arc::new(AgentRegistryService::new(agents.clone(), store.clone()));

    let reconciler = Reconciler::new(
        store.clone(),
        archive,
        ReconcileLoopConfig {
            run_interval: Duration::from_secs(config.reconciler.interval_secs),
            lock_stale_after: chrono::Duration::seconds(config.reconciler.lock_stale_secs as i64),
        },
    );
    // Warm the ephemeral store from the archive before serving anything
    if let Some(report) = reconciler.run_once().await? {
        info!(rehydrated = report.rehydrated, "cold-start warm-up complete");
    }
    let reconciler_handle = reconciler.handle();
    let reconciler_task = reconciler.run();

    let monitor = LivenessMonitor::new(
        agents,
        store.clone(),
        LivenessMonitorConfig {
            check_interval: Duration::from_secs(config.liveness.interval_secs),
            staleness_threshold: chrono::Duration::seconds(config.liveness.staleness_secs as i64),
        },
    );
    let monitor_handle = monitor.handle();
    let monitor_task = monitor.run();

    let notification_task = if config.notifications.enabled {
        match config_repo.get("slack_webhook_url").await? {
            Some(url) => {
                let worker = NotificationLoop::new(
                    store,
                    Arc::new(WebhookNotifier::new(url)?),
                    Duration::from_secs(config.notifications.interval_secs),
                );
                let handle = worker.handle();
                Some((handle, worker.run()))
            }
            None => {
                warn!("no webhook URL configured, notification dispatch disabled");
                None
            }
        }
    } else {
        None
    };

    info!("orchestrator running, press ctrl-c to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("shutting down");
    reconciler_handle.stop();
    monitor_handle.stop();
    if let Some((handle, task)) = notification_task {
        handle.stop();
        task.abort();
    }
    reconciler_task.abort();
    monitor_task.abort();

    Ok(())
}

fn init_tracing(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    let fmt_layer = if config.logging.format == "json" {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Build the translator, honoring a model override from the durable
/// config table (set through the admin surface).
async fn build_translator(
    config: &Config,
    config_repo: &SqliteConfigRepository,
) -> Result<LlmTranslator> {
    let translator = LlmTranslator::new(&config.translator)?;
    match config_repo.get("translator.model").await? {
        Some(model) => Ok(translator.with_model(model)),
        None => Ok(translator),
    }
}
