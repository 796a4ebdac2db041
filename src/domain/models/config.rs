use serde::{Deserialize, Serialize};

/// Main configuration structure for relayops.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Durable store configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Script translator endpoint configuration.
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// Agent liveness monitoring configuration.
    #[serde(default)]
    pub liveness: LivenessConfig,

    /// Store reconciliation configuration.
    #[serde(default)]
    pub reconciler: ReconcilerConfig,

    /// Notification dispatch configuration.
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            translator: TranslatorConfig::default(),
            liveness: LivenessConfig::default(),
            reconciler: ReconcilerConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

/// Durable store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to the `SQLite` database file.
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".relayops/relayops.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Script translator endpoint configuration (OpenAI-compatible chat API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TranslatorConfig {
    /// Base URL of the chat-completions endpoint.
    #[serde(default = "default_translator_base_url")]
    pub base_url: String,

    /// API key. Empty means unauthenticated (local inference server).
    #[serde(default)]
    pub api_key: String,

    /// Model identifier.
    #[serde(default = "default_translator_model")]
    pub model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_translator_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_translator_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_translator_model() -> String {
    "gpt-4o".to_string()
}

const fn default_translator_timeout_secs() -> u64 {
    60
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            base_url: default_translator_base_url(),
            api_key: String::new(),
            model: default_translator_model(),
            timeout_secs: default_translator_timeout_secs(),
        }
    }
}

/// Agent liveness monitoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LivenessConfig {
    /// Seconds between liveness checks.
    #[serde(default = "default_liveness_interval_secs")]
    pub interval_secs: u64,

    /// Seconds without a report before an agent is considered down.
    #[serde(default = "default_staleness_secs")]
    pub staleness_secs: u64,
}

const fn default_liveness_interval_secs() -> u64 {
    60
}

const fn default_staleness_secs() -> u64 {
    60
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_liveness_interval_secs(),
            staleness_secs: default_staleness_secs(),
        }
    }
}

/// Store reconciliation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReconcilerConfig {
    /// Seconds between reconciliation runs.
    #[serde(default = "default_reconcile_interval_secs")]
    pub interval_secs: u64,

    /// Seconds after which a held reconcile lock is considered abandoned.
    #[serde(default = "default_lock_stale_secs")]
    pub lock_stale_secs: u64,
}

const fn default_reconcile_interval_secs() -> u64 {
    60
}

const fn default_lock_stale_secs() -> u64 {
    300
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_reconcile_interval_secs(),
            lock_stale_secs: default_lock_stale_secs(),
        }
    }
}

/// Notification dispatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NotificationConfig {
    /// Whether the notification loop runs at all.
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,

    /// Seconds between queue drains.
    #[serde(default = "default_notification_interval_secs")]
    pub interval_secs: u64,
}

const fn default_notifications_enabled() -> bool {
    true
}

const fn default_notification_interval_secs() -> u64 {
    10
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
            interval_secs: default_notification_interval_secs(),
        }
    }
}
