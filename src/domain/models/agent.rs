use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating system family an agent runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsType {
    Linux,
    Windows,
    Darwin,
}

impl OsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::Darwin => "darwin",
        }
    }

    /// The shell an agent of this OS executes scripts with.
    pub fn shell_name(&self) -> &'static str {
        match self {
            Self::Windows => "powershell",
            Self::Linux | Self::Darwin => "bash",
        }
    }
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OsType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "windows" => Ok(Self::Windows),
            "darwin" => Ok(Self::Darwin),
            _ => Err(anyhow::anyhow!("Invalid OS type: {s}")),
        }
    }
}

/// Agent status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Idle,
    Down,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Idle => write!(f, "idle"),
            Self::Down => write!(f, "down"),
        }
    }
}

impl FromStr for AgentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "idle" => Ok(Self::Idle),
            "down" => Ok(Self::Down),
            _ => Err(anyhow::anyhow!("Invalid agent status: {s}")),
        }
    }
}

/// Optional environment details reported at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub computer_name: Option<String>,
    pub private_ip: Option<String>,
    pub shell_version: Option<String>,
}

/// A remote worker that executes dispatched scripts and reports results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Externally assigned unique identifier.
    pub agent_id: String,

    /// Operating system the agent runs on.
    pub os_type: OsType,

    /// Current status.
    pub status: AgentStatus,

    /// Environment details from registration.
    #[serde(default)]
    pub metadata: AgentMetadata,

    /// Last time the agent registered or reported status.
    pub last_update_time: DateTime<Utc>,
}

impl Agent {
    /// Create a freshly registered agent.
    pub fn new(agent_id: impl Into<String>, os_type: OsType) -> Self {
        Self {
            agent_id: agent_id.into(),
            os_type,
            status: AgentStatus::Active,
            metadata: AgentMetadata::default(),
            last_update_time: Utc::now(),
        }
    }

    /// Set registration metadata.
    pub fn with_metadata(mut self, metadata: AgentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Check if the agent's last report is older than the staleness threshold.
    pub fn is_stale(&self, threshold: chrono::Duration) -> bool {
        let elapsed = Utc::now() - self.last_update_time;
        elapsed > threshold
    }
}

/// Payload accepted by agent registration. `os_type` arrives as a raw
/// string and is validated against the supported set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRegistration {
    pub agent_id: String,
    pub os_type: String,
    #[serde(default)]
    pub metadata: AgentMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_type_round_trip() {
        assert_eq!("linux".parse::<OsType>().unwrap(), OsType::Linux);
        assert_eq!("WINDOWS".parse::<OsType>().unwrap(), OsType::Windows);
        assert_eq!("darwin".parse::<OsType>().unwrap(), OsType::Darwin);
        assert!("freebsd".parse::<OsType>().is_err());
        assert_eq!(OsType::Darwin.to_string(), "darwin");
    }

    #[test]
    fn test_agent_status_from_str() {
        assert_eq!("active".parse::<AgentStatus>().unwrap(), AgentStatus::Active);
        assert_eq!("IDLE".parse::<AgentStatus>().unwrap(), AgentStatus::Idle);
        assert_eq!("down".parse::<AgentStatus>().unwrap(), AgentStatus::Down);
        assert!("busy".parse::<AgentStatus>().is_err());
    }

    #[test]
    fn test_agent_new_is_active() {
        let agent = Agent::new("A1", OsType::Linux);
        assert_eq!(agent.status, AgentStatus::Active);
        assert_eq!(agent.metadata, AgentMetadata::default());
    }

    #[test]
    fn test_agent_is_stale() {
        let mut agent = Agent::new("A1", OsType::Linux);

        // Not stale immediately
        assert!(!agent.is_stale(chrono::Duration::seconds(60)));

        // Make it stale
        agent.last_update_time = Utc::now() - chrono::Duration::seconds(120);
        assert!(agent.is_stale(chrono::Duration::seconds(60)));
    }

    #[test]
    fn test_shell_name() {
        assert_eq!(OsType::Windows.shell_name(), "powershell");
        assert_eq!(OsType::Linux.shell_name(), "bash");
    }
}
