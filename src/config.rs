//! Process configuration: where agents connect and how teardown behaves.

use crate::games::ultimate::Owner;
use crate::protocol::{AgentEndpoints, Endpoint, MAX_ACTION_BYTES};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Game configuration, usually read from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Delay before closing agent channels, so the last write can flush.
    #[serde(default = "default_shutdown_grace_ms")]
    shutdown_grace_ms: u64,

    /// Largest action message accepted from an agent.
    #[serde(default = "default_max_action_bytes")]
    max_action_bytes: usize,

    /// Endpoints used when Player1 is a remote agent.
    #[serde(default = "default_player1")]
    player1: AgentEndpoints,

    /// Endpoints used when Player2 is a remote agent.
    #[serde(default = "default_player2")]
    player2: AgentEndpoints,
}

fn default_shutdown_grace_ms() -> u64 {
    1000
}

fn default_max_action_bytes() -> usize {
    MAX_ACTION_BYTES
}

fn default_player1() -> AgentEndpoints {
    AgentEndpoints::new(
        Endpoint::loopback(8000),
        Endpoint::loopback(8001),
        Endpoint::loopback(8002),
    )
}

fn default_player2() -> AgentEndpoints {
    AgentEndpoints::new(
        Endpoint::loopback(8003),
        Endpoint::loopback(8004),
        Endpoint::loopback(8005),
    )
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_ms: default_shutdown_grace_ms(),
            max_action_bytes: default_max_action_bytes(),
            player1: default_player1(),
            player2: default_player2(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!("Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Endpoints for the agent sitting in `seat`.
    pub fn endpoints(&self, seat: Owner) -> Result<&AgentEndpoints, ConfigError> {
        match seat {
            Owner::Player1 => Ok(&self.player1),
            Owner::Player2 => Ok(&self.player2),
            Owner::None => Err(ConfigError::new("No endpoints for an empty seat".to_string())),
        }
    }

    /// [`Self::shutdown_grace_ms`] as a duration.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
