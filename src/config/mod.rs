use serde::Deserialize;
use std::time::Duration;

/// Streaming client configuration.
///
/// All tunables are explicit; there are no process-wide defaults beyond
/// the per-field fallbacks applied during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Seconds between keepalive probes while connected
    #[serde(default = "default_keepalive_interval_secs")]
    pub keepalive_interval_secs: u64,
    /// Base reconnect delay; the wait grows linearly with each failure
    #[serde(default = "default_base_reconnect_delay_ms")]
    pub base_reconnect_delay_ms: u64,
    /// Consecutive failures tolerated before giving up (0 disables
    /// reconnection)
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Upper bound on a single connection attempt
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_url() -> String {
    "ws://localhost:8765".to_string()
}

fn default_keepalive_interval_secs() -> u64 {
    30
}

fn default_base_reconnect_delay_ms() -> u64 {
    3000
}

fn default_max_reconnect_attempts() -> u32 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl ClientConfig {
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }

    pub fn base_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.base_reconnect_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            keepalive_interval_secs: default_keepalive_interval_secs(),
            base_reconnect_delay_ms: default_base_reconnect_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Configuration for the stream-monitor binary: client settings plus the
/// channels to subscribe at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub channels: Vec<String>,
}

/// Load monitor configuration from a TOML file.
pub fn load_config(path: &str) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: MonitorConfig = toml::from_str(&contents)?;
    Ok(config)
}
