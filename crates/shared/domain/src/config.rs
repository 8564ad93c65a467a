use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything the daemon reads from its config file and `ZWEMBOT__*` variables.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonConfigInner {
    pub storage: StorageConfig,
    pub upstream: UpstreamConfig,
    pub schedule: ScheduleConfig,
    pub clock: ClockConfig,
    pub log: LogConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    #[serde(flatten, default)]
    inner: Arc<DaemonConfigInner>,
}

impl Deref for DaemonConfig {
    type Target = DaemonConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for DaemonConfig {
    fn deref_mut(&mut self) -> &mut DaemonConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Where `queue.json` and `customers.json` live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

/// Booking service endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Bounds of the randomized pause between cycles.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub min_interval_secs: u64,
    pub max_interval_secs: u64,
    /// Fixes the jitter sequence; unset seeds from the OS.
    pub seed: Option<u64>,
}

/// Zone used to read the dates and times of queued time windows.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// `"local"` or a fixed offset such as `"+01:00"`.
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: Option<PathBuf>,
    pub json: bool,
}

// --- Default ---

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("data") }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://publiek.usc.ru.nl/app/api/v1/".to_owned(),
            timeout_secs: 30,
            user_agent: concat!("zwembot/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { min_interval_secs: 600, max_interval_secs: 2400, seed: None }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { timezone: "local".to_owned() }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), dir: None, json: false }
    }
}
