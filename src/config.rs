use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Top-level settings loaded from `supervisor.toml` in the server directory.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
#[derive(Default)]
pub struct SupervisorConfig {
    pub shutdown: ShutdownConfig,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Advisory upper bound announced to the operator. Never enforced.
    pub eta_secs: u64,
    pub progress_interval_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            eta_secs: 90,
            progress_interval_secs: 5,
        }
    }
}

impl ShutdownConfig {
    pub fn eta(&self) -> Duration {
        Duration::from_secs(self.eta_secs)
    }

    /// Progress cadence; a zero interval is clamped to one second.
    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs.max(1))
    }
}

impl SupervisorConfig {
    /// Load settings from `path`, falling back to defaults.
    ///
    /// A missing file is the normal case and is silent. An unreadable or
    /// malformed file is logged and ignored; settings never block startup.
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read supervisor settings");
                return Self::default();
            }
        };

        match toml::from_str(&contents) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), ?config, "loaded supervisor settings");
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to parse supervisor settings");
                Self::default()
            }
        }
    }
}
