//! Launch configuration: where the server lives and whether it runs in
//! internal test mode. Built once at process start and never mutated.

use crate::server_dir::ServerDir;
use std::path::PathBuf;

/// Immutable startup parameters for the supervised server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    server_dir: ServerDir,
    internal_test_mode: bool,
}

/// Errors that can occur while resolving the launch configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The OS could not tell us the invoking user's home directory.
    HomeDirUnavailable,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::HomeDirUnavailable => {
                write!(f, "home directory could not be determined")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl LaunchConfig {
    /// Build the configuration from a resolved home directory.
    ///
    /// `home` is whatever the OS lookup produced; `None` or an empty path is
    /// a resolution failure.
    pub fn resolve(home: Option<PathBuf>, internal_test_mode: bool) -> Result<Self, ConfigError> {
        let home = home
            .filter(|h| !h.as_os_str().is_empty())
            .ok_or(ConfigError::HomeDirUnavailable)?;
        Ok(Self {
            server_dir: ServerDir::under_home(&home),
            internal_test_mode,
        })
    }

    /// Working directory handed to the server.
    pub fn server_dir(&self) -> &ServerDir {
        &self.server_dir
    }

    pub fn internal_test_mode(&self) -> bool {
        self.internal_test_mode
    }
}
