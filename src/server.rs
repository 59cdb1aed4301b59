//! The supervised GCA server.
//!
//! The supervisor only depends on [`ManagedService`]: something that was
//! constructed successfully and can be closed. The GCA server's request
//! handling lives outside this crate.

use crate::launch::LaunchConfig;
use crate::server_dir::ServerDir;
use std::path::PathBuf;

/// A long-running service whose lifetime the supervisor owns.
pub trait ManagedService: Send + 'static {
    /// Shut the service down, blocking until it has finished.
    ///
    /// There is no error channel: whatever happens inside, the supervisor
    /// treats the shutdown as complete once this returns.
    fn close(&mut self);
}

/// Errors that can occur while starting the server.
#[derive(Debug)]
pub enum ServerError {
    /// The working directory could not be created.
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::CreateDir { path, source } => {
                write!(
                    f,
                    "failed to create server directory {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::CreateDir { source, .. } => Some(source),
        }
    }
}

/// Handle to a running GCA server.
#[derive(Debug)]
pub struct GcaServer {
    dir: ServerDir,
    internal_test_mode: bool,
    closed: bool,
}

impl GcaServer {
    /// Start the server in the configured working directory, creating the
    /// directory if it does not exist yet.
    pub fn open(config: &LaunchConfig) -> Result<Self, ServerError> {
        let dir = config.server_dir().clone();
        let created = dir.init().map_err(|e| ServerError::CreateDir {
            path: dir.root().to_path_buf(),
            source: e,
        })?;

        tracing::info!(
            dir = %dir.root().display(),
            created,
            internal_test_mode = config.internal_test_mode(),
            "gca server started"
        );

        Ok(Self {
            dir,
            internal_test_mode: config.internal_test_mode(),
            closed: false,
        })
    }
}

impl ManagedService for GcaServer {
    fn close(&mut self) {
        if self.closed {
            tracing::debug!("gca server already closed");
            return;
        }
        self.closed = true;
        tracing::info!(
            dir = %self.dir.root().display(),
            internal_test_mode = self.internal_test_mode,
            "gca server closed"
        );
    }
}
