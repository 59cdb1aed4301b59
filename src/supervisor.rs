//! Lifecycle supervision: start the server, wait for a termination signal,
//! then run exactly one shutdown sequence.
//!
//! Startup failures are fatal. Once shutdown has begun there is no failure
//! path: the process always exits successfully after the server's close
//! returns, however long that takes.

use crate::config::{ShutdownConfig, SupervisorConfig};
use crate::console::Console;
use crate::launch::{ConfigError, LaunchConfig};
use crate::progress::ProgressReporter;
use crate::server::ManagedService;
use crate::signals::{ShutdownListener, ShutdownSignal};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Printed once after startup when internal test mode is enabled.
pub const TEST_MODE_NOTICE: &str =
    "This server is using internal test mode, and should not be used in production.";

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort startup. Each one ends the process with a non-zero status.
#[derive(Debug)]
pub enum StartupError {
    /// The user's home directory could not be resolved.
    HomeDir(ConfigError),
    /// The server refused to start.
    Service(BoxError),
    /// Termination signal handlers could not be registered.
    Signals(std::io::Error),
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupError::HomeDir(e) => {
                write!(f, "Error obtaining user's home directory: {}", e)
            }
            StartupError::Service(e) => write!(f, "Unable to launch GCA server: {}", e),
            StartupError::Signals(e) => {
                write!(f, "Unable to register for termination signals: {}", e)
            }
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::HomeDir(e) => Some(e),
            StartupError::Service(e) => Some(e.as_ref()),
            StartupError::Signals(e) => Some(e),
        }
    }
}

impl From<ConfigError> for StartupError {
    fn from(e: ConfigError) -> Self {
        StartupError::HomeDir(e)
    }
}

/// How the process ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The shutdown sequence ran to completion.
    Success,
    StartupFailure,
}

impl Exit {
    pub fn code(self) -> u8 {
        match self {
            Exit::Success => 0,
            Exit::StartupFailure => 1,
        }
    }
}

impl From<Exit> for std::process::ExitCode {
    fn from(exit: Exit) -> Self {
        std::process::ExitCode::from(exit.code())
    }
}

/// Timing of the shutdown window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownSettings {
    /// Announced to the operator, never enforced.
    pub eta: Duration,
    pub progress_interval: Duration,
}

impl Default for ShutdownSettings {
    fn default() -> Self {
        Self::from(&ShutdownConfig::default())
    }
}

impl From<&ShutdownConfig> for ShutdownSettings {
    fn from(config: &ShutdownConfig) -> Self {
        Self {
            eta: config.eta(),
            progress_interval: config.progress_interval(),
        }
    }
}

/// Owns the running service for the lifetime of the process.
pub struct Supervisor<S, C> {
    config: LaunchConfig,
    settings: ShutdownSettings,
    service: S,
    console: C,
}

impl<S: ManagedService, C: Console> Supervisor<S, C> {
    /// Resolve the launch configuration, load shutdown settings from the
    /// server directory and start the service.
    ///
    /// `build` is never called if the home directory cannot be resolved.
    pub fn launch<F, E>(
        home: Option<PathBuf>,
        internal_test_mode: bool,
        console: C,
        build: F,
    ) -> Result<Self, StartupError>
    where
        F: FnOnce(&LaunchConfig) -> Result<S, E>,
        E: Into<BoxError>,
    {
        let config = LaunchConfig::resolve(home, internal_test_mode)?;
        let settings = SupervisorConfig::load(&config.server_dir().supervisor_config());
        Self::start(config, ShutdownSettings::from(&settings.shutdown), console, build)
    }

    /// Start the service with explicit settings.
    pub fn start<F, E>(
        config: LaunchConfig,
        settings: ShutdownSettings,
        console: C,
        build: F,
    ) -> Result<Self, StartupError>
    where
        F: FnOnce(&LaunchConfig) -> Result<S, E>,
        E: Into<BoxError>,
    {
        let service = build(&config).map_err(|e| StartupError::Service(e.into()))?;

        if config.internal_test_mode() {
            tracing::warn!("internal test mode enabled");
            console.line(TEST_MODE_NOTICE);
        }

        Ok(Self {
            config,
            settings,
            service,
            console,
        })
    }

    /// Block until the shutdown signal arrives, then shut down.
    ///
    /// Never returns if no signal is ever delivered.
    pub async fn run(self, listener: ShutdownListener) -> Exit {
        tracing::info!(
            dir = %self.config.server_dir().root().display(),
            "server running, waiting for termination signal"
        );

        let signal = match listener.recv().await {
            Some(signal) => signal,
            None => {
                // Without a trigger nothing can ask us to stop.
                tracing::warn!("signal listener ended without a signal");
                std::future::pending::<ShutdownSignal>().await
            }
        };

        self.shutdown(signal).await
    }

    async fn shutdown(self, signal: ShutdownSignal) -> Exit {
        let Supervisor {
            settings,
            mut service,
            console,
            ..
        } = self;

        console.line(&format!(
            "Close signal received, shutting down server. ETA {} seconds.",
            settings.eta.as_secs()
        ));
        tracing::info!(?signal, eta_secs = settings.eta.as_secs(), "shutdown started");

        let started = Instant::now();
        let reporter = ProgressReporter::start(settings.progress_interval, console.clone());

        // close() blocks; keep it off the runtime so the reporter keeps ticking.
        if let Err(e) = tokio::task::spawn_blocking(move || service.close()).await {
            tracing::error!(error = %e, "server close did not finish cleanly");
        }

        reporter.stop().await;
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "shutdown complete"
        );
        console.line("");
        Exit::Success
    }
}
