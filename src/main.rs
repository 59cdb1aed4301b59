mod config;
mod console;
mod launch;
mod progress;
mod server;
mod server_dir;
mod signals;
mod supervisor;

use clap::Parser;
use console::{Console, Stdout};
use server::GcaServer;
use signals::ShutdownListener;
use std::ffi::OsString;
use std::process::ExitCode;
use supervisor::{Exit, StartupError, Supervisor};
use tracing_subscriber::EnvFilter;

/// Launches the GCA server in `~/gca-server` and keeps it running until
/// SIGINT or SIGTERM, then shuts it down gracefully.
#[derive(Parser, Debug)]
#[command(
    name = "gca-server",
    version,
    about,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Enable internal APIs and info-level logging. Not for production use.
    #[arg(long)]
    internal_test: bool,
}

/// Decide whether internal test mode is on.
///
/// Only the exact invocation `gca-server --internal-test` enables it. Any
/// other argument list, `--help` and `--version` included, disables it
/// and the server starts normally.
fn internal_test_mode(args: &[OsString]) -> bool {
    match Cli::try_parse_from(args) {
        Ok(cli) => cli.internal_test && args.len() == 2,
        Err(e) => {
            tracing::debug!(kind = ?e.kind(), "ignoring unrecognised arguments");
            false
        }
    }
}

fn init_tracing(internal_test_mode: bool) {
    let default_filter = if internal_test_mode {
        "gca_server=info"
    } else {
        "gca_server=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(console: &impl Console, err: StartupError) -> Exit {
    // The console line is the operator's diagnostic; keep the log out of
    // the default filter so it is printed once.
    tracing::debug!(error = %err, "startup failed");
    console.line(&err.to_string());
    Exit::StartupFailure
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().collect();
    let internal_test_mode = internal_test_mode(&args);

    init_tracing(internal_test_mode);
    tracing::debug!(internal_test_mode, "gca-server starting");

    let console = Stdout;
    let supervisor = match Supervisor::launch(
        dirs::home_dir(),
        internal_test_mode,
        console,
        GcaServer::open,
    ) {
        Ok(supervisor) => supervisor,
        Err(e) => return fail(&console, e).into(),
    };

    // Register before waiting so no signal is lost.
    let listener = match ShutdownListener::install() {
        Ok(listener) => listener,
        Err(e) => return fail(&console, StartupError::Signals(e)).into(),
    };

    supervisor.run(listener).await.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_no_arguments_disables_test_mode() {
        assert!(!internal_test_mode(&args(&["gca-server"])));
    }

    #[test]
    fn test_exact_flag_enables_test_mode() {
        assert!(internal_test_mode(&args(&["gca-server", "--internal-test"])));
    }

    #[test]
    fn test_extra_arguments_disable_test_mode() {
        assert!(!internal_test_mode(&args(&["gca-server", "--internal-test", "extra"])));
        assert!(!internal_test_mode(&args(&["gca-server", "extra", "--internal-test"])));
    }

    #[test]
    fn test_repeated_flag_disables_test_mode() {
        assert!(!internal_test_mode(&args(&[
            "gca-server",
            "--internal-test",
            "--internal-test"
        ])));
    }

    #[test]
    fn test_unknown_or_misspelled_flags_are_not_errors() {
        assert!(!internal_test_mode(&args(&["gca-server", "--internal"])));
        assert!(!internal_test_mode(&args(&["gca-server", "-x"])));
        assert!(!internal_test_mode(&args(&["gca-server", "--internal-test=true"])));
    }

    #[test]
    fn test_help_and_version_flags_start_normally() {
        for flag in ["--help", "-h", "--version", "-V"] {
            assert!(
                !internal_test_mode(&args(&["gca-server", flag])),
                "{flag} should leave test mode off"
            );
        }
    }

    #[test]
    fn test_help_and_version_alongside_flag_disable_test_mode() {
        assert!(!internal_test_mode(&args(&["gca-server", "--internal-test", "--help"])));
        assert!(!internal_test_mode(&args(&["gca-server", "-V", "--internal-test"])));
    }

    #[test]
    fn test_startup_failure_prints_single_diagnostic() {
        let console = console::CapturedConsole::default();
        let err = StartupError::Service(Box::new(std::io::Error::other("disk full")));

        assert_eq!(fail(&console, err), Exit::StartupFailure);
        assert_eq!(
            console.lines(),
            vec!["Unable to launch GCA server: disk full"]
        );
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
