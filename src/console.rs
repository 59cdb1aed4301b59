//! Human-readable operator output.
//!
//! Everything the operator is meant to read goes through a `Console` on
//! stdout; structured logs go to stderr via `tracing`. Writers are not
//! coordinated, so lines from the supervisor and the progress reporter may
//! interleave.

use std::io::Write;

/// Sink for operator-facing lines. Writing never fails from the caller's
/// point of view.
pub trait Console: Clone + Send + Sync + 'static {
    fn line(&self, text: &str);
}

/// Console backed by the process stdout.
///
/// Write failures (closed pipe, vanished terminal) are logged and dropped:
/// losing operator output must never interrupt a shutdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stdout;

impl Console for Stdout {
    fn line(&self, text: &str) {
        write_line(&mut std::io::stdout().lock(), text);
    }
}

fn write_line(out: &mut impl Write, text: &str) {
    if let Err(e) = writeln!(out, "{text}").and_then(|()| out.flush()) {
        tracing::debug!(error = %e, "failed to write console line");
    }
}

#[cfg(test)]
pub(crate) use captured::{CapturedConsole, FailingConsole};
