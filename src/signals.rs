//! Termination signal handling.
//!
//! SIGINT (Ctrl-C) and SIGTERM are collapsed into a single logical shutdown
//! event, delivered once through a one-shot channel. OS handlers are
//! registered synchronously in [`ShutdownListener::install`], so a signal
//! that arrives before anyone awaits the listener is still delivered.

use std::io;
use tokio::sync::oneshot;

/// Which OS request started the shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

/// Receiving half: awaited once by the supervisor.
#[derive(Debug)]
pub struct ShutdownListener {
    rx: oneshot::Receiver<ShutdownSignal>,
}

/// Sending half. Fires at most once.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: Option<oneshot::Sender<ShutdownSignal>>,
}

/// Create a connected trigger/listener pair.
pub fn channel() -> (ShutdownTrigger, ShutdownListener) {
    let (tx, rx) = oneshot::channel();
    (ShutdownTrigger { tx: Some(tx) }, ShutdownListener { rx })
}

impl ShutdownTrigger {
    /// Deliver the shutdown event. Returns `false` if it was already fired
    /// or nobody is listening any more.
    pub fn fire(&mut self, signal: ShutdownSignal) -> bool {
        match self.tx.take() {
            Some(tx) => tx.send(signal).is_ok(),
            None => false,
        }
    }
}

impl ShutdownListener {
    /// Register for SIGINT and SIGTERM and spawn the delivery task.
    ///
    /// Must be called from within a tokio runtime.
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        let (mut trigger, listener) = channel();

        tokio::spawn(async move {
            let received = tokio::select! {
                Some(()) = interrupt.recv() => ShutdownSignal::Interrupt,
                Some(()) = terminate.recv() => ShutdownSignal::Terminate,
                else => return,
            };
            tracing::info!(signal = ?received, "termination signal received");
            trigger.fire(received);
        });

        tracing::debug!("registered SIGINT and SIGTERM handlers");
        Ok(listener)
    }

    /// Register for Ctrl-C and console close and spawn the delivery task.
    #[cfg(windows)]
    pub fn install() -> io::Result<Self> {
        use tokio::signal::windows::{ctrl_c, ctrl_close};

        let mut interrupt = ctrl_c()?;
        let mut terminate = ctrl_close()?;
        let (mut trigger, listener) = channel();

        tokio::spawn(async move {
            let received = tokio::select! {
                Some(()) = interrupt.recv() => ShutdownSignal::Interrupt,
                Some(()) = terminate.recv() => ShutdownSignal::Terminate,
                else => return,
            };
            tracing::info!(signal = ?received, "termination signal received");
            trigger.fire(received);
        });

        Ok(listener)
    }

    /// Wait for the shutdown event.
    ///
    /// Returns `None` if the trigger was dropped without firing.
    pub async fn recv(self) -> Option<ShutdownSignal> {
        self.rx.await.ok()
    }
}
