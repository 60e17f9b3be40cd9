use std::fmt;

use tokio::sync::broadcast;

/// Why the client stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Exit chosen in the UI, or the UI went away
    UserExit,
    /// Ctrl-C reached the process as a signal instead of a key press
    Signal,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::UserExit => write!(f, "user request"),
            ShutdownReason::Signal => write!(f, "interrupt signal"),
        }
    }
}

/// [Shutdown] stops the store and UI loops together. Each loop subscribes once
/// and leaves as soon as a reason arrives.
#[derive(Debug, Clone)]
pub struct Shutdown {
    reason_tx: broadcast::Sender<ShutdownReason>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (reason_tx, _) = broadcast::channel(1);

        Shutdown { reason_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownReason> {
        self.reason_tx.subscribe()
    }

    /// Returns false when no loop was listening anymore
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        match self.reason_tx.send(reason) {
            Ok(listeners) => {
                tracing::debug!(%reason, listeners, "shutdown requested");
                true
            }
            Err(_) => false,
        }
    }

    /// Triggers [ShutdownReason::Signal] on the first Ctrl-C delivered as a signal
    pub fn trigger_on_ctrl_c(&self) {
        let shutdown = self.clone();

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    shutdown.trigger(ShutdownReason::Signal);
                }
                Err(err) => tracing::error!(error = %err, "failed to listen for the interrupt signal"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reason_reaches_every_loop() {
        let shutdown = Shutdown::new();
        let mut store_rx = shutdown.subscribe();
        let mut ui_rx = shutdown.clone().subscribe();

        assert!(shutdown.trigger(ShutdownReason::UserExit));

        assert_eq!(store_rx.recv().await.unwrap(), ShutdownReason::UserExit);
        assert_eq!(ui_rx.recv().await.unwrap(), ShutdownReason::UserExit);
    }

    #[test]
    fn trigger_reports_when_nobody_listens() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.trigger(ShutdownReason::Signal));

        let gone = shutdown.subscribe();
        drop(gone);
        assert!(!shutdown.trigger(ShutdownReason::Signal));
    }

    #[test]
    fn reasons_read_well_in_logs() {
        assert_eq!(ShutdownReason::UserExit.to_string(), "user request");
        assert_eq!(ShutdownReason::Signal.to_string(), "interrupt signal");
    }
}
