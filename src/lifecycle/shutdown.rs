//! Shutdown coordination.
//!
//! Huddles live only in memory, so stopping the server discards them. The
//! reason travels with the signal so the server can log what ended them.

use std::fmt;
use tokio::sync::broadcast;

/// What asked the service to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// An OS signal, named as in `SIGTERM`.
    Signal(&'static str),
    /// Requested in-process, for example by a test harness.
    Requested,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Signal(name) => write!(f, "signal {}", name),
            ShutdownReason::Requested => f.write_str("requested"),
        }
    }
}

/// Coordinator for graceful shutdown.
///
/// The server and any background task subscribe; the first trigger wins.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<ShutdownReason>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownReason> {
        self.tx.subscribe()
    }

    /// Tell every subscriber to stop.
    pub fn trigger(&self, reason: ShutdownReason) {
        tracing::info!(%reason, subscribers = self.tx.receiver_count(), "Shutdown triggered");
        let _ = self.tx.send(reason);
    }

    /// Number of subscribers still waiting.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_every_subscriber_with_reason() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = shutdown.clone().subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger(ShutdownReason::Signal("SIGTERM"));
        assert_eq!(a.recv().await.unwrap(), ShutdownReason::Signal("SIGTERM"));
        assert_eq!(b.recv().await.unwrap(), ShutdownReason::Signal("SIGTERM"));
    }

    #[test]
    fn test_trigger_without_subscribers_is_harmless() {
        Shutdown::new().trigger(ShutdownReason::Requested);
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(ShutdownReason::Signal("SIGINT").to_string(), "signal SIGINT");
        assert_eq!(ShutdownReason::Requested.to_string(), "requested");
    }
}
