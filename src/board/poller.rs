use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use log::{debug, info, warn};
use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::client::SnapshotSource;
use crate::error::Result;

/// Delay between the end of one fetch and the start of the next.
pub const POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Latest snapshot published by the poller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshState {
    /// Last successfully fetched payload, untouched by failed fetches
    pub data: Value,
    /// Set once the first fetch succeeds
    pub loaded: bool,
    pub cycles: u64,
    pub failures: u64,
    /// Error of the most recent fetch, cleared by the next success
    pub last_error: Option<String>,
    /// Set when the poller has been cancelled
    pub stopped: bool,
}

/// Source of the inter-cycle delay, swappable so tests can skip real time.
pub trait Clock: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()>;
}

pub struct TokioClock;

impl Clock for TokioClock {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Repeatedly fetches the board snapshot and republishes it.
///
/// Only one request is ever in flight. The next fetch is scheduled after the
/// previous one resolves, whether it succeeded or failed, so a flaky backend
/// never stops the refresh cycle.
pub struct Poller {
    source: Arc<dyn SnapshotSource>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    state: watch::Sender<RefreshState>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> (Self, watch::Receiver<RefreshState>) {
        let (state, receiver) = watch::channel(RefreshState::default());

        (
            Self {
                source,
                clock,
                interval,
                state,
            },
            receiver,
        )
    }

    /// Runs one fetch and publishes its outcome. Returns whether it succeeded.
    pub async fn poll_once(&self) -> bool {
        let result = self.source.fetch().await;
        self.publish(result)
    }

    /// Polls until `cancel` fires. Cancellation interrupts an in-flight
    /// request as well as the delay.
    pub async fn run(self, cancel: CancellationToken) {
        info!("Polling every {}ms", self.interval.as_millis());

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = self.poll_once() => {}
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = self.clock.sleep(self.interval) => {}
            }
        }

        self.state.send_modify(|state| state.stopped = true);
        debug!("Poller stopped");
    }

    fn publish(&self, result: Result<Value>) -> bool {
        match result {
            Ok(data) => {
                self.state.send_modify(|state| {
                    state.data = data;
                    state.loaded = true;
                    state.cycles += 1;
                    state.last_error = None;
                });
                debug!("Published snapshot #{}", self.state.borrow().cycles);
                true
            }
            Err(e) => {
                warn!(
                    "Failed to refresh pipeline data, retrying in {}ms: {e}",
                    self.interval.as_millis()
                );
                self.state.send_modify(|state| {
                    state.failures += 1;
                    state.last_error = Some(e.to_string());
                });
                false
            }
        }
    }
}
