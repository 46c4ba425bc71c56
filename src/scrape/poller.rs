//! Periodic stats polling.
//!
//! The poller owns all repeating network I/O of a session. It waits for the
//! next tick or for cancellation, issues one stats request, and hands the
//! decoded snapshot to the consumer through a bounded channel. Failed ticks
//! are logged and skipped; they never end the loop.

use crate::scrape::data::{Signal, Stats};
use crate::scrape::traits::Transport;
use crate::scrape::transport::request_json;
use std::fmt;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Where the poll loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Constructed, loop not entered yet
    Idle,
    /// Waiting for the next tick or for cancellation
    Waiting,
    /// A stats request is in flight
    Requesting,
    /// Handing a snapshot to the consumer
    Delivering,
    /// Loop exited
    Stopped,
}

impl fmt::Display for PollerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PollerState::Idle => "idle",
            PollerState::Waiting => "waiting",
            PollerState::Requesting => "requesting",
            PollerState::Delivering => "delivering",
            PollerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Counters reported by a poller once it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Ticks that fired and issued a request
    pub ticks: u64,
    /// Snapshots accepted by the output stream
    pub delivered: u64,
    /// Ticks skipped because the request or decode failed
    pub failures: u64,
}

/// Repeating stats scraper bound to one cancellation scope.
pub struct StatsPoller<T> {
    transport: T,
    interval: Duration,
    cancel: CancellationToken,
    sink: mpsc::Sender<Stats>,
    state: watch::Sender<PollerState>,
}

impl<T: Transport> StatsPoller<T> {
    /// Create an idle poller. `interval` must be non-zero.
    pub fn new(
        transport: T,
        interval: Duration,
        cancel: CancellationToken,
        sink: mpsc::Sender<Stats>,
    ) -> Self {
        let (state, _) = watch::channel(PollerState::Idle);
        Self {
            transport,
            interval,
            cancel,
            sink,
            state,
        }
    }

    /// Observe state transitions of this poller.
    pub fn subscribe_state(&self) -> watch::Receiver<PollerState> {
        self.state.subscribe()
    }

    /// Run until cancelled or until the consumer drops the stream.
    ///
    /// The first tick fires one interval after this is called; later ticks
    /// stay on that schedule, and ticks missed while a request or hand-off
    /// was blocking are skipped rather than replayed. The sink is dropped on
    /// return, which ends the consumer's stream.
    pub async fn run(self) -> PollSummary {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut summary = PollSummary::default();
        info!(
            target_addr = self.transport.target(),
            interval_ms = self.interval.as_millis() as u64,
            "stats poller started"
        );

        loop {
            self.set_state(PollerState::Waiting);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!("cancellation observed at tick boundary");
                    break;
                }
                _ = ticker.tick() => {}
            }

            summary.ticks += 1;
            let tick = summary.ticks;

            self.set_state(PollerState::Requesting);
            let stats =
                match request_json::<_, Stats>(&self.transport, Signal::StatsRequest).await {
                    Ok(stats) => stats,
                    Err(err) => {
                        summary.failures += 1;
                        error!(tick, error = %err, "failed to scrape stats");
                        continue;
                    }
                };

            self.set_state(PollerState::Delivering);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!(tick, "cancelled during hand-off, dropping snapshot");
                    break;
                }
                sent = self.sink.send(stats) => {
                    if sent.is_err() {
                        info!(tick, "stats consumer went away, stopping poller");
                        break;
                    }
                    summary.delivered += 1;
                }
            }
        }

        self.set_state(PollerState::Stopped);
        info!(
            ticks = summary.ticks,
            delivered = summary.delivered,
            failures = summary.failures,
            "stats poller stopped"
        );
        summary
    }

    fn set_state(&self, state: PollerState) {
        self.state.send_replace(state);
    }
}
