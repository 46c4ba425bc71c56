//! Scrape orchestration: fetch metadata once, then poll stats in the background.

use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::scrape::data::{Meta, Stats};
use crate::scrape::meta::fetch_meta_with;
use crate::scrape::poller::{PollSummary, PollerState, StatsPoller};
use crate::scrape::traits::Transport;
use crate::scrape::transport::TransportClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::info;

/// Consumer side of a session's stats stream.
pub type StatsStream = ReceiverStream<Stats>;

/// Cancels the scope a session's poller runs in.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Ask the poller to stop at its next tick boundary.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// A running scrape: fetched metadata plus a live stats stream.
///
/// Dropping the session cancels its poller. The stream ends (yields `None`)
/// once the poller has stopped and any buffered snapshot has been read.
pub struct ScrapeSession {
    meta: Arc<Meta>,
    stats: mpsc::Receiver<Stats>,
    cancel: CancellationToken,
    interval: Duration,
    state: watch::Receiver<PollerState>,
    poller: JoinHandle<PollSummary>,
    scope: DropGuard,
}

impl ScrapeSession {
    /// Metadata fetched at startup.
    pub fn meta(&self) -> &Arc<Meta> {
        &self.meta
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Next snapshot, or `None` once the stream is closed.
    pub async fn recv(&mut self) -> Option<Stats> {
        self.stats.recv().await
    }

    /// A handle that can cancel this session from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            token: self.cancel.clone(),
        }
    }

    /// Request cancellation without waiting for the poller.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Current state of the background poller.
    pub fn poller_state(&self) -> PollerState {
        *self.state.borrow()
    }

    /// Take the session apart into metadata, stream and cancel handle.
    ///
    /// The poller keeps running detached until the handle is cancelled or
    /// the stream is dropped.
    pub fn split(self) -> (Arc<Meta>, StatsStream, CancelHandle) {
        let ScrapeSession {
            meta,
            stats,
            cancel,
            scope,
            ..
        } = self;
        let _ = scope.disarm();
        (meta, ReceiverStream::new(stats), CancelHandle { token: cancel })
    }

    /// Cancel and wait for the poller to stop.
    pub async fn shutdown(self) -> Result<PollSummary> {
        let ScrapeSession {
            cancel,
            poller,
            stats,
            scope,
            ..
        } = self;
        cancel.cancel();
        let summary = poller
            .await
            .map_err(|e| ScrapeError::task_error(e.to_string()))?;
        drop(stats);
        drop(scope);
        Ok(summary)
    }
}

/// Start scraping the agent at `address` over TCP.
///
/// `interval` must be a whole number of milliseconds.
pub async fn start(address: impl Into<String>, interval: Duration) -> Result<ScrapeSession> {
    if interval.subsec_nanos() % 1_000_000 != 0 {
        return Err(ScrapeError::config_error(format!(
            "poll interval {:?} is not a whole number of milliseconds",
            interval
        )));
    }
    start_with_config(&ScrapeConfig::new(address).with_interval(interval)).await
}

/// Start scraping over TCP with explicit configuration.
pub async fn start_with_config(config: &ScrapeConfig) -> Result<ScrapeSession> {
    start_with_transport(TransportClient::new(config.address.clone()), config).await
}

/// Start scraping through `transport`.
///
/// The metadata fetch completes before this returns. If it fails the error is
/// returned and no poller is started. Otherwise the poller is spawned on the
/// current tokio runtime and this returns immediately.
pub async fn start_with_transport<T>(transport: T, config: &ScrapeConfig) -> Result<ScrapeSession>
where
    T: Transport + 'static,
{
    config.validate()?;

    let meta = Arc::new(fetch_meta_with(&transport).await?);

    let cancel = CancellationToken::new();
    let interval = config.interval();
    let (tx, rx) = mpsc::channel(config.buffer);
    let poller = StatsPoller::new(transport, interval, cancel.clone(), tx);
    let state = poller.subscribe_state();
    let handle = tokio::spawn(poller.run());

    info!(
        pid = meta.pid,
        name = %meta.name,
        interval_ms = config.interval_ms,
        buffer = config.buffer,
        "scrape session started"
    );

    Ok(ScrapeSession {
        meta,
        stats: rx,
        scope: cancel.clone().drop_guard(),
        cancel,
        interval,
        state,
        poller: handle,
    })
}
