//! In-memory agent used by the scrape module tests.

use crate::error::{Result, ScrapeError};
use crate::scrape::data::Signal;
use crate::scrape::traits::Transport;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{self, Instant};

/// What the agent does for one stats request.
#[derive(Debug, Clone)]
pub enum Step {
    Respond(Vec<u8>),
    Unreachable,
}

impl Step {
    pub fn json(body: &str) -> Self {
        Step::Respond(body.as_bytes().to_vec())
    }
}

/// Replays a fixed script; once exhausted every request is refused.
pub struct ScriptedTransport {
    meta: Option<Vec<u8>>,
    script: Mutex<VecDeque<Step>>,
    latency: Duration,
    stats_calls: AtomicUsize,
    meta_calls: AtomicUsize,
    completed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requested_at: Mutex<Vec<Instant>>,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = Step>) -> Self {
        Self {
            meta: Some(br#"{"pid":123,"name":"demo"}"#.to_vec()),
            script: Mutex::new(script.into_iter().collect()),
            latency: Duration::ZERO,
            stats_calls: AtomicUsize::new(0),
            meta_calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requested_at: Mutex::new(Vec::new()),
        }
    }

    /// Replace the meta answer; `None` makes the meta request unreachable.
    pub fn with_meta(mut self, meta: Option<&str>) -> Self {
        self.meta = meta.map(|m| m.as_bytes().to_vec());
        self
    }

    /// Every request takes this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }

    pub fn meta_calls(&self) -> usize {
        self.meta_calls.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Offsets from `start` at which stats requests were issued.
    pub fn request_offsets(&self, start: Instant) -> Vec<Duration> {
        self.requested_at
            .lock()
            .unwrap()
            .iter()
            .map(|at| at.duration_since(start))
            .collect()
    }
}

fn refused() -> ScrapeError {
    ScrapeError::connect_error("scripted", io::Error::from(io::ErrorKind::ConnectionRefused))
}

impl Transport for ScriptedTransport {
    async fn request(&self, signal: Signal) -> Result<Vec<u8>> {
        let step = match signal {
            Signal::MetaRequest => {
                self.meta_calls.fetch_add(1, Ordering::SeqCst);
                self.meta.clone().map(Step::Respond).unwrap_or(Step::Unreachable)
            }
            Signal::StatsRequest => {
                self.stats_calls.fetch_add(1, Ordering::SeqCst);
                self.requested_at.lock().unwrap().push(Instant::now());
                self.script
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or(Step::Unreachable)
            }
        };

        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
        if !self.latency.is_zero() {
            time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);

        match step {
            Step::Respond(body) => Ok(body),
            Step::Unreachable => Err(refused()),
        }
    }

    fn target(&self) -> &str {
        "scripted"
    }
}
