//! Scrape session configuration.

use crate::error::{Result, ScrapeError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one scrape session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Agent address (`host:port`)
    pub address: String,
    /// Stats poll interval in milliseconds
    pub interval_ms: u64,
    /// Capacity of the stats stream; the poller blocks once it is full
    pub buffer: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            address: crate::DEFAULT_AGENT_ADDRESS.to_string(),
            interval_ms: crate::DEFAULT_INTERVAL_MS,
            buffer: crate::DEFAULT_BUFFER,
        }
    }
}

impl ScrapeConfig {
    /// Create a configuration for the agent at `address` with default timing.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Set the agent address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the poll interval in milliseconds.
    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Set the poll interval.
    ///
    /// The interval is stored in whole milliseconds; any sub-millisecond
    /// remainder is truncated.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the stats stream capacity.
    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    /// The poll interval as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Reject settings the poller cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(ScrapeError::config_error("agent address is empty"));
        }
        if self.interval_ms == 0 {
            return Err(ScrapeError::config_error("poll interval must be at least 1ms"));
        }
        if self.buffer == 0 {
            return Err(ScrapeError::config_error("stream buffer must hold at least one value"));
        }
        Ok(())
    }
}
