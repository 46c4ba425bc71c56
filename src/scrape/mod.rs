//! Scraping of a remote diagnostics agent.
//!
//! This module provides the protocol client, the one-shot metadata fetch,
//! the periodic stats poller and the session that ties them together under
//! one cancellation scope.

pub mod data;
pub mod meta;
pub mod poller;
pub mod session;
pub mod traits;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used items
pub use data::{Meta, Signal, Stats};
pub use meta::{fetch_meta, fetch_meta_with};
pub use poller::{PollSummary, PollerState, StatsPoller};
pub use session::{
    start, start_with_config, start_with_transport, CancelHandle, ScrapeSession, StatsStream,
};
pub use traits::Transport;
pub use transport::{request_json, TransportClient};
