//! # procscrape - Remote Process Diagnostics Scraper
//!
//! Client side of a process-diagnostics agent protocol. A scrape session
//! fetches the target process's static metadata once, then polls runtime
//! statistics on a fixed interval and hands each snapshot to a consumer.
//!
//! ## Protocol
//!
//! Every request opens a new TCP connection, writes a single signal byte
//! (`0x01` for metadata, `0x02` for stats) and reads one JSON document until
//! the agent closes the connection.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use procscrape::scrape;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = scrape::start("127.0.0.1:9090", Duration::from_secs(1)).await?;
//!     println!("scraping {} (pid {})", session.meta().name, session.meta().pid);
//!
//!     while let Some(stats) = session.recv().await {
//!         println!("{:?}", stats.get("heap"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod scrape;

// Re-export public API
pub use config::ScrapeConfig;
pub use error::{Result, ScrapeError};
pub use scrape::{
    fetch_meta, start, start_with_config, CancelHandle, Meta, PollSummary, PollerState,
    ScrapeSession, Signal, Stats, StatsStream, Transport, TransportClient,
};

/// The default stats poll interval in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// The default capacity of the stats stream
pub const DEFAULT_BUFFER: usize = 1;

/// The default agent address
pub const DEFAULT_AGENT_ADDRESS: &str = "127.0.0.1:9090";
