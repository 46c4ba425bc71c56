//! Error handling for the procscrape crate.

use crate::scrape::data::Signal;

/// A specialized `Result` type for scraping operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// The main error type for scraping operations.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// Dialing the agent failed
    #[error("failed to connect to agent at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the signal byte failed
    #[error("failed to write signal into connection: {source}")]
    Write {
        #[source]
        source: std::io::Error,
    },

    /// Reading the response failed
    #[error("failed to read the response: {source}")]
    Read {
        #[source]
        source: std::io::Error,
    },

    /// The response was not a valid payload for the request
    #[error("failed to decode {signal} response: {source}")]
    Decode {
        signal: Signal,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The background poller could not be joined
    #[error("Poller task error: {0}")]
    Task(String),
}

impl ScrapeError {
    /// Create a new connect error
    pub fn connect_error(address: impl Into<String>, source: std::io::Error) -> Self {
        Self::Connect {
            address: address.into(),
            source,
        }
    }

    /// Create a new decode error
    pub fn decode_error(signal: Signal, source: serde_json::Error) -> Self {
        Self::Decode { signal, source }
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new task error
    pub fn task_error(msg: impl Into<String>) -> Self {
        Self::Task(msg.into())
    }

    /// Whether the failure happened on the connection itself.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::Write { .. } | Self::Read { .. }
        )
    }

    /// Whether the agent answered with something that could not be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
