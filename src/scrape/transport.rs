//! TCP transport for the agent's one-byte signal protocol.
//!
//! Every request dials a fresh connection, writes the signal byte and reads
//! until the agent closes its side. There is no length prefix: end of message
//! is end of connection.

use crate::error::{Result, ScrapeError};
use crate::scrape::data::Signal;
use crate::scrape::traits::Transport;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Dials the agent once per request.
#[derive(Debug, Clone)]
pub struct TransportClient {
    address: String,
}

impl TransportClient {
    /// Create a client for the agent at `address` (`host:port`).
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Transport for TransportClient {
    async fn request(&self, signal: Signal) -> Result<Vec<u8>> {
        let mut stream = TcpStream::connect(self.address.as_str())
            .await
            .map_err(|e| ScrapeError::connect_error(&self.address, e))?;

        // `stream` is dropped on every return path below, closing the connection.
        stream
            .write_all(&[signal.as_byte()])
            .await
            .map_err(|source| ScrapeError::Write { source })?;

        let mut response = Vec::new();
        stream
            .read_to_end(&mut response)
            .await
            .map_err(|source| ScrapeError::Read { source })?;

        debug!(
            address = %self.address,
            %signal,
            bytes = response.len(),
            "received agent response"
        );
        Ok(response)
    }

    fn target(&self) -> &str {
        &self.address
    }
}

/// Send `signal`, read the whole response and decode it as JSON.
///
/// Shared by the one-shot meta fetch and the repeating stats poll.
pub async fn request_json<T, D>(transport: &T, signal: Signal) -> Result<D>
where
    T: Transport,
    D: DeserializeOwned,
{
    let body = transport.request(signal).await?;
    serde_json::from_slice(&body).map_err(|e| ScrapeError::decode_error(signal, e))
}
