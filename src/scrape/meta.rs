//! One-shot retrieval of the diagnosed process's static metadata.

use crate::error::Result;
use crate::scrape::data::{Meta, Signal};
use crate::scrape::traits::Transport;
use crate::scrape::transport::{request_json, TransportClient};
use tracing::{error, info};

/// Fetch metadata from the agent at `address` over TCP.
pub async fn fetch_meta(address: &str) -> Result<Meta> {
    fetch_meta_with(&TransportClient::new(address)).await
}

/// Fetch metadata through an arbitrary transport.
///
/// Exactly one request is issued. Any failure is returned as-is; callers
/// treat it as fatal for the session.
pub async fn fetch_meta_with<T: Transport>(transport: &T) -> Result<Meta> {
    match request_json::<_, Meta>(transport, Signal::MetaRequest).await {
        Ok(meta) => {
            info!(
                target_addr = transport.target(),
                pid = meta.pid,
                name = %meta.name,
                "fetched process metadata"
            );
            Ok(meta)
        }
        Err(err) => {
            error!(target_addr = transport.target(), error = %err, "failed to fetch metadata");
            Err(err)
        }
    }
}
