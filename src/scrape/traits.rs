//! Traits for talking to a diagnostics agent.

use crate::error::Result;
use crate::scrape::data::Signal;

/// A request/response channel to one agent.
///
/// Each call is a single best-effort exchange: send `signal`, return the
/// complete response body. Implementations must not retry, and must not keep
/// a connection open between calls.
pub trait Transport: Send + Sync {
    /// Perform one exchange with the agent.
    fn request(
        &self,
        signal: Signal,
    ) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    /// Human-readable target, used in log fields.
    fn target(&self) -> &str;
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn request(
        &self,
        signal: Signal,
    ) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send {
        (**self).request(signal)
    }

    fn target(&self) -> &str {
        (**self).target()
    }
}
