//! Transport: a single HTTP exchange per call.
//!
//! [`Transport`] is the seam between the gateway and the network. The
//! production implementation is [`HttpsTransport`]; tests substitute a
//! recording fake.

pub mod exchange;
pub mod https;

use std::future::Future;

pub use exchange::{Exchange, RawReply};
pub use https::{API_VERSION, API_VERSION_HEADER, HttpsTransport, REQUEST_ID_HEADER};

use crate::error::GatewayError;

/// Performs one HTTP exchange.
///
/// Any HTTP status is an `Ok` reply; `Err` is reserved for failures to
/// complete the exchange at all.
pub trait Transport: Send + Sync {
    /// Sends `exchange` and returns the reply.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] on connection or TLS failure and
    /// [`GatewayError::Timeout`] when the exchange exceeds its timeout.
    fn send(&self, exchange: Exchange) -> impl Future<Output = Result<RawReply, GatewayError>> + Send;
}
