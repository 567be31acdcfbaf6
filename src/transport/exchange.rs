//! One request/reply pair as seen by a [`super::Transport`].

use std::time::Duration;

use uuid::Uuid;

use crate::credentials::ClientCertificate;
use crate::domain::Verb;

/// Everything needed to perform one HTTP exchange.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Absolute request URL.
    pub url: String,
    /// HTTP verb.
    pub verb: Verb,
    /// Encoded request body; `None` sends no body at all.
    pub body: Option<Vec<u8>>,
    /// Client certificate presented during the TLS handshake.
    pub certificate: ClientCertificate,
    /// Upper bound on the whole exchange.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Correlation id sent as `x-ms-client-request-id`.
    pub request_id: Uuid,
}

impl Exchange {
    /// Creates an exchange with a fresh correlation id.
    #[must_use]
    pub fn new(
        url: String,
        verb: Verb,
        certificate: ClientCertificate,
        timeout: Duration,
        user_agent: String,
    ) -> Self {
        Self {
            url,
            verb,
            body: None,
            certificate,
            timeout,
            user_agent,
            request_id: Uuid::new_v4(),
        }
    }

    /// Attaches a body.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status and body of a completed exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    /// HTTP status code.
    pub status: u16,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl RawReply {
    /// Returns `true` for 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns `true` for 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Body as lossy UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
