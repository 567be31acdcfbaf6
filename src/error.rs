//! Gateway error types and the error-status translator.
//!
//! [`GatewayError`] is the central error type for the gateway. Every
//! variant belongs to exactly one [`ErrorClass`], so callers can branch on
//! "was this my configuration, the network, or the remote service?" without
//! matching individual variants.
//!
//! # Error Classes
//!
//! | Class              | Raised                         | Variants                                   |
//! |--------------------|--------------------------------|--------------------------------------------|
//! | Configuration      | before any network I/O         | `MissingParameter`, `UnconfiguredRegion`, `CertificateNotFound`, ... |
//! | Transport          | during the exchange            | `Transport`, `Timeout`, `UnexpectedStatus` |
//! | Domain             | 4xx reply with an error body   | `Domain`                                   |
//! | Malformed payload  | 2xx reply that does not decode | `MalformedPayload`                         |

use std::fmt;

use crate::codec::{self, Field, Record, Schema};
use crate::domain::{DataCenter, Thumbprint};

/// Structured error decoded from an error-status reply.
///
/// Mirrors the service's `<Error>` payload and carries the HTTP status of
/// the reply it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainError {
    /// HTTP status code of the reply.
    pub status: u16,
    /// Error type reported by the service, if any.
    pub kind: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Service error code (e.g. `"ResourceNotFound"` or `"404"`).
    pub code: Option<String>,
    /// Name of the offending parameter, if the service reported one.
    pub param: Option<String>,
}

impl DomainError {
    /// Returns `true` when the reply was `404 Not Found`.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Returns `true` when the service reported the given error code.
    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {}", self.message, self.status)?;
        if let Some(code) = &self.code {
            write!(f, ", code {code}")?;
        }
        if let Some(param) = &self.param {
            write!(f, ", param {param}")?;
        }
        write!(f, ")")
    }
}

/// Broad category of a [`GatewayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Raised before any network I/O; fatal for the call.
    Configuration,
    /// Network, TLS, timeout, or non-client-error status.
    Transport,
    /// The service rejected the request with a structured error.
    Domain,
    /// A successful reply whose body does not match the expected shape.
    MalformedPayload,
}

/// Gateway error enum.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A route placeholder has no value on the request.
    #[error("missing path parameter: {name}")]
    MissingParameter {
        /// Placeholder name as written in the route template.
        name: String,
    },

    /// The route template itself is malformed.
    #[error("invalid route template {template:?}: {reason}")]
    InvalidRoute {
        /// Offending template.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The request targets a region with no configured endpoint.
    #[error("no endpoint configured for region {0}")]
    UnconfiguredRegion(DataCenter),

    /// No certificate in the store matches the thumbprint.
    #[error("no certificate found with thumbprint {thumbprint}")]
    CertificateNotFound {
        /// Thumbprint that was searched for.
        thumbprint: Thumbprint,
    },

    /// The configured thumbprint is not a hex digest.
    #[error("invalid certificate thumbprint: {0}")]
    InvalidThumbprint(String),

    /// A certificate could not be parsed or has no private key.
    #[error("invalid client certificate: {0}")]
    InvalidCertificate(String),

    /// The certificate store could not be opened or read.
    #[error("certificate store error: {0}")]
    CertificateStore(String),

    /// Invalid or missing configuration value.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request value could not be encoded against its schema.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Connection, TLS, or protocol failure reported by the HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The exchange did not complete within the configured timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The service answered with a status that is neither success nor a
    /// client error.
    #[error("unexpected status {status}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Raw reply body.
        body: String,
    },

    /// The service rejected the request.
    #[error("service error: {0}")]
    Domain(DomainError),

    /// A successful reply whose body does not match the expected shape.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl GatewayError {
    /// Returns the [`ErrorClass`] of this variant.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::MissingParameter { .. }
            | Self::InvalidRoute { .. }
            | Self::UnconfiguredRegion(_)
            | Self::CertificateNotFound { .. }
            | Self::InvalidThumbprint(_)
            | Self::InvalidCertificate(_)
            | Self::CertificateStore(_)
            | Self::Configuration(_)
            | Self::Encoding(_) => ErrorClass::Configuration,
            Self::Transport(_) | Self::Timeout { .. } | Self::UnexpectedStatus { .. } => {
                ErrorClass::Transport
            }
            Self::Domain(_) => ErrorClass::Domain,
            Self::MalformedPayload(_) => ErrorClass::MalformedPayload,
        }
    }

    /// Returns the HTTP status of the reply this error came from, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Domain(err) => Some(err.status),
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns the structured service error, if this is a domain error.
    #[must_use]
    pub const fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` for a `404 Not Found` domain error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        match self {
            Self::Domain(err) => err.is_not_found(),
            _ => false,
        }
    }

    pub(crate) fn malformed(reason: impl fmt::Display) -> Self {
        Self::MalformedPayload(reason.to_string())
    }
}

/// Outcome of a fetch where "does not exist" is an expected answer.
///
/// Returned by [`crate::service::Gateway::lookup`]; every failure other
/// than `404` stays in the `Err` arm of the surrounding `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The resource exists.
    Found(T),
    /// The service answered `404`.
    NotFound(DomainError),
}

impl<T> Lookup<T> {
    /// Converts into an `Option`, discarding the not-found details.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound(_) => None,
        }
    }

    /// Returns `true` for [`Lookup::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

static ERROR: Schema = Schema {
    root: "Error",
    namespace: None,
    fields: &[
        Field::optional("Type"),
        Field::optional("Message"),
        Field::optional("Code"),
        Field::optional("Param"),
    ],
};

static ERROR_ENVELOPE: Schema = Schema {
    root: "AzureErrors",
    namespace: None,
    fields: &[Field::nested("Error", &ERROR)],
};

/// Translates an error-status reply into a [`DomainError`].
///
/// Accepts both a bare `<Error>` document and the `<AzureErrors>`
/// envelope. A body that decodes as neither still produces a
/// `DomainError` carrying the status, with the raw text as its message.
#[must_use]
pub fn translate(status: u16, body: &[u8]) -> DomainError {
    let record = codec::decode(body, &ERROR).or_else(|_| {
        codec::decode(body, &ERROR_ENVELOPE).and_then(|envelope| envelope.record("Error").cloned())
    });

    match record {
        Ok(record) => from_record(status, &record),
        Err(err) => {
            tracing::debug!(status, error = %err, "error body did not decode");
            DomainError {
                status,
                kind: None,
                message: String::from_utf8_lossy(body).trim().to_string(),
                code: None,
                param: None,
            }
        }
    }
}

fn from_record(status: u16, record: &Record) -> DomainError {
    let text = |name: &str| record.text(name).map(str::to_string);
    DomainError {
        status,
        kind: text("Type"),
        message: text("Message").unwrap_or_default(),
        code: text("Code"),
        param: text("Param"),
    }
}
