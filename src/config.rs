//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).
//!
//! | Variable                   | Default                                    |
//! |----------------------------|--------------------------------------------|
//! | `SQLMGMT_CERT_THUMBPRINT`  | required                                   |
//! | `SQLMGMT_CERT_STORE_DIR`   | `certs`                                    |
//! | `SQLMGMT_TIMEOUT_SECS`     | `60`                                       |
//! | `SQLMGMT_USER_AGENT`       | `sqlmgmt-gateway/<crate version>`          |
//! | `SQLMGMT_MANAGEMENT_URL`   | `https://management.core.windows.net:8443` |

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::Thumbprint;
use crate::error::GatewayError;
use crate::routing::MANAGEMENT_URL;

/// Variable holding the client certificate thumbprint.
pub const THUMBPRINT_VAR: &str = "SQLMGMT_CERT_THUMBPRINT";

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`], or built in code
/// with [`GatewayConfig::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Thumbprint of the client certificate presented on every call.
    pub thumbprint: Thumbprint,

    /// Directory of PEM bundles searched for the certificate.
    pub cert_store_dir: PathBuf,

    /// Upper bound on each exchange.
    pub timeout: Duration,

    /// `User-Agent` header value.
    pub user_agent: String,

    /// Base URL of the management API.
    pub management_url: String,
}

impl GatewayConfig {
    /// Creates a configuration with default settings for `thumbprint`.
    #[must_use]
    pub fn new(thumbprint: Thumbprint) -> Self {
        Self {
            thumbprint,
            cert_store_dir: PathBuf::from("certs"),
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
            management_url: MANAGEMENT_URL.to_string(),
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    /// Unset or unparseable optional values fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the thumbprint variable is
    /// unset, or [`GatewayError::InvalidThumbprint`] if it is not hex.
    pub fn from_env() -> Result<Self, GatewayError> {
        dotenvy::dotenv().ok();

        let raw = std::env::var(THUMBPRINT_VAR)
            .map_err(|_| GatewayError::Configuration(format!("{THUMBPRINT_VAR} is not set")))?;
        let thumbprint = Thumbprint::parse(&raw)?;

        let defaults = Self::new(thumbprint);
        Ok(Self {
            cert_store_dir: std::env::var("SQLMGMT_CERT_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| defaults.cert_store_dir.clone()),
            timeout: Duration::from_secs(parse_env(
                "SQLMGMT_TIMEOUT_SECS",
                DEFAULT_TIMEOUT.as_secs(),
            )),
            user_agent: std::env::var("SQLMGMT_USER_AGENT")
                .unwrap_or_else(|_| defaults.user_agent.clone()),
            management_url: std::env::var("SQLMGMT_MANAGEMENT_URL")
                .unwrap_or_else(|_| defaults.management_url.clone()),
            ..defaults
        })
    }

    /// Overrides the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `sqlmgmt-gateway/<crate version>`.
#[must_use]
pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
