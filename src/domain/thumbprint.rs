//! Certificate thumbprint newtype.
//!
//! [`Thumbprint`] is the credential reference the gateway is configured
//! with. Thumbprints copied from certificate tooling often carry spaces,
//! colons, or a leading invisible mark, so input is normalized to bare
//! upper-case hex before comparison.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Normalized hex digest identifying a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Thumbprint(String);

impl Thumbprint {
    /// Parses and normalizes a thumbprint.
    ///
    /// Whitespace, `:` separators and non-ASCII marks are dropped; the
    /// remainder must be non-empty hex.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidThumbprint`] if nothing is left after
    /// normalization or a non-hex character remains.
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        let normalized: String = raw
            .chars()
            .filter(|c| c.is_ascii() && !c.is_ascii_whitespace() && *c != ':')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if normalized.is_empty() {
            return Err(GatewayError::InvalidThumbprint(
                "thumbprint is empty".to_string(),
            ));
        }
        if let Some(bad) = normalized.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(GatewayError::InvalidThumbprint(format!(
                "unexpected character {bad:?} in {raw:?}"
            )));
        }
        Ok(Self(normalized))
    }

    /// Builds a thumbprint from a raw digest.
    #[must_use]
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode_upper(digest))
    }

    /// Returns the normalized hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Thumbprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Thumbprint {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Thumbprint {
    type Error = GatewayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Thumbprint> for String {
    fn from(thumbprint: Thumbprint) -> Self {
        thumbprint.0
    }
}
