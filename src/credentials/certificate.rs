//! Client certificates loaded from PEM.

use std::fmt;
use std::io::BufReader;

use rustls_pemfile::Item;
use sha1::{Digest, Sha1};

use crate::domain::Thumbprint;
use crate::error::GatewayError;

/// A client certificate together with its private key.
///
/// The thumbprint is the upper-case SHA-1 digest of the leaf certificate's
/// DER encoding, the same value certificate tooling displays.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCertificate {
    thumbprint: Thumbprint,
    chain_len: usize,
    pem: Vec<u8>,
}

impl ClientCertificate {
    /// Parses a PEM bundle holding a certificate chain (leaf first) and one
    /// private key.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidCertificate`] if the bundle cannot be
    /// read or lacks a certificate or a private key.
    pub fn from_pem(pem: &[u8]) -> Result<Self, GatewayError> {
        let mut reader = BufReader::new(pem);
        let mut leaf: Option<Vec<u8>> = None;
        let mut chain_len = 0_usize;
        let mut has_key = false;

        for item in rustls_pemfile::read_all(&mut reader) {
            let item = item.map_err(|e| GatewayError::InvalidCertificate(e.to_string()))?;
            match item {
                Item::X509Certificate(der) => {
                    chain_len += 1;
                    if leaf.is_none() {
                        leaf = Some(der.as_ref().to_vec());
                    }
                }
                Item::Pkcs1Key(_) | Item::Pkcs8Key(_) | Item::Sec1Key(_) => has_key = true,
                _ => {}
            }
        }

        let Some(leaf) = leaf else {
            return Err(GatewayError::InvalidCertificate(
                "no certificate in PEM".to_string(),
            ));
        };
        if !has_key {
            return Err(GatewayError::InvalidCertificate(
                "no private key in PEM".to_string(),
            ));
        }

        Ok(Self {
            thumbprint: Thumbprint::from_digest(Sha1::digest(&leaf).as_slice()),
            chain_len,
            pem: pem.to_vec(),
        })
    }

    /// SHA-1 thumbprint of the leaf certificate.
    #[must_use]
    pub const fn thumbprint(&self) -> &Thumbprint {
        &self.thumbprint
    }

    /// Number of certificates in the bundle.
    #[must_use]
    pub const fn chain_len(&self) -> usize {
        self.chain_len
    }

    /// Builds the TLS client identity.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if the TLS backend rejects the
    /// key material.
    pub fn identity(&self) -> Result<reqwest::Identity, GatewayError> {
        Ok(reqwest::Identity::from_pem(&self.pem)?)
    }
}

// Key material stays out of logs.
impl fmt::Debug for ClientCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCertificate")
            .field("thumbprint", &self.thumbprint)
            .field("chain_len", &self.chain_len)
            .finish_non_exhaustive()
    }
}
