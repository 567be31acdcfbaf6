//! Certificate stores and the per-call credential provider.
//!
//! A [`CertificateStore`] hands out read-only [`StoreSession`]s. A session
//! is a snapshot of the store's certificates in enumeration order and is
//! released when dropped, so every exit path of a lookup closes it.

use std::fmt;
use std::sync::Arc;

use super::certificate::ClientCertificate;
use crate::domain::Thumbprint;
use crate::error::GatewayError;

/// Source of client certificates.
pub trait CertificateStore: fmt::Debug + Send + Sync {
    /// Opens a read-only session.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::CertificateStore`] if the store cannot be
    /// opened.
    fn open(&self) -> Result<Box<dyn StoreSession + '_>, GatewayError>;
}

/// An open, read-only view of a store. Dropping it releases the session.
pub trait StoreSession: fmt::Debug {
    /// Certificates in enumeration order.
    fn certificates(&self) -> &[ClientCertificate];

    /// All certificates whose thumbprint equals `thumbprint`, in
    /// enumeration order.
    fn find_by_thumbprint(&self, thumbprint: &Thumbprint) -> Vec<&ClientCertificate> {
        self.certificates()
            .iter()
            .filter(|cert| cert.thumbprint() == thumbprint)
            .collect()
    }
}

/// Resolves a thumbprint to a certificate on every call.
#[derive(Debug, Clone)]
pub struct CredentialProvider {
    store: Arc<dyn CertificateStore>,
}

impl CredentialProvider {
    /// Creates a provider over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CertificateStore>) -> Self {
        Self { store }
    }

    /// [`CredentialProvider::resolve`] on tokio's blocking pool, so store
    /// I/O never stalls an async worker. The caller's span is carried over.
    ///
    /// # Errors
    ///
    /// As [`CredentialProvider::resolve`]; a lookup task that panics or is
    /// cancelled surfaces as [`GatewayError::CertificateStore`].
    pub async fn resolve_async(
        &self,
        thumbprint: &Thumbprint,
    ) -> Result<ClientCertificate, GatewayError> {
        let provider = self.clone();
        let thumbprint = thumbprint.clone();
        let span = tracing::Span::current();
        tokio::task::spawn_blocking(move || span.in_scope(|| provider.resolve(&thumbprint)))
            .await
            .map_err(|e| {
                GatewayError::CertificateStore(format!("certificate lookup failed: {e}"))
            })?
    }

    /// Looks up the certificate for `thumbprint`.
    ///
    /// Several matches resolve to the first one in enumeration order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::CertificateNotFound`] if nothing matches, or
    /// the store's error if it cannot be opened.
    pub fn resolve(&self, thumbprint: &Thumbprint) -> Result<ClientCertificate, GatewayError> {
        let session = self.store.open()?;
        let matches = session.find_by_thumbprint(thumbprint);

        let Some(first) = matches.first() else {
            tracing::debug!(%thumbprint, "no matching certificate");
            return Err(GatewayError::CertificateNotFound {
                thumbprint: thumbprint.clone(),
            });
        };
        if matches.len() > 1 {
            tracing::warn!(
                %thumbprint,
                matches = matches.len(),
                "thumbprint matches several certificates, using the first"
            );
        }
        Ok((*first).clone())
    }
}
