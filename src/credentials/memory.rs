//! In-process certificate store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::certificate::ClientCertificate;
use super::store::{CertificateStore, StoreSession};
use crate::error::GatewayError;

/// A fixed list of certificates with session accounting.
#[derive(Debug, Default)]
pub struct MemoryStore {
    certificates: Vec<ClientCertificate>,
    opened: AtomicUsize,
    active: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Creates a store over `certificates`, enumerated in the given order.
    #[must_use]
    pub fn new(certificates: Vec<ClientCertificate>) -> Self {
        Self {
            certificates,
            ..Self::default()
        }
    }

    /// Total sessions opened so far.
    #[must_use]
    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Sessions currently open.
    #[must_use]
    pub fn sessions_active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl CertificateStore for MemoryStore {
    fn open(&self) -> Result<Box<dyn StoreSession + '_>, GatewayError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            certificates: &self.certificates,
            active: Arc::clone(&self.active),
        }))
    }
}

#[derive(Debug)]
struct MemorySession<'a> {
    certificates: &'a [ClientCertificate],
    active: Arc<AtomicUsize>,
}

impl StoreSession for MemorySession<'_> {
    fn certificates(&self) -> &[ClientCertificate] {
        self.certificates
    }
}

impl Drop for MemorySession<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}
