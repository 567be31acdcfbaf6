//! Client-certificate resolution.
//!
//! The gateway never caches a certificate: each call opens a store
//! session, finds the certificate by thumbprint, and releases the session.

pub mod certificate;
pub mod directory;
pub mod memory;
pub mod store;

pub use certificate::ClientCertificate;
pub use directory::PemDirectoryStore;
pub use memory::MemoryStore;
pub use store::{CertificateStore, CredentialProvider, StoreSession};
