//! Certificate store backed by a directory of PEM bundles.

use std::fs;
use std::path::{Path, PathBuf};

use super::certificate::ClientCertificate;
use super::store::{CertificateStore, StoreSession};
use crate::error::GatewayError;

/// Reads every `*.pem` file of a directory, in file-name order.
///
/// Each file holds a certificate chain and its private key. Files that do
/// not parse are skipped with a warning. Reads are blocking; the gateway
/// opens sessions through [`super::CredentialProvider::resolve_async`].
#[derive(Debug, Clone)]
pub struct PemDirectoryStore {
    dir: PathBuf,
}

impl PemDirectoryStore {
    /// Creates a store over `dir`. Nothing is read until a session opens.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the store reads from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load(&self) -> Result<Vec<ClientCertificate>, GatewayError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            GatewayError::CertificateStore(format!("{}: {e}", self.dir.display()))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "pem"))
            .collect();
        paths.sort();

        let mut certificates = Vec::with_capacity(paths.len());
        for path in paths {
            let parsed = fs::read(&path)
                .map_err(|e| GatewayError::CertificateStore(e.to_string()))
                .and_then(|bytes| ClientCertificate::from_pem(&bytes));
            match parsed {
                Ok(cert) => certificates.push(cert),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping certificate file");
                }
            }
        }
        Ok(certificates)
    }
}

impl CertificateStore for PemDirectoryStore {
    fn open(&self) -> Result<Box<dyn StoreSession + '_>, GatewayError> {
        let certificates = self.load()?;
        tracing::debug!(dir = %self.dir.display(), count = certificates.len(), "certificate store opened");
        Ok(Box::new(DirectorySession { certificates }))
    }
}

#[derive(Debug)]
struct DirectorySession {
    certificates: Vec<ClientCertificate>,
}

impl StoreSession for DirectorySession {
    fn certificates(&self) -> &[ClientCertificate] {
        &self.certificates
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::credentials::CredentialProvider;
    use crate::credentials::certificate::tests::{
        CLIENT_PEM, CLIENT_THUMBPRINT, SECONDARY_PEM, SECONDARY_THUMBPRINT,
    };
    use crate::domain::Thumbprint;

    fn store_dir() -> tempfile::TempDir {
        match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => panic!("tempdir: {err}"),
        }
    }

    fn write(dir: &Path, name: &str, bytes: &[u8]) {
        if let Err(err) = fs::write(dir.join(name), bytes) {
            panic!("write {name}: {err}");
        }
    }

    #[test]
    fn enumerates_pem_files_in_name_order() {
        let dir = store_dir();
        write(dir.path(), "b-client.pem", CLIENT_PEM);
        write(dir.path(), "a-secondary.pem", SECONDARY_PEM);
        write(dir.path(), "notes.txt", b"ignored");

        let store = PemDirectoryStore::new(dir.path());
        let Ok(session) = store.open() else {
            panic!("store should open");
        };
        let thumbprints: Vec<&str> = session
            .certificates()
            .iter()
            .map(|c| c.thumbprint().as_str())
            .collect();
        assert_eq!(thumbprints, vec![SECONDARY_THUMBPRINT, CLIENT_THUMBPRINT]);
    }

    #[test]
    fn unreadable_bundles_are_skipped() {
        let dir = store_dir();
        write(dir.path(), "broken.pem", b"-----BEGIN CERTIFICATE-----\nnope\n");
        write(dir.path(), "client.pem", CLIENT_PEM);

        let provider = CredentialProvider::new(Arc::new(PemDirectoryStore::new(dir.path())));
        let Ok(thumbprint) = Thumbprint::parse(CLIENT_THUMBPRINT) else {
            panic!("valid thumbprint");
        };
        assert!(provider.resolve(&thumbprint).is_ok());
    }

    #[test]
    fn missing_directory_is_a_store_error() {
        let dir = store_dir();
        let store = PemDirectoryStore::new(dir.path().join("absent"));
        assert!(matches!(
            store.open(),
            Err(GatewayError::CertificateStore(_))
        ));
    }
}
