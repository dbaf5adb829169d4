use rcgen::CertifiedKey;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use std::path::{Path, PathBuf};

/// Self-signed certificate and key pair generated for a test run.
pub struct TestCertificate {
    cert_pem: String,
    key_pem: String,
    cert_der: CertificateDer<'static>,
    key_der: Vec<u8>,
}

impl TestCertificate {
    pub fn self_signed(names: &[&str]) -> Self {
        let names = names.iter().map(|name| name.to_string()).collect::<Vec<_>>();
        let CertifiedKey { cert, key_pair } =
            rcgen::generate_simple_self_signed(names).expect("Failed to generate certificate");
        Self {
            cert_pem: cert.pem(),
            key_pem: key_pair.serialize_pem(),
            cert_der: cert.der().clone(),
            key_der: key_pair.serialize_der(),
        }
    }

    pub fn localhost() -> Self {
        Self::self_signed(&["localhost", "127.0.0.1"])
    }

    pub fn cert_pem(&self) -> &str {
        &self.cert_pem
    }

    pub fn key_pem(&self) -> &str {
        &self.key_pem
    }

    pub fn cert_der(&self) -> &CertificateDer<'static> {
        &self.cert_der
    }

    pub fn private_key(&self) -> PrivateKeyDer<'static> {
        PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.key_der.clone()))
    }

    /// Writes `<name>.pem` and `<name>.key` into `dir` and returns their paths.
    pub fn write_to(&self, dir: &Path, name: &str) -> (PathBuf, PathBuf) {
        let cert_file = dir.join(format!("{name}.pem"));
        let key_file = dir.join(format!("{name}.key"));
        std::fs::write(&cert_file, &self.cert_pem).expect("Failed to write certificate");
        std::fs::write(&key_file, &self.key_pem).expect("Failed to write private key");
        (cert_file, key_file)
    }
}
