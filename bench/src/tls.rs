use crate::error::BenchError;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{ring, verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, Error, RootCertStore, SignatureScheme};
use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::TlsConnector;

/// Client certificate chain and private key presented during the handshake.
pub struct ClientIdentity {
    certificates: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

impl ClientIdentity {
    pub fn load(cert_file: &Path, key_file: &Path) -> Result<Self, BenchError> {
        let cert_pem = read_file(cert_file)?;
        let key_pem = read_file(key_file)?;
        let certificates = parse_certificates(&cert_pem, &cert_file.display().to_string())?;
        let key = parse_private_key(&key_pem, &key_file.display().to_string())?;
        Ok(Self { certificates, key })
    }

    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self, BenchError> {
        let certificates = parse_certificates(cert_pem, "certificate PEM")?;
        let key = parse_private_key(key_pem, "private key PEM")?;
        Ok(Self { certificates, key })
    }
}

pub enum ServerVerification {
    WebPki(RootCertStore),
    Skip,
}

impl ServerVerification {
    pub fn webpki_roots() -> Self {
        ServerVerification::WebPki(default_roots())
    }

    /// Trusts the certificates of `ca_pem` on top of the bundled web PKI roots.
    pub fn with_ca_pem(ca_pem: &[u8]) -> Result<Self, BenchError> {
        let mut roots = default_roots();
        for certificate in parse_certificates(ca_pem, "CA PEM")? {
            roots.add(certificate)?;
        }
        Ok(ServerVerification::WebPki(roots))
    }

    pub fn load_ca(ca_file: &Path) -> Result<Self, BenchError> {
        Self::with_ca_pem(&read_file(ca_file)?)
    }
}

/// Read-only TLS client configuration shared by every session of a benchmark run.
pub struct TlsSettings {
    connector: TlsConnector,
    server_name: ServerName<'static>,
    server_name_text: String,
    verify_certificate: bool,
    client_authentication: bool,
}

impl TlsSettings {
    pub fn new(
        identity: Option<ClientIdentity>,
        verification: ServerVerification,
        server_name: &str,
    ) -> Result<Self, BenchError> {
        let server_name_text = server_name.to_owned();
        let server_name = ServerName::try_from(server_name_text.clone())
            .map_err(|_| BenchError::InvalidServerName(server_name_text.clone()))?;

        let provider = Arc::new(ring::default_provider());
        let builder = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()?;
        let verify_certificate = matches!(verification, ServerVerification::WebPki(_));
        let builder = match verification {
            ServerVerification::WebPki(roots) => builder.with_root_certificates(roots),
            ServerVerification::Skip => builder
                .dangerous()
                .with_custom_certificate_verifier(SkipServerVerification::new(provider)),
        };

        let client_authentication = identity.is_some();
        let config = match identity {
            Some(identity) => builder.with_client_auth_cert(identity.certificates, identity.key)?,
            None => builder.with_no_client_auth(),
        };

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            server_name,
            server_name_text,
            verify_certificate,
            client_authentication,
        })
    }

    pub fn connector(&self) -> &TlsConnector {
        &self.connector
    }

    pub fn server_name(&self) -> &ServerName<'static> {
        &self.server_name
    }

    pub fn server_name_str(&self) -> &str {
        &self.server_name_text
    }

    pub fn verify_certificate(&self) -> bool {
        self.verify_certificate
    }

    pub fn client_authentication(&self) -> bool {
        self.client_authentication
    }
}

impl Debug for TlsSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsSettings")
            .field("server_name", &self.server_name_text)
            .field("verify_certificate", &self.verify_certificate)
            .field("client_authentication", &self.client_authentication)
            .finish()
    }
}

fn default_roots() -> RootCertStore {
    RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, BenchError> {
    std::fs::read(path).map_err(|source| BenchError::CannotReadFile {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_certificates(pem: &[u8], origin: &str) -> Result<Vec<CertificateDer<'static>>, BenchError> {
    let mut reader = pem;
    let certificates = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(BenchError::InvalidPem)?;
    if certificates.is_empty() {
        return Err(BenchError::MissingCertificate(origin.to_owned()));
    }
    Ok(certificates)
}

fn parse_private_key(pem: &[u8], origin: &str) -> Result<PrivateKeyDer<'static>, BenchError> {
    let mut reader = pem;
    rustls_pemfile::private_key(&mut reader)
        .map_err(BenchError::InvalidPem)?
        .ok_or_else(|| BenchError::MissingPrivateKey(origin.to_owned()))
}

#[derive(Debug)]
struct SkipServerVerification(Arc<CryptoProvider>);

impl SkipServerVerification {
    fn new(provider: Arc<CryptoProvider>) -> Arc<Self> {
        Arc::new(Self(provider))
    }
}

impl ServerCertVerifier for SkipServerVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
