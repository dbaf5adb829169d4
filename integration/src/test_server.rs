use crate::certificates::TestCertificate;
use cosign_bench::protocol::{self, QUIT_REQUEST, STARTTLS_REQUEST};
use rustls::client::danger::HandshakeSignatureValid;
use rustls::crypto::{ring, verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, UnixTime};
use rustls::server::danger::{ClientCertVerified, ClientCertVerifier};
use rustls::{DigitallySignedStruct, DistinguishedName, ServerConfig, SignatureScheme};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tokio_rustls::TlsAcceptor;
use tracing::{debug, info};

pub const DEFAULT_BANNER: &str = "220 2 Collaborative Web Single Sign-On [COSIGNv3 FACTORS=5 REKEY]";
pub const DEFAULT_STARTTLS_ACK: &str = "220 Ready to start TLS";
pub const DEFAULT_COMMAND_RESPONSE: &str = "250 Cosign NOOP";

/// Lines a [`ScriptedServer`] answers with.
#[derive(Debug, Clone)]
pub struct ServerScript {
    pub banner: String,
    pub starttls_ack: String,
    pub post_handshake_line: String,
    /// Answers to commands, used in turn per connection.
    pub command_responses: Vec<String>,
    pub response_delay: Option<Duration>,
    /// Drop the connection right after acknowledging STARTTLS.
    pub hang_up_after_ack: bool,
}

impl Default for ServerScript {
    fn default() -> Self {
        Self {
            banner: DEFAULT_BANNER.to_owned(),
            starttls_ack: DEFAULT_STARTTLS_ACK.to_owned(),
            post_handshake_line: DEFAULT_BANNER.to_owned(),
            command_responses: vec![DEFAULT_COMMAND_RESPONSE.to_owned()],
            response_delay: None,
            hang_up_after_ack: false,
        }
    }
}

impl ServerScript {
    pub fn with_banner(mut self, banner: &str) -> Self {
        self.banner = banner.to_owned();
        self
    }

    pub fn with_starttls_ack(mut self, ack: &str) -> Self {
        self.starttls_ack = ack.to_owned();
        self
    }

    pub fn with_command_responses(mut self, responses: &[&str]) -> Self {
        self.command_responses = responses.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = Some(delay);
        self
    }

    pub fn hanging_up_after_ack(mut self) -> Self {
        self.hang_up_after_ack = true;
        self
    }
}

/// What the server saw from its clients.
#[derive(Debug, Clone, Default)]
pub struct Observations {
    pub connections: usize,
    pub starttls_requests: usize,
    pub handshakes: usize,
    pub commands: Vec<String>,
    pub quits: usize,
    pub server_names: Vec<Option<String>>,
    pub client_certificates: Vec<Option<CertificateDer<'static>>>,
}

/// Cosign-like daemon on a random loopback port. Speaks the plain-text banner and STARTTLS
/// exchange, upgrades to TLS while requesting (but not requiring) a client certificate, then
/// answers commands according to its [`ServerScript`].
pub struct ScriptedServer {
    port: u16,
    observations: Arc<Mutex<Observations>>,
    task: JoinHandle<()>,
}

impl ScriptedServer {
    pub async fn start(script: ServerScript, certificate: &TestCertificate) -> Self {
        let provider = Arc::new(ring::default_provider());
        let config = ServerConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .expect("Failed to select TLS versions")
            .with_client_cert_verifier(Arc::new(AcceptAnyClientCertificate(provider)))
            .with_single_cert(vec![certificate.cert_der().clone()], certificate.private_key())
            .expect("Failed to build server TLS config");
        let acceptor = TlsAcceptor::from(Arc::new(config));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let port = listener.local_addr().expect("Missing local address").port();
        info!("Scripted cosign server has started on port {port}");

        let observations = Arc::new(Mutex::new(Observations::default()));
        let script = Arc::new(script);
        let task = {
            let observations = observations.clone();
            tokio::spawn(async move {
                while let Ok((stream, address)) = listener.accept().await {
                    let acceptor = acceptor.clone();
                    let script = script.clone();
                    let observations = observations.clone();
                    tokio::spawn(async move {
                        if let Err(error) =
                            handle_connection(stream, acceptor, &script, &observations).await
                        {
                            debug!("Connection from {address} ended with error: {error}");
                        }
                    });
                }
            })
        };

        Self {
            port,
            observations,
            task,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn observations(&self) -> Observations {
        self.observations.lock().unwrap().clone()
    }

    /// Clients send QUIT after the last result is reported, so wait for the server side to
    /// catch up before asserting on it.
    pub async fn wait_for_quits(&self, expected: usize) -> Observations {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let observations = self.observations();
            if observations.quits >= expected || Instant::now() >= deadline {
                return observations;
            }
            sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle_connection(
    stream: TcpStream,
    acceptor: TlsAcceptor,
    script: &ServerScript,
    observations: &Mutex<Observations>,
) -> io::Result<()> {
    observations.lock().unwrap().connections += 1;
    let mut connection = BufReader::new(stream);
    protocol::write_line(&mut connection, &script.banner).await?;

    loop {
        let line = protocol::read_line(&mut connection).await?;
        match protocol::trim_line(&line) {
            "" => return Ok(()),
            STARTTLS_REQUEST => {
                observations.lock().unwrap().starttls_requests += 1;
                protocol::write_line(&mut connection, &script.starttls_ack).await?;
                if protocol::is_ready(&script.starttls_ack) {
                    break;
                }
            }
            QUIT_REQUEST => {
                observations.lock().unwrap().quits += 1;
                return Ok(());
            }
            _ => protocol::write_line(&mut connection, "530 Must issue a STARTTLS command first")
                .await?,
        }
    }

    if script.hang_up_after_ack {
        return Ok(());
    }

    let stream = acceptor.accept(connection.into_inner()).await?;
    {
        let (_, session) = stream.get_ref();
        let mut observations = observations.lock().unwrap();
        observations.handshakes += 1;
        observations
            .server_names
            .push(session.server_name().map(str::to_owned));
        observations.client_certificates.push(
            session
                .peer_certificates()
                .and_then(|certificates| certificates.first())
                .map(|certificate| certificate.clone().into_owned()),
        );
    }

    let mut connection = BufReader::new(stream);
    protocol::write_line(&mut connection, &script.post_handshake_line).await?;

    let mut served = 0;
    loop {
        let line = protocol::read_line(&mut connection).await?;
        let line = protocol::trim_line(&line);
        if line.is_empty() {
            return Ok(());
        }
        if line == QUIT_REQUEST {
            observations.lock().unwrap().quits += 1;
            return Ok(());
        }
        observations.lock().unwrap().commands.push(line.to_owned());
        if let Some(delay) = script.response_delay {
            sleep(delay).await;
        }
        let response = &script.command_responses[served % script.command_responses.len()];
        served += 1;
        protocol::write_line(&mut connection, response).await?;
    }
}

#[derive(Debug)]
struct AcceptAnyClientCertificate(Arc<CryptoProvider>);

impl ClientCertVerifier for AcceptAnyClientCertificate {
    fn offer_client_auth(&self) -> bool {
        true
    }

    fn client_auth_mandatory(&self) -> bool {
        false
    }

    fn root_hint_subjects(&self) -> &[DistinguishedName] {
        &[]
    }

    fn verify_client_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _now: UnixTime,
    ) -> Result<ClientCertVerified, rustls::Error> {
        Ok(ClientCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
