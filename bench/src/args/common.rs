use super::defaults::*;
use crate::config::BenchmarkConfig;
use crate::error::BenchError;
use crate::tls::{ClientIdentity, ServerVerification, TlsSettings};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CosignBenchArgs {
    /// Client private key file (PEM)
    #[arg(long, short = 'k')]
    pub key_file: PathBuf,

    /// Client certificate file (PEM)
    #[arg(long, short = 'c')]
    pub cert_file: PathBuf,

    /// Number of commands each thread sends over its connection
    #[arg(long, short = 'i')]
    pub iterations: NonZeroU32,

    /// Number of concurrent connections
    #[arg(long, short = 't')]
    pub threads: NonZeroU32,

    /// Cosign server host
    #[arg(long, short = 'H', default_value_t = DEFAULT_HOSTNAME.to_owned())]
    pub hostname: String,

    /// Cosign server port
    #[arg(long, short = 'P', default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Command sent on every iteration
    #[arg(long, short = 'C', default_value_t = DEFAULT_COMMAND.to_owned())]
    pub command: String,

    /// Accept any server certificate
    #[arg(long, default_value_t = DEFAULT_SSL_SKIP_VERIFY)]
    pub ssl_skip_verify: bool,

    /// Name used for SNI and certificate verification (defaults to the hostname)
    #[arg(long)]
    pub server_name: Option<String>,

    /// Additional trusted CA certificates (PEM), on top of the bundled web roots
    #[arg(long)]
    pub ca_file: Option<PathBuf>,

    /// Deadline for every connect, read, write and handshake, e.g. 5s or 250ms
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Output directory path for storing the JSON report
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Identifier for the benchmark run (defaults to hostname if not provided)
    #[arg(long)]
    pub identifier: Option<String>,
}

impl CosignBenchArgs {
    pub fn validate(&self) {
        if let Some(conflict) = self.conflict() {
            CosignBenchArgs::command()
                .error(ErrorKind::ArgumentConflict, conflict)
                .exit();
        }
    }

    fn conflict(&self) -> Option<String> {
        if self.ssl_skip_verify && self.ca_file.is_some() {
            return Some("--ca-file cannot be used together with --ssl-skip-verify".to_owned());
        }
        if self.command.contains(['\r', '\n']) {
            return Some("--command must be a single line".to_owned());
        }
        if self.command.trim().is_empty() {
            return Some("--command cannot be empty".to_owned());
        }
        None
    }

    pub fn server_name(&self) -> &str {
        self.server_name.as_deref().unwrap_or(&self.hostname)
    }

    fn server_verification(&self) -> Result<ServerVerification, BenchError> {
        if self.ssl_skip_verify {
            return Ok(ServerVerification::Skip);
        }
        match &self.ca_file {
            Some(ca_file) => ServerVerification::load_ca(ca_file),
            None => Ok(ServerVerification::webpki_roots()),
        }
    }

    /// Loads the TLS material and turns the arguments into a runnable configuration.
    pub fn into_config(self) -> Result<BenchmarkConfig, BenchError> {
        let identity = ClientIdentity::load(&self.cert_file, &self.key_file)?;
        let tls = TlsSettings::new(
            Some(identity),
            self.server_verification()?,
            self.server_name(),
        )?;
        info!(
            "Using client certificate {} for {} (verify certificate: {})",
            self.cert_file.display(),
            tls.server_name_str(),
            tls.verify_certificate()
        );

        let mut config = BenchmarkConfig::new(
            self.threads,
            self.iterations,
            &self.hostname,
            self.port,
            Arc::new(tls),
        );
        config.command = self.command;
        config.timeout = self.timeout;
        config.output_dir = self.output_dir;
        config.identifier = self.identifier;
        Ok(config)
    }
}
