use crate::tls::TlsSettings;
use std::sync::Arc;
use std::time::Duration;

/// One unit of work for a worker: connect, upgrade to TLS, issue `iterations` commands and
/// disconnect. Cloning a job shares its TLS settings.
#[derive(Debug, Clone)]
pub struct Job {
    pub host: String,
    pub port: u16,
    pub command: Arc<str>,
    pub iterations: u32,
    pub tls: Arc<TlsSettings>,
    pub timeout: Option<Duration>,
}

impl Job {
    pub fn server_address(&self) -> String {
        format_address(&self.host, self.port)
    }
}

pub fn format_address(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
