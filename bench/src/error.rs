use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Cannot read file: {path}")]
    CannotReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid PEM data: {0}")]
    InvalidPem(#[source] std::io::Error),
    #[error("No certificates found in {0}")]
    MissingCertificate(String),
    #[error("No private key found in {0}")]
    MissingPrivateKey(String),
    #[error("Invalid TLS server name: {0}")]
    InvalidServerName(String),
    #[error("TLS configuration error: {0}")]
    TlsConfiguration(#[from] rustls::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Job queue was closed with {pending} job(s) not dispatched")]
    JobQueueClosed { pending: u32 },
    #[error("Result queue was closed")]
    ResultQueueClosed,
    #[error("Received {received} of {expected} expected results before all workers stopped")]
    MissingResults { expected: u64, received: u64 },
    #[error("Cannot write report to {path}")]
    CannotWriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
