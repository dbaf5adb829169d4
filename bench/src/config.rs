use crate::job::{format_address, Job};
use crate::tls::TlsSettings;
use cosign_bench_report::params::BenchmarkParams;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Validated settings of a benchmark run.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub threads: NonZeroU32,
    pub iterations: NonZeroU32,
    pub host: String,
    pub port: u16,
    pub command: String,
    pub tls: Arc<TlsSettings>,
    pub timeout: Option<Duration>,
    pub output_dir: Option<PathBuf>,
    pub identifier: Option<String>,
}

impl BenchmarkConfig {
    pub fn new(
        threads: NonZeroU32,
        iterations: NonZeroU32,
        host: &str,
        port: u16,
        tls: Arc<TlsSettings>,
    ) -> Self {
        Self {
            threads,
            iterations,
            host: host.to_owned(),
            port,
            command: crate::protocol::DEFAULT_COMMAND.to_owned(),
            tls,
            timeout: None,
            output_dir: None,
            identifier: None,
        }
    }

    /// Number of result records a complete run produces.
    pub fn expected_results(&self) -> u64 {
        self.threads.get() as u64 * self.iterations.get() as u64
    }

    pub fn server_address(&self) -> String {
        format_address(&self.host, self.port)
    }

    pub fn job(&self) -> Job {
        Job {
            host: self.host.clone(),
            port: self.port,
            command: Arc::from(self.command.as_str()),
            iterations: self.iterations.get(),
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }

    /// Name recorded in the report, falling back to the local hostname.
    pub fn identifier(&self) -> String {
        self.identifier.clone().unwrap_or_else(|| {
            hostname::get()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "unknown".to_owned())
        })
    }

    pub fn params(&self) -> BenchmarkParams {
        BenchmarkParams {
            threads: self.threads.get(),
            iterations: self.iterations.get(),
            server_address: self.server_address(),
            server_name: self.tls.server_name_str().to_owned(),
            command: self.command.clone(),
            verify_certificate: self.tls.verify_certificate(),
            timeout: self
                .timeout
                .map(|timeout| humantime::format_duration(timeout).to_string()),
        }
    }
}
