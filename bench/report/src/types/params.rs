use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct BenchmarkParams {
    pub threads: u32,
    pub iterations: u32,
    pub server_address: String,
    pub server_name: String,
    pub command: String,
    pub verify_certificate: bool,
    pub timeout: Option<String>,
}

impl BenchmarkParams {
    pub fn total_commands(&self) -> u64 {
        self.threads as u64 * self.iterations as u64
    }

    pub fn pretty_name(&self) -> String {
        format!(
            "{} x {} '{}' on {}",
            self.threads, self.iterations, self.command, self.server_address
        )
    }
}
