use super::error_tally::ErrorTally;
use super::latency_summary::LatencySummary;
use super::params::BenchmarkParams;
use crate::utils::{duration_ms, round_float};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

pub const REPORT_FILE_NAME: &str = "report.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct BenchmarkReport {
    /// Benchmark unique identifier
    pub uuid: Uuid,

    /// Timestamp when the benchmark was finished
    pub timestamp: String,

    /// Identifier of the machine that ran the benchmark (hostname by default)
    pub identifier: String,

    /// Benchmark parameters
    pub params: BenchmarkParams,

    /// Wall-clock time between dispatching the first job and receiving the last result
    #[serde(with = "duration_ms")]
    pub total_time: Duration,

    #[serde(serialize_with = "round_float")]
    pub average_requests_per_second: f64,

    pub success_count: u64,
    pub failure_count: u64,
    pub success_latency: LatencySummary,
    pub failure_latency: LatencySummary,
    pub errors: ErrorTally,
}

impl BenchmarkReport {
    pub fn total_count(&self) -> u64 {
        self.success_count + self.failure_count
    }

    /// Writes the report as pretty JSON into `output_dir`, creating the directory when needed.
    pub fn dump_to_json(&self, output_dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(output_dir)?;
        let report_path = output_dir.join(REPORT_FILE_NAME);
        let report_json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&report_path, report_json)?;
        Ok(report_path)
    }
}
