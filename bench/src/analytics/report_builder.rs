use super::aggregator::AggregatedResults;
use super::metrics::latency::from_durations;
use chrono::Utc;
use cosign_bench_report::params::BenchmarkParams;
use cosign_bench_report::report::BenchmarkReport;
use std::time::Duration;

pub struct BenchmarkReportBuilder;

impl BenchmarkReportBuilder {
    pub fn build(
        identifier: String,
        params: BenchmarkParams,
        total_time: Duration,
        results: AggregatedResults,
    ) -> BenchmarkReport {
        let uuid = uuid::Uuid::new_v4();
        let timestamp = Utc::now().to_rfc3339();

        let total_commands = params.total_commands();
        let average_requests_per_second = if total_time.is_zero() {
            0.0
        } else {
            total_commands as f64 / total_time.as_secs_f64()
        };

        BenchmarkReport {
            uuid,
            timestamp,
            identifier,
            params,
            total_time,
            average_requests_per_second,
            success_count: results.successes.len() as u64,
            failure_count: results.failures.len() as u64,
            success_latency: from_durations(&results.successes),
            failure_latency: from_durations(&results.failures),
            errors: results.errors,
        }
    }
}
