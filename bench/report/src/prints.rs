use colored::{Color, ColoredString, Colorize};
use tracing::info;

use crate::{error_tally::ErrorTally, latency_summary::LatencySummary, report::BenchmarkReport};

impl BenchmarkReport {
    pub fn print_summary(&self) {
        info!("Benchmark: {}", self.params.pretty_name());
        println!("{}", self.formatted_summary());
    }

    pub fn formatted_summary(&self) -> String {
        let params = &self.params;
        let mut lines = vec![
            String::new(),
            "===========".to_owned(),
            format!("Total elapsed time: {:?}", self.total_time),
            format!("Average req/s: {:.2}", self.average_requests_per_second)
                .blue()
                .to_string(),
            format!(
                "Threads: {}, Commands/thread: {}, SUCCESS/FAIL: {}/{}",
                params.threads, params.iterations, self.success_count, self.failure_count
            ),
            self.success_latency
                .formatted_string("SUCCESS", Color::Green)
                .to_string(),
            self.failure_latency
                .formatted_string("FAIL", Color::Red)
                .to_string(),
            "Errors:".to_owned(),
        ];
        lines.extend(self.errors.formatted_lines());
        lines.join("\n")
    }
}

impl LatencySummary {
    pub fn formatted_string(&self, prefix: &str, color: Color) -> ColoredString {
        format!(
            "{prefix}: avg: {:?}, max: {:?}, min: {:?}, 99pct: {:?}, 95pct: {:?}",
            self.avg, self.max, self.min, self.p99, self.p95
        )
        .color(color)
    }
}

impl ErrorTally {
    /// One `<count>\t<kind>` line per kind followed by its distinct messages.
    pub fn formatted_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (kind, tally) in self.iter() {
            lines.push(format!("{}\t{}", tally.count, kind).yellow().to_string());
            for (message, count) in tally.messages_by_count() {
                if message.is_empty() {
                    lines.push(format!("  {count}\t{kind}"));
                } else {
                    lines.push(format!("  {count}\t{kind} {message}"));
                }
            }
        }
        lines
    }
}
