use crate::analytics::record::{CommandStatus, ResultRecord};
use crate::error::BenchError;
use cosign_bench_report::error_tally::ErrorTally;
use flume::Receiver;
use std::time::Duration;
use tracing::{error, info};

/// Everything collected from one benchmark run, split by outcome.
#[derive(Debug, Default)]
pub struct AggregatedResults {
    pub successes: Vec<Duration>,
    pub failures: Vec<Duration>,
    pub errors: ErrorTally,
}

impl AggregatedResults {
    pub fn total(&self) -> u64 {
        (self.successes.len() + self.failures.len()) as u64
    }

    fn add(&mut self, record: ResultRecord) {
        match record.status {
            CommandStatus::Success { .. } => self.successes.push(record.elapsed),
            CommandStatus::Failure(failure) => {
                self.failures.push(record.elapsed);
                self.errors.record(failure.kind, &failure.message);
            }
        }
    }
}

/// Single consumer of the result queue.
pub struct ResultAggregator {
    expected: u64,
    receiver: Receiver<ResultRecord>,
}

impl ResultAggregator {
    pub fn new(expected: u64, receiver: Receiver<ResultRecord>) -> Self {
        Self { expected, receiver }
    }

    /// Waits for exactly `expected` records. Fails instead of waiting forever when every
    /// producer is gone before the count is reached.
    pub async fn collect(self) -> Result<AggregatedResults, BenchError> {
        let capacity = usize::try_from(self.expected).unwrap_or(usize::MAX).min(1 << 20);
        let mut results = AggregatedResults {
            successes: Vec::with_capacity(capacity),
            ..Default::default()
        };
        let mut received = 0;
        while received < self.expected {
            let record = match self.receiver.recv_async().await {
                Ok(record) => record,
                Err(_) => {
                    error!(
                        "Result queue closed after {received} of {} records.",
                        self.expected
                    );
                    return Err(BenchError::MissingResults {
                        expected: self.expected,
                        received,
                    });
                }
            };
            received += 1;
            results.add(record);
        }
        info!(
            "Collected {received} result(s): {} succeeded, {} failed",
            results.successes.len(),
            results.failures.len()
        );
        Ok(results)
    }
}
