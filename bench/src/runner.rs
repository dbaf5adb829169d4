use crate::actors::worker::WorkerPool;
use crate::analytics::aggregator::ResultAggregator;
use crate::analytics::report_builder::BenchmarkReportBuilder;
use crate::config::BenchmarkConfig;
use crate::dispatcher::Dispatcher;
use crate::error::BenchError;
use cosign_bench_report::report::BenchmarkReport;
use futures::future::join_all;
use human_repr::HumanCount;
use tokio::time::Instant;
use tracing::{error, info};

pub struct BenchmarkRunner {
    config: BenchmarkConfig,
}

impl BenchmarkRunner {
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    /// Runs the whole benchmark: spawns the worker pool, dispatches one job per thread,
    /// collects `threads * iterations` results and builds the report. When an output
    /// directory is configured the report is also written there as JSON.
    pub async fn run(self) -> Result<BenchmarkReport, BenchError> {
        let config = self.config;
        let threads = config.threads.get();
        let expected = config.expected_results();
        info!(
            "Starting to benchmark {} with {} thread(s) x {} command(s) of '{}'",
            config.server_address(),
            threads,
            config.iterations,
            config.command
        );

        let (job_sender, job_receiver) = flume::bounded(threads as usize);
        let (result_sender, result_receiver) =
            flume::bounded(usize::try_from(expected).unwrap_or(usize::MAX));
        let workers = WorkerPool::spawn(threads, job_receiver, result_sender);

        let start = Instant::now();
        let aggregator = ResultAggregator::new(expected, result_receiver);
        let dispatcher = Dispatcher::new(&config);
        let (dispatched, results) = tokio::join!(dispatcher.dispatch(job_sender), aggregator.collect());
        let total_time = start.elapsed();
        dispatched?;
        let results = results?;
        info!(
            "Benchmarking finished: {} result(s) in {:?}",
            expected.human_count_bare(),
            total_time
        );

        for (index, outcome) in join_all(workers).await.into_iter().enumerate() {
            if let Err(error) = outcome {
                error!("Worker #{} did not finish cleanly: {error}", index + 1);
            }
        }

        let report = BenchmarkReportBuilder::build(
            config.identifier(),
            config.params(),
            total_time,
            results,
        );

        if let Some(output_dir) = &config.output_dir {
            let path = report
                .dump_to_json(output_dir)
                .map_err(|source| BenchError::CannotWriteReport {
                    path: output_dir.clone(),
                    source,
                })?;
            info!("Report saved to {}", path.display());
        }

        Ok(report)
    }
}
