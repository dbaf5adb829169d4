use clap::Parser;
use cosign_bench::args::common::CosignBenchArgs;
use cosign_bench::error::BenchError;
use cosign_bench::logging::Logging;
use cosign_bench::runner::BenchmarkRunner;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), BenchError> {
    let args = CosignBenchArgs::parse();
    args.validate();

    let mut logging = Logging::new();
    logging.init();

    info!("Starting the cosign benchmark...");
    let config = args.into_config().inspect_err(|error| {
        error!("Cannot configure the benchmark: {error}");
    })?;
    let report = BenchmarkRunner::new(config).run().await.inspect_err(|error| {
        error!("Benchmark failed: {error}");
    })?;
    report.print_summary();
    Ok(())
}
