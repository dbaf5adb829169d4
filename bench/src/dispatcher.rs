use crate::config::BenchmarkConfig;
use crate::error::BenchError;
use crate::job::Job;
use flume::Sender;
use tracing::info;

/// Builds one job per worker and puts them on the job queue.
pub struct Dispatcher {
    template: Job,
    threads: u32,
}

impl Dispatcher {
    pub fn new(config: &BenchmarkConfig) -> Self {
        Self {
            template: config.job(),
            threads: config.threads.get(),
        }
    }

    /// Enqueues `threads` jobs, each carrying the full iteration count, then closes the
    /// queue so idle workers stop once it is drained.
    pub async fn dispatch(self, jobs: Sender<Job>) -> Result<u32, BenchError> {
        for dispatched in 0..self.threads {
            if jobs.send_async(self.template.clone()).await.is_err() {
                return Err(BenchError::JobQueueClosed {
                    pending: self.threads - dispatched,
                });
            }
        }
        info!(
            "Dispatched {} job(s) of {} command(s) to {}",
            self.threads,
            self.template.iterations,
            self.template.server_address()
        );
        Ok(self.threads)
    }
}
