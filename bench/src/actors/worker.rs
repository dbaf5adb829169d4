use crate::actors::session::Session;
use crate::analytics::record::ResultRecord;
use crate::job::Job;
use flume::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Long-lived consumer of the job queue. Runs one session per job, one job at a time.
pub struct Worker {
    worker_id: u32,
    jobs: Receiver<Job>,
    results: Sender<ResultRecord>,
}

impl Worker {
    pub fn new(worker_id: u32, jobs: Receiver<Job>, results: Sender<ResultRecord>) -> Self {
        Self {
            worker_id,
            jobs,
            results,
        }
    }

    /// Returns the number of jobs completed once the job queue is closed and drained.
    pub async fn run(self) -> u32 {
        let mut completed = 0;
        while let Ok(job) = self.jobs.recv_async().await {
            let session = Session::new(self.worker_id, job);
            if let Err(error) = session.run(&self.results).await {
                error!("Worker #{} → {}, stopping", self.worker_id, error);
                break;
            }
            completed += 1;
        }
        info!(
            "Worker #{} → finished after {} job(s)",
            self.worker_id, completed
        );
        completed
    }
}

pub struct WorkerPool;

impl WorkerPool {
    /// Starts `threads` workers sharing both queues. Every worker holds its own result sender,
    /// so the result queue disconnects once all of them have exited.
    pub fn spawn(
        threads: u32,
        jobs: Receiver<Job>,
        results: Sender<ResultRecord>,
    ) -> Vec<JoinHandle<u32>> {
        (1..=threads)
            .map(|worker_id| {
                let worker = Worker::new(worker_id, jobs.clone(), results.clone());
                tokio::spawn(worker.run())
            })
            .collect()
    }
}
