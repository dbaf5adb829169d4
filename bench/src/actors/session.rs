use crate::analytics::record::{CommandStatus, ResultRecord, SessionFailure};
use crate::error::BenchError;
use crate::job::Job;
use crate::protocol::{self, QUIT_REQUEST, STARTTLS_REQUEST};
use cosign_bench_report::failure_kind::FailureKind;
use flume::Sender;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_rustls::client::TlsStream;
use tracing::{debug, info, warn};

type PlainConnection = BufReader<TcpStream>;
type SecureConnection = BufReader<TlsStream<TcpStream>>;

/// Client lifecycle for a single job: dial, banner, STARTTLS, TLS handshake, command loop
/// and QUIT. Every run sends exactly `job.iterations` records, whichever stage it ends in.
pub struct Session {
    worker_id: u32,
    job: Job,
}

impl Session {
    pub fn new(worker_id: u32, job: Job) -> Self {
        Self { worker_id, job }
    }

    pub async fn run(&self, results: &Sender<ResultRecord>) -> Result<(), BenchError> {
        let mut start = Instant::now();
        let mut connection = match self.establish().await {
            Ok(connection) => connection,
            Err(failure) => {
                let elapsed = start.elapsed();
                warn!(
                    "Worker #{} → {} after {:?}, reporting {} failed command(s)",
                    self.worker_id, failure, elapsed, self.job.iterations
                );
                return self.fail_remaining(results, 1, failure, elapsed).await;
            }
        };

        for iteration in 1..=self.job.iterations {
            match self.execute_command(&mut connection).await {
                Ok(status) => {
                    self.emit(results, iteration, status, start.elapsed()).await?;
                    start = Instant::now();
                }
                Err(failure) => {
                    let elapsed = start.elapsed();
                    warn!(
                        "Worker #{} → {} on command {}, reporting the remaining {} command(s) as failed",
                        self.worker_id,
                        failure,
                        iteration,
                        self.job.iterations - iteration + 1
                    );
                    self.fail_remaining(results, iteration, failure, elapsed)
                        .await?;
                    break;
                }
            }
        }

        self.quit(&mut connection).await;
        Ok(())
    }

    async fn establish(&self) -> Result<SecureConnection, SessionFailure> {
        let stream = self
            .within(TcpStream::connect((self.job.host.as_str(), self.job.port)))
            .await
            .map_err(|error| SessionFailure::new(FailureKind::NoConnection, error.to_string()))?;
        let mut connection = BufReader::new(stream);

        match self.within(protocol::read_line(&mut connection)).await {
            Ok(banner) if protocol::is_ready(&banner) => {}
            Ok(banner) => {
                let failure =
                    SessionFailure::new(FailureKind::BadResponse, protocol::trim_line(&banner));
                return Err(self.abandon(connection, failure).await);
            }
            Err(error) => {
                let failure = SessionFailure::new(FailureKind::BadResponse, error.to_string());
                return Err(self.abandon(connection, failure).await);
            }
        }

        match self.request(&mut connection, STARTTLS_REQUEST).await {
            Ok(ack) if protocol::is_ready(&ack) => {}
            Ok(ack) => {
                let failure =
                    SessionFailure::new(FailureKind::StartTlsFailure, protocol::trim_line(&ack));
                return Err(self.abandon(connection, failure).await);
            }
            Err(error) => {
                let failure = SessionFailure::new(FailureKind::StartTlsFailure, error.to_string());
                return Err(self.abandon(connection, failure).await);
            }
        }

        if !connection.buffer().is_empty() {
            debug!(
                "Worker #{} → discarding {} byte(s) received before the TLS handshake",
                self.worker_id,
                connection.buffer().len()
            );
        }

        let tls = &self.job.tls;
        let stream = self
            .within(
                tls.connector()
                    .connect(tls.server_name().clone(), connection.into_inner()),
            )
            .await
            .map_err(|error| {
                SessionFailure::new(FailureKind::HandshakeFailure, error.to_string())
            })?;
        let mut connection = BufReader::new(stream);

        // The daemon acknowledges the upgrade with one more line before it takes commands.
        self.within(protocol::read_line(&mut connection))
            .await
            .map_err(|error| {
                SessionFailure::new(FailureKind::HandshakeFailure, error.to_string())
            })?;
        debug!(
            "Worker #{} → TLS session established with {}",
            self.worker_id,
            self.job.server_address()
        );
        Ok(connection)
    }

    /// `Err` means the connection is out of step with the daemon: a timed-out command may still
    /// get its response, which must never be read as the answer to the next one.
    async fn execute_command(
        &self,
        connection: &mut SecureConnection,
    ) -> Result<CommandStatus, SessionFailure> {
        match self.request(connection, &self.job.command).await {
            Ok(response) if protocol::is_success_response(&response) => {
                Ok(CommandStatus::Success {
                    response: protocol::trim_line(&response).to_owned(),
                })
            }
            Ok(response) => Ok(CommandStatus::Failure(SessionFailure::new(
                FailureKind::FailResponse,
                protocol::trim_line(&response),
            ))),
            Err(error) => {
                let failure = SessionFailure::new(FailureKind::FailResponse, error.to_string());
                if error.kind() == io::ErrorKind::TimedOut {
                    Err(failure)
                } else {
                    Ok(CommandStatus::Failure(failure))
                }
            }
        }
    }

    async fn request<C>(&self, connection: &mut C, line: &str) -> io::Result<String>
    where
        C: AsyncBufRead + AsyncWrite + Unpin,
    {
        self.within(protocol::write_line(&mut *connection, line))
            .await?;
        self.within(protocol::read_line(&mut *connection)).await
    }

    async fn abandon(
        &self,
        mut connection: PlainConnection,
        failure: SessionFailure,
    ) -> SessionFailure {
        self.quit(&mut connection).await;
        failure
    }

    async fn quit<C>(&self, connection: &mut C)
    where
        C: AsyncWrite + Unpin,
    {
        if let Err(error) = self.within(teardown(connection)).await {
            debug!(
                "Worker #{} → failed to close connection to {}: {}",
                self.worker_id,
                self.job.server_address(),
                error
            );
        }
    }

    async fn fail_remaining(
        &self,
        results: &Sender<ResultRecord>,
        from_iteration: u32,
        failure: SessionFailure,
        elapsed: Duration,
    ) -> Result<(), BenchError> {
        for iteration in from_iteration..=self.job.iterations {
            let status = CommandStatus::Failure(failure.clone());
            self.emit(results, iteration, status, elapsed).await?;
        }
        Ok(())
    }

    async fn emit(
        &self,
        results: &Sender<ResultRecord>,
        iteration: u32,
        status: CommandStatus,
        elapsed: Duration,
    ) -> Result<(), BenchError> {
        info!("[{}:{}] {:?} {}", self.worker_id, iteration, elapsed, status);
        results
            .send_async(ResultRecord {
                worker_id: self.worker_id,
                iteration,
                status,
                elapsed,
            })
            .await
            .map_err(|_| BenchError::ResultQueueClosed)
    }

    async fn within<T>(&self, operation: impl Future<Output = io::Result<T>>) -> io::Result<T> {
        match self.job.timeout {
            Some(limit) => tokio::time::timeout(limit, operation)
                .await
                .unwrap_or_else(|_| Err(timed_out(limit))),
            None => operation.await,
        }
    }
}

async fn teardown<C>(connection: &mut C) -> io::Result<()>
where
    C: AsyncWrite + Unpin,
{
    protocol::write_line(&mut *connection, QUIT_REQUEST).await?;
    connection.shutdown().await
}

fn timed_out(limit: Duration) -> io::Error {
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("timed out after {}", humantime::format_duration(limit)),
    )
}
