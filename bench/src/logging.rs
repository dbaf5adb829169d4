use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Keeps the non-blocking writer alive; buffered log lines are flushed when it is dropped.
pub struct Logging {
    stderr_guard: Option<WorkerGuard>,
}

impl Logging {
    pub fn new() -> Self {
        Logging { stderr_guard: None }
    }

    pub fn init(&mut self) -> &mut Self {
        let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy();

        let stderr_layer = fmt::Layer::default()
            .with_target(false)
            .with_writer(stderr_writer)
            .with_filter(filter)
            .boxed();

        self.stderr_guard = Some(stderr_guard);

        if let Err(error) = tracing_subscriber::registry().with(stderr_layer).try_init() {
            eprintln!("Logging was already initialized: {error}");
        }

        self
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self::new()
    }
}
