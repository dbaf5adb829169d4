use cosign_bench_report::failure_kind::FailureKind;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Why a command attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl SessionFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Display for SessionFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} {}", self.kind, self.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    Success { response: String },
    Failure(SessionFailure),
}

impl CommandStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandStatus::Success { .. })
    }
}

impl Display for CommandStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandStatus::Success { response } => write!(f, "SUCCESS {response}"),
            CommandStatus::Failure(failure) => write!(f, "{failure}"),
        }
    }
}

/// Outcome of a single measured command attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub worker_id: u32,
    pub iteration: u32,
    pub status: CommandStatus,
    pub elapsed: Duration,
}
