use derive_more::derive::Display;
use serde::{Deserialize, Serialize};

/// Stage at which a session gave up, or the reason a command was rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
pub enum FailureKind {
    #[display("NOCONN")]
    #[serde(rename = "no_connection")]
    NoConnection,
    #[display("BADRESPONSE")]
    #[serde(rename = "bad_response")]
    BadResponse,
    #[display("STARTTLS FAIL")]
    #[serde(rename = "starttls_failure")]
    StartTlsFailure,
    #[display("HANDSHAKE FAIL")]
    #[serde(rename = "handshake_failure")]
    HandshakeFailure,
    #[display("FAILRESPONSE")]
    #[serde(rename = "fail_response")]
    FailResponse,
}
