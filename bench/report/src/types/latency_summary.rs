use crate::utils::duration_ms;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Five-number summary of a set of command latencies. Every field is zero for an empty set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySummary {
    #[serde(with = "duration_ms")]
    pub avg: Duration,
    #[serde(with = "duration_ms")]
    pub max: Duration,
    #[serde(with = "duration_ms")]
    pub min: Duration,
    #[serde(with = "duration_ms")]
    pub p99: Duration,
    #[serde(with = "duration_ms")]
    pub p95: Duration,
}
