pub mod error_tally;
pub mod failure_kind;
pub mod latency_summary;
pub mod params;
pub mod report;
