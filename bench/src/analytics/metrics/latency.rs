use cosign_bench_report::latency_summary::LatencySummary;
use std::time::Duration;

/// Computes mean, max, min, p99 and p95 of `durations`. Input order does not matter.
pub fn from_durations(durations: &[Duration]) -> LatencySummary {
    if durations.is_empty() {
        return LatencySummary::default();
    }

    let mut sorted = durations.to_vec();
    sorted.sort_unstable();

    let total_nanos: u128 = sorted.iter().map(Duration::as_nanos).sum();
    let avg = nanos_to_duration(total_nanos / sorted.len() as u128);

    LatencySummary {
        avg,
        max: sorted[sorted.len() - 1],
        min: sorted[0],
        p99: calculate_percentile(&sorted, 99.0),
        p95: calculate_percentile(&sorted, 95.0),
    }
}

/// Percentile of an ascending slice. The rank is `percentile / 100 * len`: a whole rank
/// selects that element, a fractional rank averages the two elements around it. A single
/// element is every percentile. Ranks outside the data yield zero.
pub fn calculate_percentile(sorted_data: &[Duration], percentile: f64) -> Duration {
    if sorted_data.is_empty() || percentile <= 0.0 || percentile > 100.0 {
        return Duration::ZERO;
    }
    if sorted_data.len() == 1 {
        return sorted_data[0];
    }

    let rank = percentile / 100.0 * sorted_data.len() as f64;
    let index = rank as usize;
    if rank.fract() == 0.0 {
        return sorted_data[index - 1];
    }
    if rank < 1.0 {
        return Duration::ZERO;
    }

    let nanos = (sorted_data[index - 1].as_nanos() + sorted_data[index].as_nanos()) / 2;
    nanos_to_duration(nanos)
}

fn nanos_to_duration(nanos: u128) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
