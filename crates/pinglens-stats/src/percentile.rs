/// Latency (ms) at percentile `p` of a bucketed distribution.
///
/// Reports the upper bound of the first bucket whose cumulative share reaches
/// `p / 100`. An empty distribution yields NaN. When only the trailing
/// overflow bucket reaches the threshold the result is +infinity.
pub fn percentile(buckets: &[u32], interval_secs: f64, p: f64) -> f64 {
    let threshold = p / 100.0;
    let Some(last) = buckets.len().checked_sub(1) else {
        return f64::NAN;
    };
    let total: u64 = buckets.iter().map(|&count| u64::from(count)).sum();

    let mut accumulated: u64 = 0;
    let mut found = None;
    for (i, &count) in buckets.iter().enumerate() {
        accumulated += u64::from(count);
        // 0/0 is NaN and never compares >= threshold.
        let ratio = accumulated as f64 / total as f64;
        if ratio >= threshold {
            found = Some(i);
            break;
        }
    }

    match found {
        None => f64::NAN,
        Some(i) if i == last => f64::INFINITY,
        Some(i) => {
            let scale_ms = 1000.0 * interval_secs / last as f64;
            (i + 1) as f64 * scale_ms
        }
    }
}
