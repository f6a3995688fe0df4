use crate::percentile::percentile;

/// 1000 linear buckets over `[0, interval)` plus one overflow bucket.
pub const HISTOGRAM_BUCKETS: usize = 1001;

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    buckets: Vec<u32>,
    interval_secs: f64,
}

impl Histogram {
    /// Returns `None` when the bucket array cannot be allocated.
    pub fn new(interval_secs: f64) -> Option<Self> {
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(HISTOGRAM_BUCKETS).ok()?;
        buckets.resize(HISTOGRAM_BUCKETS, 0);
        Some(Self {
            buckets,
            interval_secs,
        })
    }

    pub fn interval_secs(&self) -> f64 {
        self.interval_secs
    }

    pub fn buckets(&self) -> &[u32] {
        &self.buckets
    }

    pub fn overflow(&self) -> u32 {
        self.buckets[HISTOGRAM_BUCKETS - 1]
    }

    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|&count| u64::from(count)).sum()
    }

    /// Width of one linear bucket in milliseconds.
    pub fn scale_ms(&self) -> f64 {
        1000.0 * self.interval_secs / (HISTOGRAM_BUCKETS - 1) as f64
    }

    pub fn bucket_index(&self, latency_ms: f64) -> usize {
        let raw = latency_ms * (HISTOGRAM_BUCKETS - 1) as f64 / (1000.0 * self.interval_secs);
        // `as` saturates: negative and NaN land in 0, huge values in usize::MAX.
        (raw as usize).min(HISTOGRAM_BUCKETS - 1)
    }

    pub fn record(&mut self, latency_ms: f64) {
        let index = self.bucket_index(latency_ms);
        self.buckets[index] = self.buckets[index].saturating_add(1);
    }

    pub fn percentile(&self, p: f64) -> f64 {
        percentile(&self.buckets, self.interval_secs, p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_index_scales_with_interval() {
        let one_sec = Histogram::new(1.0).unwrap();
        assert_eq!(one_sec.bucket_index(0.0), 0);
        assert_eq!(one_sec.bucket_index(10.7), 10);
        assert_eq!(one_sec.bucket_index(999.9), 999);
        assert_eq!(one_sec.bucket_index(1000.0), 1000);
        assert_eq!(one_sec.bucket_index(1e12), 1000);

        let fast = Histogram::new(0.2).unwrap();
        assert!((fast.scale_ms() - 0.2).abs() < 1e-12);
        assert_eq!(fast.bucket_index(100.0), 500);
        assert_eq!(fast.bucket_index(250.0), 1000);
    }

    #[test]
    fn odd_latencies_clamp_into_range() {
        let hist = Histogram::new(1.0).unwrap();
        assert_eq!(hist.bucket_index(-3.0), 0);
        assert_eq!(hist.bucket_index(f64::NAN), 0);
        assert_eq!(hist.bucket_index(f64::INFINITY), HISTOGRAM_BUCKETS - 1);
    }

    #[test]
    fn record_counts_into_total() {
        let mut hist = Histogram::new(1.0).unwrap();
        for latency in [1.0, 2.0, 2.5, 5000.0] {
            hist.record(latency);
        }
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.buckets()[2], 2);
        assert_eq!(hist.overflow(), 1);
    }
}
