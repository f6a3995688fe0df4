use crate::histogram::Histogram;
use pinglens_model::{RttSummary, Stat};

/// Running statistics for one target.
#[derive(Debug, Clone)]
pub struct LatencyAggregator {
    sent: u32,
    received: u32,
    latency_min: Option<f64>,
    latency_max: Option<f64>,
    latency_sum: f64,
    latency_sum_sq: f64,
    histogram: Option<Histogram>,
}

impl LatencyAggregator {
    pub fn new(interval_secs: f64) -> Self {
        Self::with_histogram(Histogram::new(interval_secs))
    }

    /// An aggregator whose histogram could not be allocated. Everything but
    /// percentiles keeps working.
    pub fn with_histogram(histogram: Option<Histogram>) -> Self {
        Self {
            sent: 0,
            received: 0,
            latency_min: None,
            latency_max: None,
            latency_sum: 0.0,
            latency_sum_sq: 0.0,
            histogram,
        }
    }

    pub fn record_sent(&mut self) {
        self.sent += 1;
    }

    /// Accounts one received reply. Pair with `record_sent` for the same probe.
    pub fn update(&mut self, latency_ms: f64) {
        self.received += 1;
        self.latency_sum += latency_ms;
        self.latency_sum_sq += latency_ms * latency_ms;

        if self.latency_max.map_or(true, |max| max < latency_ms) {
            self.latency_max = Some(latency_ms);
        }
        if self.latency_min.map_or(true, |min| min > latency_ms) {
            self.latency_min = Some(latency_ms);
        }

        if let Some(histogram) = self.histogram.as_mut() {
            histogram.record(latency_ms);
        }
    }

    /// One probe outcome: always counts as sent, counts as received when a
    /// latency is present.
    pub fn observe(&mut self, latency_ms: Option<f64>) {
        self.record_sent();
        if let Some(latency) = latency_ms {
            self.update(latency);
        }
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }

    pub fn received(&self) -> u32 {
        self.received
    }

    pub fn latency_min(&self) -> Stat {
        self.latency_min.map_or(Stat::NotYetMeasured, Stat::Value)
    }

    pub fn latency_max(&self) -> Stat {
        self.latency_max.map_or(Stat::NotYetMeasured, Stat::Value)
    }

    /// Sum of all received latencies, shown as the run "time".
    pub fn latency_total(&self) -> f64 {
        self.latency_sum
    }

    pub fn histogram(&self) -> Option<&Histogram> {
        self.histogram.as_ref()
    }

    pub fn average(&self) -> Stat {
        if self.received == 0 {
            return Stat::NotYetMeasured;
        }
        finite_or_invalid(self.latency_sum / f64::from(self.received))
    }

    /// Sample standard deviation from the running sum and sum of squares.
    ///
    /// `(n·Σx² − (Σx)²) / (n·(n−1))` loses precision through cancellation when
    /// `n` or the latencies are large; a negative radicand shows up as
    /// `Stat::Invalid`.
    pub fn stddev(&self) -> Stat {
        match self.received {
            0 => Stat::NotYetMeasured,
            1 => Stat::Value(0.0),
            received => {
                let n = f64::from(received);
                let variance = (n * self.latency_sum_sq - self.latency_sum * self.latency_sum)
                    / (n * (n - 1.0));
                finite_or_invalid(variance.sqrt())
            }
        }
    }

    pub fn packet_loss_pct(&self) -> f64 {
        if self.sent == 0 {
            return 0.0;
        }
        100.0 * f64::from(self.sent - self.received) / f64::from(self.sent)
    }

    /// `1 - received/sent`; NaN before anything was sent.
    pub fn failure_ratio(&self) -> f64 {
        1.0 - f64::from(self.received) / f64::from(self.sent)
    }

    pub fn percentile(&self, p: f64) -> f64 {
        match &self.histogram {
            Some(histogram) => histogram.percentile(p),
            None => f64::NAN,
        }
    }

    pub fn rtt_summary(&self, percentile: f64) -> Option<RttSummary> {
        if self.received == 0 {
            return None;
        }
        Some(RttSummary {
            min_ms: self.latency_min().to_sentinel(),
            avg_ms: self.average().to_sentinel(),
            percentile,
            percentile_ms: self.percentile(percentile),
            max_ms: self.latency_max().to_sentinel(),
            stddev_ms: self.stddev().to_sentinel(),
        })
    }
}

fn finite_or_invalid(value: f64) -> Stat {
    if value.is_finite() {
        Stat::Value(value)
    } else {
        Stat::Invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_max_track_extremes() {
        let mut agg = LatencyAggregator::new(1.0);
        assert_eq!(agg.latency_min(), Stat::NotYetMeasured);
        for latency in [12.0, 3.5, 40.25, 7.0] {
            agg.observe(Some(latency));
        }
        assert_eq!(agg.latency_min(), Stat::Value(3.5));
        assert_eq!(agg.latency_max(), Stat::Value(40.25));
        assert_eq!(agg.latency_total(), 62.75);
    }

    #[test]
    fn single_sample_has_zero_stddev() {
        let mut agg = LatencyAggregator::new(1.0);
        agg.observe(Some(25.0));
        assert_eq!(agg.average(), Stat::Value(25.0));
        assert_eq!(agg.stddev(), Stat::Value(0.0));
    }

    #[test]
    fn stddev_matches_sample_formula() {
        let mut agg = LatencyAggregator::new(1.0);
        for latency in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            agg.observe(Some(latency));
        }
        let stddev = agg.stddev().value().unwrap();
        assert!((stddev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(agg.average(), Stat::Value(5.0));
    }

    #[test]
    fn timeouts_count_as_loss() {
        let mut agg = LatencyAggregator::new(1.0);
        agg.observe(Some(10.0));
        agg.observe(None);
        agg.observe(None);
        agg.observe(Some(30.0));
        assert_eq!(agg.sent(), 4);
        assert_eq!(agg.received(), 2);
        assert_eq!(agg.packet_loss_pct(), 50.0);
        assert_eq!(agg.failure_ratio(), 0.5);
    }

    #[test]
    fn rtt_summary_absent_until_first_reply() {
        let mut agg = LatencyAggregator::new(1.0);
        agg.observe(None);
        assert!(agg.rtt_summary(95.0).is_none());
        agg.observe(Some(4.2));
        let summary = agg.rtt_summary(95.0).unwrap();
        assert_eq!(summary.min_ms, 4.2);
        assert_eq!(summary.max_ms, 4.2);
        assert_eq!(summary.percentile_ms, 5.0);
    }
}
