use pinglens_model::{Sample, TargetSummary};
use pinglens_probe::TargetInfo;
use pinglens_render::{PanelView, Surface};
use pinglens_stats::LatencyAggregator;

/// Everything the run keeps about one target.
#[derive(Debug, Clone)]
pub struct TargetContext {
    pub index: usize,
    pub host: String,
    pub address: String,
    pub stats: LatencyAggregator,
    /// Panel surface, owned here and replaced by the renderer on resize.
    pub panel: Option<Surface>,
}

impl TargetContext {
    pub fn new(index: usize, info: TargetInfo, interval_secs: f64) -> Self {
        Self {
            index,
            host: info.name,
            address: info.address,
            stats: LatencyAggregator::new(interval_secs),
            panel: None,
        }
    }

    pub fn apply(&mut self, sample: &Sample) {
        self.stats.observe(sample.latency_ms);
    }

    pub fn panel_view(&self, percentile: f64) -> PanelView<'_> {
        PanelView {
            host: &self.host,
            sent: self.stats.sent(),
            received: self.stats.received(),
            loss_pct: self.stats.packet_loss_pct(),
            latency_total_ms: self.stats.latency_total(),
            rtt: self.stats.rtt_summary(percentile),
        }
    }

    pub fn summary(&self, percentile: f64) -> TargetSummary {
        TargetSummary {
            host: self.host.clone(),
            address: self.address.clone(),
            sent: self.stats.sent(),
            received: self.stats.received(),
            loss_pct: self.stats.packet_loss_pct(),
            latency_total_ms: self.stats.latency_total(),
            rtt: self.stats.rtt_summary(percentile),
        }
    }

    pub fn exceeds_failure_threshold(&self, threshold: f64) -> bool {
        self.stats.failure_ratio() > threshold
    }
}
