//! Latency aggregation, histogram and percentile queries.

pub mod aggregator;
pub mod histogram;
pub mod percentile;

pub use aggregator::LatencyAggregator;
pub use histogram::{Histogram, HISTOGRAM_BUCKETS};
pub use percentile::percentile;
