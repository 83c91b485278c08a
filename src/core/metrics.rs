//! Load estimation via exponential moving averages

use std::time::Instant;

/// EMA smoothing factor
pub const SMOOTHING_ALPHA: f64 = 0.1;

/// Smoothed load statistics
///
/// A value of 0.0 means "unset": the first real sample replaces it outright
/// instead of blending, so startup is not dragged toward zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningAverages {
    /// Smoothed process memory usage in MB
    pub memory_usage_avg: f64,
    /// Smoothed event rate in events/sec
    pub packet_rate_avg: f64,
}

/// Maintains running averages from raw per-event measurements
#[derive(Debug)]
pub struct MetricsEstimator {
    averages: RunningAverages,
    last_sample_time: Instant,
}

impl MetricsEstimator {
    pub fn new() -> Self {
        Self {
            averages: RunningAverages::default(),
            last_sample_time: Instant::now(),
        }
    }

    /// Record a sample using the wall-clock delta since the previous call
    pub fn record(&mut self, memory_usage_mb: f64, event_count: u64) -> RunningAverages {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_sample_time).as_secs_f64();
        self.last_sample_time = now;
        self.record_sample(memory_usage_mb, event_count, elapsed)
    }

    /// Record a sample with an explicit elapsed time
    ///
    /// `event_rate = event_count / max(1, elapsed_secs)`; both averages
    /// then blend via the EMA rule.
    pub fn record_sample(
        &mut self,
        memory_usage_mb: f64,
        event_count: u64,
        elapsed_secs: f64,
    ) -> RunningAverages {
        let rate = event_count as f64 / elapsed_secs.max(1.0);
        self.averages.memory_usage_avg = blend(self.averages.memory_usage_avg, memory_usage_mb);
        self.averages.packet_rate_avg = blend(self.averages.packet_rate_avg, rate);
        self.averages
    }

    pub fn averages(&self) -> RunningAverages {
        self.averages
    }
}

impl Default for MetricsEstimator {
    fn default() -> Self {
        Self::new()
    }
}

fn blend(avg: f64, sample: f64) -> f64 {
    if avg == 0.0 {
        sample
    } else {
        SMOOTHING_ALPHA * sample + (1.0 - SMOOTHING_ALPHA) * avg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_replaces_outright() {
        let mut est = MetricsEstimator::new();
        let avg = est.record_sample(42.0, 10, 1.0);
        assert_eq!(avg.memory_usage_avg, 42.0);
        assert_eq!(avg.packet_rate_avg, 10.0);
    }

    #[test]
    fn test_subsequent_samples_blend() {
        let mut est = MetricsEstimator::new();
        est.record_sample(100.0, 0, 1.0);
        let avg = est.record_sample(200.0, 0, 1.0);
        // 0.1 * 200 + 0.9 * 100
        assert!((avg.memory_usage_avg - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_uses_elapsed_floor() {
        let mut est = MetricsEstimator::new();
        // Sub-second elapsed must not inflate the rate
        let avg = est.record_sample(1.0, 500, 0.01);
        assert_eq!(avg.packet_rate_avg, 500.0);
        let mut est = MetricsEstimator::new();
        let avg = est.record_sample(1.0, 500, 10.0);
        assert_eq!(avg.packet_rate_avg, 50.0);
    }

    #[test]
    fn test_ema_converges_monotonically() {
        let mut est = MetricsEstimator::new();
        est.record_sample(10.0, 0, 1.0);
        let target = 100.0;
        let mut prev = 10.0;
        for _ in 0..200 {
            let avg = est.record_sample(target, 0, 1.0).memory_usage_avg;
            assert!(avg > prev);
            assert!(avg <= target);
            prev = avg;
        }
        assert!((target - prev).abs() < 1e-3);
    }
}
