//! Feedback-driven buffer and interval tuning
//!
//! Recomputes the logical buffer size and the optimization cadence from a
//! load factor blending memory and packet-rate pressure. Both adjustments
//! are hysteresis-gated so small fluctuations never cause a reallocation
//! or a scheduler re-registration.

use super::config::PulseConfig;
use super::metrics::RunningAverages;

/// Smallest allowed logical buffer
pub const MIN_BUFFER_SIZE: usize = 1024;

/// Shortest allowed optimization interval
pub const MIN_INTERVAL_SECS: u64 = 10;

/// Size deltas at or below this are ignored
pub const SIZE_HYSTERESIS: i64 = 1024;

/// Interval deltas at or below this are ignored
pub const INTERVAL_HYSTERESIS: i64 = 5;

/// Outcome of one retune pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retune {
    pub size: usize,
    pub interval_secs: u64,
    /// The buffer must be destroyed and recreated at `size`
    pub resized: bool,
    /// The scheduler should re-register at `interval_secs`
    pub retimed: bool,
}

/// Owns the current buffer size and optimization interval
#[derive(Debug)]
pub struct BufferController {
    current_size: usize,
    current_interval: u64,
}

impl BufferController {
    pub fn new(config: &PulseConfig) -> Self {
        Self {
            current_size: config.effective_buffer_size(),
            current_interval: config.effective_interval(),
        }
    }

    pub fn current_size(&self) -> usize {
        self.current_size
    }

    pub fn current_interval(&self) -> u64 {
        self.current_interval
    }

    /// Recompute size and interval from current load
    ///
    /// Higher load grows the buffer (fewer reallocations) and shortens the
    /// interval (faster reaction). A high `prior_impact` means the last
    /// pass already freed a lot, so growth is dampened and the interval
    /// stretched back out.
    pub fn retune(
        &mut self,
        averages: RunningAverages,
        config: &PulseConfig,
        prior_impact: f64,
    ) -> Retune {
        let memory_factor = averages.memory_usage_avg / config.memory_threshold_mb;
        let packet_factor = averages.packet_rate_avg / config.packet_threshold;
        let load_factor = 0.4 * packet_factor + 0.6 * memory_factor;

        let candidate = (config.buffer_size as f64
            * (1.0 + load_factor * 0.5 * (1.0 - prior_impact)))
            .round() as i64;
        let candidate_size = candidate.max(MIN_BUFFER_SIZE as i64) as usize;

        let mut resized = false;
        if (candidate_size as i64 - self.current_size as i64).abs() > SIZE_HYSTERESIS {
            self.current_size = candidate_size;
            resized = true;
        }

        let candidate = (config.interval_secs as f64
            / (1.0 + load_factor * (1.0 + prior_impact)))
            .round() as i64;
        let candidate_interval = candidate.max(MIN_INTERVAL_SECS as i64) as u64;

        let mut retimed = false;
        if (candidate_interval as i64 - self.current_interval as i64).abs() > INTERVAL_HYSTERESIS {
            self.current_interval = candidate_interval;
            retimed = true;
        }

        Retune {
            size: self.current_size,
            interval_secs: self.current_interval,
            resized,
            retimed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn averages(memory: f64, rate: f64) -> RunningAverages {
        RunningAverages {
            memory_usage_avg: memory,
            packet_rate_avg: rate,
        }
    }

    #[test]
    fn test_zero_load_leaves_settings_unchanged() {
        let config = PulseConfig::default();
        let mut tuner = BufferController::new(&config);
        let retune = tuner.retune(RunningAverages::default(), &config, 0.0);
        assert!(!retune.resized);
        assert!(!retune.retimed);
        assert_eq!(tuner.current_size(), 1_048_576);
        assert_eq!(tuner.current_interval(), 60);
    }

    #[test]
    fn test_high_load_grows_buffer_and_shortens_interval() {
        let config = PulseConfig::default();
        let mut tuner = BufferController::new(&config);
        // memory_factor = 2.0, packet_factor = 2.0 -> load_factor = 2.0
        let retune = tuner.retune(averages(200.0, 100.0), &config, 0.0);
        assert!(retune.resized);
        assert!(retune.retimed);
        // 1048576 * (1 + 2.0 * 0.5) = 2097152
        assert_eq!(retune.size, 2_097_152);
        // 60 / (1 + 2.0) = 20
        assert_eq!(retune.interval_secs, 20);
    }

    #[test]
    fn test_prior_impact_dampens_growth() {
        let config = PulseConfig::default();
        let mut tuner = BufferController::new(&config);
        // Full prior impact cancels size growth entirely
        let retune = tuner.retune(averages(200.0, 100.0), &config, 1.0);
        assert!(!retune.resized);
        assert_eq!(retune.size, 1_048_576);
        // Interval reaction doubles instead: 60 / (1 + 2*2) = 12
        assert!(retune.retimed);
        assert_eq!(retune.interval_secs, 12);
    }

    #[test]
    fn test_small_perturbation_stays_inside_hysteresis_band() {
        let config = PulseConfig::default();
        let mut tuner = BufferController::new(&config);
        // load_factor = 0.6 * 0.3/100 = 0.0018; size delta ~944 bytes,
        // interval delta 0 -- both inside the bands
        for _ in 0..10 {
            let retune = tuner.retune(averages(0.3, 0.0), &config, 0.0);
            assert!(!retune.resized);
            assert!(!retune.retimed);
        }
        assert_eq!(tuner.current_size(), 1_048_576);
        assert_eq!(tuner.current_interval(), 60);
    }

    #[test]
    fn test_floors_hold_under_any_load() {
        let config = PulseConfig::default();
        let mut tuner = BufferController::new(&config);
        // Extreme load drives the raw interval candidate toward 0; it
        // floors to 10 and |10 - 60| clears the hysteresis band
        let retune = tuner.retune(averages(10_000.0, 10_000.0), &config, 0.0);
        assert!(retune.size >= MIN_BUFFER_SIZE);
        assert!(retune.retimed);
        assert_eq!(retune.interval_secs, MIN_INTERVAL_SECS);
        assert_eq!(tuner.current_interval(), MIN_INTERVAL_SECS);
    }

    #[test]
    fn test_floored_candidate_inside_band_leaves_interval_alone() {
        let mut config = PulseConfig::default();
        config.interval_secs = 12;
        let mut tuner = BufferController::new(&config);
        // Candidate floors to 10, but |10 - 12| is inside the band of 5,
        // so the interval stays where it is
        let retune = tuner.retune(averages(10_000.0, 10_000.0), &config, 0.0);
        assert!(!retune.retimed);
        assert_eq!(retune.interval_secs, 12);
        assert!(retune.interval_secs >= MIN_INTERVAL_SECS);
    }

    #[test]
    fn test_adjustments_fire_independently() {
        let config = PulseConfig::default();
        let mut tuner = BufferController::new(&config);
        // load_factor = 0.6 * 15/100 = 0.09: size grows by ~47k (> 1024)
        // while the interval candidate 60/1.09 = 55 leaves a delta of
        // exactly 5, inside the band
        let retune = tuner.retune(averages(15.0, 0.0), &config, 0.0);
        assert!(retune.resized);
        assert!(!retune.retimed);
    }
}
