//! Status reporting for the periodic tick caller

use serde::Serialize;

use crate::core::controller::PulseController;

/// Point-in-time view of the controller, suitable for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub timestamp: String,
    pub usage_mb: f64,
    pub peak_mb: f64,
    pub event_count: u64,
    pub memory_usage_avg: f64,
    pub packet_rate_avg: f64,
    pub buffer_size: usize,
    pub interval_secs: u64,
    pub last_optimization_impact: f64,
}

impl StatusSnapshot {
    pub fn capture(controller: &mut PulseController) -> Self {
        let usage_mb = controller.sample_usage_mb();
        Self {
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            usage_mb,
            peak_mb: controller.peak_usage_mb(),
            event_count: controller.event_count(),
            memory_usage_avg: controller.memory_usage_avg(),
            packet_rate_avg: controller.packet_rate_avg(),
            buffer_size: controller.current_buffer_size(),
            interval_secs: controller.current_interval(),
            last_optimization_impact: controller.last_optimization_impact(),
        }
    }

    /// Single-line stats report emitted after each tick
    pub fn status_line(&self) -> String {
        format!(
            "Memory stats - Usage: {:.2} MB | Peak: {:.2} MB | Packets: {} | \
             Avg Usage: {:.2} MB | Avg Packet Rate: {:.2} p/s | Interval: {}s | Impact: {:.2}",
            self.usage_mb,
            self.peak_mb,
            self.event_count,
            self.memory_usage_avg,
            self.packet_rate_avg,
            self.interval_secs,
            self.last_optimization_impact,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PulseConfig;
    use crate::monitor::sampler::ScriptedSampler;

    #[test]
    fn test_status_line_format() {
        let config = PulseConfig::default();
        let mut controller =
            PulseController::with_sampler(config, Box::new(ScriptedSampler::new(vec![12.5])));
        let snapshot = StatusSnapshot::capture(&mut controller);
        let line = snapshot.status_line();
        assert!(line.starts_with("Memory stats - Usage: 12.50 MB"));
        assert!(line.contains("Packets: 0"));
        assert!(line.contains("Interval: 60s"));
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let config = PulseConfig::default();
        let mut controller =
            PulseController::with_sampler(config, Box::new(ScriptedSampler::new(vec![1.0])));
        let snapshot = StatusSnapshot::capture(&mut controller);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"event_count\":0"));
        assert!(json.contains("\"buffer_size\":1048576"));
    }
}
