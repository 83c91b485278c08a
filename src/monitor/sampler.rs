//! Process memory sampling

use sysinfo::{Pid, System};
use tracing::warn;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Source of memory usage readings for the controller
pub trait MemorySampler {
    /// Current memory usage in MB
    fn usage_mb(&mut self) -> f64;
}

/// Samples this process's resident set via sysinfo
pub struct ProcessMemorySampler {
    system: System,
    pid: Option<Pid>,
}

impl ProcessMemorySampler {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                warn!("Cannot resolve current pid, memory sampling disabled: {}", e);
                None
            }
        };
        Self {
            system: System::new(),
            pid,
        }
    }
}

impl Default for ProcessMemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySampler for ProcessMemorySampler {
    fn usage_mb(&mut self) -> f64 {
        let Some(pid) = self.pid else { return 0.0 };
        if !self.system.refresh_process(pid) {
            return 0.0;
        }
        self.system
            .process(pid)
            .map(|p| p.memory() as f64 / BYTES_PER_MB)
            .unwrap_or(0.0)
    }
}

/// Replays a fixed sequence of readings; the last value repeats once the
/// sequence is exhausted. Used by tests and simulations where the control
/// loop must see deterministic pressure.
#[derive(Debug, Default)]
pub struct ScriptedSampler {
    readings: Vec<f64>,
    cursor: usize,
}

impl ScriptedSampler {
    pub fn new(readings: Vec<f64>) -> Self {
        Self { readings, cursor: 0 }
    }
}

impl MemorySampler for ScriptedSampler {
    fn usage_mb(&mut self) -> f64 {
        if self.readings.is_empty() {
            return 0.0;
        }
        let value = self.readings[self.cursor.min(self.readings.len() - 1)];
        self.cursor += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_sampler_reads_own_rss() {
        let mut sampler = ProcessMemorySampler::new();
        let usage = sampler.usage_mb();
        assert!(usage >= 0.0);
    }

    #[test]
    fn test_scripted_sampler_repeats_last_value() {
        let mut sampler = ScriptedSampler::new(vec![10.0, 20.0]);
        assert_eq!(sampler.usage_mb(), 10.0);
        assert_eq!(sampler.usage_mb(), 20.0);
        assert_eq!(sampler.usage_mb(), 20.0);
    }

    #[test]
    fn test_empty_script_reads_zero() {
        let mut sampler = ScriptedSampler::new(vec![]);
        assert_eq!(sampler.usage_mb(), 0.0);
    }
}
