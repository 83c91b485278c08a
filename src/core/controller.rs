//! Pulse controller
//!
//! Wires the estimator, ledger, tuner and strategist together behind two
//! external triggers: `on_event` for every outbound packet and `on_tick`
//! for the periodic optimization pass. The controller is the sole owner of
//! the logical buffer; nothing outside this type ever aliases it.

use std::time::Instant;
use tracing::{debug, info, warn};

use super::advice::{Advice, AdviceStrategist};
use super::buffer::BufferSlot;
use super::config::PulseConfig;
use super::ledger::AllocationLedger;
use super::metrics::{MetricsEstimator, RunningAverages};
use super::tuner::BufferController;
use crate::monitor::sampler::{MemorySampler, ProcessMemorySampler};

/// One outbound unit of work delivered by the host
#[derive(Debug, Clone)]
pub struct PacketEvent {
    payload: Vec<u8>,
}

impl PacketEvent {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Synthetic event carrying a `Packet #<seq>` payload
    pub fn sequenced(seq: u64) -> Self {
        Self::new(format!("Packet #{}", seq).into_bytes())
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn serialized_len(&self) -> usize {
        self.payload.len()
    }
}

/// Deterministic write offset for the `counter`-th event
///
/// `counter * len mod size`; collisions overwrite earlier entries, which is
/// accepted behavior for this placement rule.
fn placement_offset(counter: u64, serialized_len: usize, buffer_size: usize) -> usize {
    (counter.wrapping_mul(serialized_len as u64) % buffer_size as u64) as usize
}

/// What one optimization pass did
#[derive(Debug, Clone, Copy)]
pub struct TickReport {
    pub advice: Advice,
    pub resized: bool,
    pub retimed: bool,
    /// Recommended interval for the next tick registration
    pub interval_secs: u64,
    pub bytes_reclaimed: usize,
    pub impact: f64,
}

/// Self-tuning controller over the logical buffer
pub struct PulseController {
    config: PulseConfig,
    slot: BufferSlot,
    tuner: BufferController,
    strategist: AdviceStrategist,
    estimator: MetricsEstimator,
    ledger: AllocationLedger,
    sampler: Box<dyn MemorySampler + Send>,
    event_count: u64,
    peak_usage_mb: f64,
    last_impact: f64,
    released: bool,
}

impl PulseController {
    /// Create a controller sampling this process's memory
    pub fn new(config: PulseConfig) -> Self {
        Self::with_sampler(config, Box::new(ProcessMemorySampler::new()))
    }

    /// Create a controller with an injected memory sampler
    pub fn with_sampler(config: PulseConfig, sampler: Box<dyn MemorySampler + Send>) -> Self {
        let tuner = BufferController::new(&config);

        if config.opcache_reset_enabled {
            debug!("opcache reset requested but has no effect in this runtime");
        }

        let mut controller = Self {
            slot: BufferSlot::empty(),
            tuner,
            strategist: AdviceStrategist::new(),
            estimator: MetricsEstimator::new(),
            ledger: AllocationLedger::new(),
            sampler,
            event_count: 0,
            peak_usage_mb: 0.0,
            last_impact: 0.0,
            released: false,
            config,
        };
        if controller.config.enabled {
            let size = controller.tuner.current_size();
            controller.create_buffer(size);
        }
        controller
    }

    /// Handle one outbound packet
    ///
    /// Increments the counter, writes the payload at a deterministic offset
    /// in the logical buffer and refreshes the running averages. Collisions
    /// with earlier writes are accepted; the placement rule is
    /// `counter * len mod size` and nothing else.
    pub fn on_event(&mut self, event: &PacketEvent) {
        if !self.config.enabled || self.released {
            return;
        }

        self.event_count += 1;
        let offset = placement_offset(
            self.event_count,
            event.serialized_len(),
            self.tuner.current_size(),
        );

        if let Some(buf) = self.slot.get_mut() {
            buf.write_at(offset, event.payload());
            self.ledger.record(event.serialized_len(), Instant::now());
        }

        let usage = self.sample_usage_mb();
        self.estimator.record(usage, self.event_count);

        if self.config.logger_enabled {
            info!("Packet processed (Total: {})", self.event_count);
        }
    }

    /// Run one optimization pass
    ///
    /// Returns `None` when disabled or released. Retunes the buffer and
    /// interval, applies the selected strategy, reclaims stale ledger
    /// entries and records the pass's impact on memory usage.
    pub fn on_tick(&mut self) -> Option<TickReport> {
        if !self.config.enabled || self.released {
            return None;
        }

        let before = self.sample_usage_mb();
        let averages = self.estimator.averages();
        let retune = self.tuner.retune(averages, &self.config, self.last_impact);

        if retune.resized {
            self.create_buffer(retune.size);
            if self.config.logger_enabled {
                info!(
                    "Buffer adjusted to {:.2}MB",
                    retune.size as f64 / 1024.0 / 1024.0
                );
            }
        }
        if retune.retimed && self.config.logger_enabled {
            info!("Optimization interval adjusted to {}s", retune.interval_secs);
        }

        let advice = self.strategist.select(averages, &self.config);
        match self
            .strategist
            .apply(advice, &mut self.slot, self.tuner.current_size())
        {
            Ok(outcome) => {
                if outcome.recreated {
                    self.ledger.record(self.tuner.current_size(), Instant::now());
                }
                if self.config.logger_enabled {
                    info!(
                        "Applied {} advice ({} bytes touched)",
                        advice, outcome.touched_bytes
                    );
                }
            }
            Err(e) => warn!("Strategy {} failed: {}", advice, e),
        }

        let bytes_reclaimed = self.ledger.reclaim(Instant::now());
        if bytes_reclaimed > 0 && self.config.logger_enabled {
            info!("Garbage memory freed: {:.1}KB", bytes_reclaimed as f64 / 1024.0);
        }

        let after = self.sample_usage_mb();
        self.last_impact = ((before - after) / before.max(1.0)).clamp(0.0, 1.0);

        Some(TickReport {
            advice,
            resized: retune.resized,
            retimed: retune.retimed,
            interval_secs: retune.interval_secs,
            bytes_reclaimed,
            impact: self.last_impact,
        })
    }

    /// Destroy the buffer and clear the ledger; idempotent. Subsequent
    /// triggers are no-ops.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.slot.release();
        self.ledger.clear();
        self.released = true;
        if self.config.logger_enabled {
            info!("Memory buffer released");
        }
    }

    /// Take a fresh usage reading, tracking the peak
    pub fn sample_usage_mb(&mut self) -> f64 {
        let usage = self.sampler.usage_mb();
        if usage > self.peak_usage_mb {
            self.peak_usage_mb = usage;
        }
        usage
    }

    fn create_buffer(&mut self, size: usize) {
        match self.slot.create(size) {
            Ok(()) => {
                self.ledger.record(size, Instant::now());
                if self.config.logger_enabled {
                    info!(
                        "Memory buffer initialized: {:.2}MB",
                        size as f64 / 1024.0 / 1024.0
                    );
                }
            }
            Err(e) => warn!("Failed to initialize memory buffer: {}", e),
        }
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn averages(&self) -> RunningAverages {
        self.estimator.averages()
    }

    pub fn memory_usage_avg(&self) -> f64 {
        self.estimator.averages().memory_usage_avg
    }

    pub fn packet_rate_avg(&self) -> f64 {
        self.estimator.averages().packet_rate_avg
    }

    pub fn current_buffer_size(&self) -> usize {
        self.tuner.current_size()
    }

    pub fn current_interval(&self) -> u64 {
        self.tuner.current_interval()
    }

    pub fn last_optimization_impact(&self) -> f64 {
        self.last_impact
    }

    pub fn peak_usage_mb(&self) -> f64 {
        self.peak_usage_mb
    }

    pub fn ledger_len(&self) -> usize {
        self.ledger.len()
    }

    pub fn buffer_ready(&self) -> bool {
        self.slot.is_ready()
    }
}
