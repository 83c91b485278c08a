//! Memory Pulse
//!
//! A self-tuning controller for a logical packet buffer. It observes a
//! stream of outbound packet events, keeps exponentially smoothed load
//! statistics, and periodically retunes its own buffer size and cadence
//! before applying one of four access-pattern advice strategies.
//!
//! ## How it fits together
//!
//! - **MetricsEstimator**: EMA of memory usage and packet rate
//! - **AllocationLedger**: time-stamped logical allocations, reclaimed in
//!   bulk once the queue grows past a pressure threshold
//! - **BufferController**: hysteresis-gated resize and re-interval from a
//!   blended load factor
//! - **AdviceStrategist**: threshold-driven strategy selection applied to
//!   the owned buffer
//! - **PulseController**: wires everything behind two triggers,
//!   [`PulseController::on_event`] and [`PulseController::on_tick`]
//!
//! The host scheduler owns actual timing; the controller only recommends
//! an interval and reports when it changes.

pub mod core;
pub mod monitor;

// Re-exports
pub use core::advice::{Advice, AdviceStrategist};
pub use core::buffer::{BufferError, BufferSlot, LogicalBuffer};
pub use core::config::PulseConfig;
pub use core::controller::{PacketEvent, PulseController, TickReport};
pub use core::ledger::AllocationLedger;
pub use core::metrics::{MetricsEstimator, RunningAverages};
pub use core::tuner::{BufferController, Retune};
pub use monitor::report::StatusSnapshot;
pub use monitor::sampler::{MemorySampler, ProcessMemorySampler, ScriptedSampler};
