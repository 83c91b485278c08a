//! Access-pattern advice strategies
//!
//! Approximations of madvise-style hints applied to the owned logical
//! buffer. These are internal access simulations, not OS page-advise
//! calls: DontNeed resets the region, WillNeed warms the head, Sequential
//! strides a fill pattern through it, Random touches one arbitrary chunk.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::buffer::{BufferError, BufferSlot};
use super::config::PulseConfig;
use super::metrics::RunningAverages;

/// Smallest advice chunk in bytes
pub const MIN_CHUNK_SIZE: usize = 64;

/// Largest advice chunk in bytes
pub const MAX_CHUNK_SIZE: usize = 1024;

/// Access-pattern strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Advice {
    /// Release and recreate the region
    #[default]
    DontNeed,
    /// Warm the head of the region
    WillNeed,
    /// Strided linear-access pass
    Sequential,
    /// Touch one random chunk
    Random,
}

impl Advice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Advice::DontNeed => "dont-need",
            Advice::WillNeed => "will-need",
            Advice::Sequential => "sequential",
            Advice::Random => "random",
        }
    }
}

impl std::fmt::Display for Advice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of applying a strategy to the buffer
#[derive(Debug, Clone, Copy, Default)]
pub struct AdviceOutcome {
    /// Bytes read or written during the pass
    pub touched_bytes: usize,
    /// The buffer was destroyed and recreated
    pub recreated: bool,
}

/// Chunk size for one advice pass at the given buffer size
pub fn chunk_size_for(buffer_size: usize) -> usize {
    (buffer_size / 1024).clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

/// Selects and applies access-pattern strategies
#[derive(Debug)]
pub struct AdviceStrategist {
    rng: StdRng,
}

impl AdviceStrategist {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic strategist for reproducible access patterns
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick a strategy from current averages; first matching rule wins
    pub fn select(&self, averages: RunningAverages, config: &PulseConfig) -> Advice {
        if averages.memory_usage_avg > config.memory_threshold_mb * 1.5 {
            Advice::DontNeed
        } else if averages.packet_rate_avg > config.packet_threshold {
            Advice::Sequential
        } else if averages.memory_usage_avg < config.memory_threshold_mb * 0.5 {
            Advice::WillNeed
        } else {
            config.default_advice
        }
    }

    /// Apply `advice` to the buffer in `slot`
    ///
    /// `buffer_size` is the current tuned size; DontNeed recreates the
    /// buffer at that size. An empty slot is a silent no-op for every
    /// strategy except DontNeed, which always attempts a fresh creation.
    pub fn apply(
        &mut self,
        advice: Advice,
        slot: &mut BufferSlot,
        buffer_size: usize,
    ) -> Result<AdviceOutcome, BufferError> {
        let chunk = chunk_size_for(buffer_size);

        match advice {
            Advice::DontNeed => {
                slot.create(buffer_size)?;
                Ok(AdviceOutcome {
                    touched_bytes: 0,
                    recreated: true,
                })
            }
            Advice::WillNeed => {
                let touched = slot
                    .get()
                    .map(|buf| buf.read_at(0, chunk).len())
                    .unwrap_or(0);
                Ok(AdviceOutcome {
                    touched_bytes: touched,
                    recreated: false,
                })
            }
            Advice::Sequential => {
                let mut touched = 0;
                if let Some(buf) = slot.get_mut() {
                    let steps = buffer_size / chunk / 4;
                    for i in 0..steps {
                        touched += buf.fill_at(i * chunk * 4, chunk, b'S');
                    }
                }
                Ok(AdviceOutcome {
                    touched_bytes: touched,
                    recreated: false,
                })
            }
            Advice::Random => {
                let mut touched = 0;
                if let Some(buf) = slot.get() {
                    if buffer_size > 0 {
                        let offset = self.rng.gen_range(0..buffer_size);
                        touched = buf.read_at(offset, chunk).len();
                    }
                }
                Ok(AdviceOutcome {
                    touched_bytes: touched,
                    recreated: false,
                })
            }
        }
    }
}

impl Default for AdviceStrategist {
    fn default() -> Self {
        Self::new()
    }
}
