//! Host-facing monitoring: memory sampling and status reporting

pub mod report;
pub mod sampler;
