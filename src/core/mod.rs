//! Core control loop: estimation, tuning, strategy selection and the
//! orchestrating pulse controller

pub mod advice;
pub mod buffer;
pub mod config;
pub mod controller;
pub mod ledger;
pub mod metrics;
pub mod tuner;
