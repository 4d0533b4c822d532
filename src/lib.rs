//! matbexp: scenario and stimulus generation for MATB-II experiments.
//!
//! This crate produces the deterministic inputs of a simulated
//! multi-attribute task battery session: randomized but seed-reproducible
//! MATB-EVENTS XML scripts, merged auditory stimulus tracks, and fixation
//! video frames. Each tool runs once per invocation and writes flat output
//! files; nothing here is a long-running service.

pub mod config;
pub mod error;
pub mod fsutil;
pub mod logging;
pub mod matbii;
pub mod scenarios;
pub mod stimuli;

pub use config::{CommStems, Condition, ParamsFile, ScenarioParams, Version};
pub use error::{Error, Result};
