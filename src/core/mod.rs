//! Core module
//!
//! Configuration, logging setup and lifecycle statistics

mod config;
mod debug;
pub mod logging;

pub use config::{ConfigError, ResourceConfig};
pub use debug::{LifecycleStats, SweepReport};
