//! Hub polling module.

mod runner;
mod stats;

pub use runner::{HubRunner, RunnerConfig};
pub use stats::RunStats;
