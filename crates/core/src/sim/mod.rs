//! Simulation driver and program loading.
//!
//! Provides the file loader for program text and the [`Simulator`] that runs a
//! scheduler to completion under a cycle watchdog.

pub mod loader;
pub mod simulator;

pub use self::simulator::{RunSummary, Simulator};
