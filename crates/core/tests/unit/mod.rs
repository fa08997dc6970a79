//! # Unit Components
//!
//! Tests grouped by the component they exercise: configuration, the instruction
//! model, the scheduler's timing, hazard handling, whole-run properties, the run
//! driver and statistics.



/// Program text parsing and instruction shape checks.
pub mod isa;

/// Randomized whole-program invariants.
pub mod properties;


/// Program loading, the run loop and the watchdog.
pub mod sim;

/// Statistics gathered over complete runs.
pub mod stats;
