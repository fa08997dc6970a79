//! Tomasulo dynamic-scheduling simulator library.
//!
//! This crate models an out-of-order floating-point core driven by Tomasulo's algorithm:
//! 1. **ISA:** A six-operation instruction set (ADD/SUB/MUL/DIV/LOAD/STORE) and its text parser.
//! 2. **Core:** Register file with renaming tags, reservation-station pools, and a single
//!    result bus.
//! 3. **Scheduler:** The per-cycle write-back, issue and execute phases.
//! 4. **Simulation:** Program loading, the run loop with a cycle watchdog, and statistics.

/// Common types (errors, cycle counter, station tags, operands).
pub mod common;
/// Simulator configuration (latencies, station counts, initial registers).
pub mod config;
/// Machine state and scheduler.
pub mod core;
/// Instruction set (opcodes, instructions, programs, parser).
pub mod isa;
/// Program loader and run driver.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Per-cycle engine; owns the program, registers and stations.
pub use crate::core::Scheduler;
/// Run driver with watchdog and statistics.
pub use crate::sim::Simulator;
