/// Fluent program construction.
pub mod builder;

/// Simulator harness.
pub mod harness;

/// In-order reference interpreter.
pub mod reference;
