//! Common types used throughout the simulator.
//!
//! This module provides the building blocks shared by every component:
//! 1. **Error Handling:** The crate-wide [`SimError`] and [`SimResult`].
//! 2. **Tags:** Station ids used as renaming tags, and value-or-tag operand slots.

/// Error types.
pub mod error;

/// Renaming tags, operand slots, and the cycle type.
pub mod tag;

pub use error::{SimError, SimResult};
pub use tag::{Cycle, Operand, StationId};
