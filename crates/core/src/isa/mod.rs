//! Instruction model.
//!
//! This module covers everything about the instruction stream itself:
//! 1. **Opcodes:** The closed opcode set and the functional-unit class of each.
//! 2. **Instructions:** Decoded records with lifecycle timestamps.
//! 3. **Programs:** The ordered, immutable instruction stream.
//! 4. **Parsing:** Text-to-program decoding.

/// Decoded instruction records.
pub mod instruction;

/// Opcodes and functional-unit classes.
pub mod opcode;

/// Program text parser.
pub mod parse;

/// Ordered instruction stream.
pub mod program;

pub use instruction::{Instruction, InstructionState, Source};
pub use opcode::{FuClass, Opcode};
pub use program::InstructionProgram;
