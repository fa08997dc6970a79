//! Simulator error definitions.
//!
//! This module defines the error type shared by every fallible operation in the crate. It covers:
//! 1. **Program errors:** Malformed instruction records and references to undeclared registers.
//! 2. **Configuration errors:** Invalid or unparsable configuration documents.
//! 3. **Internal errors:** Broken scheduler invariants and runaway simulations.
//!
//! A structural hazard (no free reservation station at issue) is deliberately absent:
//! it is a stall, reported through [`crate::core::pool::Allocation`], not an error.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the simulator.
pub type SimResult<T> = Result<T, SimError>;

/// Fatal simulator errors.
///
/// Every variant aborts the run; the scheduler performs no recovery.
#[derive(Debug, Error)]
pub enum SimError {
    /// An instruction record could not be decoded.
    ///
    /// Raised before the simulation starts (unknown mnemonic, wrong operand count,
    /// unparsable immediate).
    #[error("line {line}: invalid instruction `{text}`: {reason}")]
    InvalidInstruction {
        /// 1-based source line of the record.
        line: usize,
        /// The offending record, trimmed.
        text: String,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// A register name that is not part of the configured register set.
    #[error("unknown register `{0}`")]
    UnknownRegister(String),

    /// The program already carries scheduling timestamps from an earlier run.
    #[error("instruction {0} was already scheduled; load the program again to rerun it")]
    ProgramAlreadyScheduled(usize),

    /// An internal consistency check failed.
    ///
    /// Never caused by user input; indicates a defect in the scheduling logic.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The run did not finish within the configured cycle limit.
    #[error("simulation did not finish within {0} cycles")]
    CycleLimitExceeded(u64),

    /// The configuration is structurally valid JSON but semantically wrong.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration document could not be deserialized.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A program or configuration file could not be read.
    #[error("could not read `{}`: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl SimError {
    /// Shorthand for an [`SimError::InvariantViolation`] with a formatted message.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}
