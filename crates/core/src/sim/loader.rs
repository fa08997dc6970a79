//! Program loader.
//!
//! Reads a program text file from disk and decodes it. The accepted syntax is
//! described in [`crate::isa::parse`].

use std::fs;
use std::path::Path;

use crate::common::{SimError, SimResult};
use crate::isa::InstructionProgram;

/// Loads and parses a program file.
///
/// # Errors
///
/// [`SimError::Io`] if the file cannot be read;
/// [`SimError::InvalidInstruction`] for the first malformed line.
pub fn load_program(path: impl AsRef<Path>) -> SimResult<InstructionProgram> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let program = InstructionProgram::parse(&text)?;
    tracing::info!(path = %path.display(), instructions = program.len(), "program loaded");
    Ok(program)
}
