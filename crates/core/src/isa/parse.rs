//! Program text parser.
//!
//! One instruction per line:
//!
//! ```text
//! # comment
//! LD    R6, 34          ; LOAD: destination, immediate value
//! MULTD R0  R2  R4      // arithmetic: destination, two source registers
//! SD    R8, R0          # STORE: destination, register or immediate value
//! ```
//!
//! Fields are separated by whitespace and/or commas. Mnemonics are case-insensitive and
//! accept both the canonical (`ADD`, `LOAD`, ...) and double-precision (`ADDD`, `LD`, ...)
//! spellings. Register names are kept verbatim and checked against the configured
//! register set when the scheduler is built.

use crate::common::{SimError, SimResult};
use crate::isa::instruction::{Instruction, Source};
use crate::isa::opcode::Opcode;

/// Parses a whole program. Blank and comment-only lines are skipped.
///
/// # Errors
///
/// [`SimError::InvalidInstruction`] for the first malformed line.
pub fn parse_program(text: &str) -> SimResult<Vec<Instruction>> {
    let mut out = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        if let Some(inst) = parse_line(raw, i + 1)? {
            out.push(inst);
        }
    }
    Ok(out)
}

/// Parses one line. Returns `Ok(None)` for blank or comment-only lines.
///
/// # Errors
///
/// [`SimError::InvalidInstruction`] if the line is not a valid record.
pub fn parse_line(raw: &str, line: usize) -> SimResult<Option<Instruction>> {
    let body = strip_comment(raw).trim();
    if body.is_empty() {
        return Ok(None);
    }

    let invalid = |reason: String| SimError::InvalidInstruction {
        line,
        text: body.to_string(),
        reason,
    };

    let tokens: Vec<&str> = body
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    let (mnemonic, operands) = match tokens.split_first() {
        Some((m, rest)) => (*m, rest),
        None => return Ok(None),
    };
    let opcode = Opcode::from_mnemonic(mnemonic)
        .ok_or_else(|| invalid(format!("unknown opcode `{mnemonic}`")))?;

    let expected = if opcode.is_arithmetic() { 3 } else { 2 };
    if operands.len() != expected {
        return Err(invalid(format!(
            "{opcode} expects {expected} operands, found {}",
            operands.len()
        )));
    }

    let dest = match parse_operand(operands[0]) {
        Some(Source::Register(name)) => name,
        _ => return Err(invalid(format!("bad destination register `{}`", operands[0]))),
    };
    let src1 = parse_operand(operands[1])
        .ok_or_else(|| invalid(format!("bad operand `{}`", operands[1])))?;
    let src2 = match operands.get(2) {
        Some(tok) => Some(
            parse_operand(tok).ok_or_else(|| invalid(format!("bad operand `{tok}`")))?,
        ),
        None => None,
    };

    Instruction::new(opcode, dest, src1, src2)
        .map(Some)
        .map_err(|err| match err {
            SimError::InvalidInstruction { reason, .. } => invalid(reason),
            other => other,
        })
}

/// Classifies a token as a register name or a numeric literal.
fn parse_operand(tok: &str) -> Option<Source> {
    let first = tok.chars().next()?;
    if first.is_ascii_digit() || matches!(first, '-' | '+' | '.') {
        return tok.parse::<f64>().ok().map(Source::Immediate);
    }
    if first.is_ascii_alphabetic() && tok.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Some(Source::Register(tok.to_string()));
    }
    None
}

fn strip_comment(line: &str) -> &str {
    let cut = ["#", ";", "//"]
        .iter()
        .filter_map(|marker| line.find(marker))
        .min()
        .unwrap_or(line.len());
    &line[..cut]
}
