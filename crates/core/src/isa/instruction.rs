//! Decoded instruction records and their lifecycle timestamps.
//!
//! The static part of an [`Instruction`] (opcode, destination, sources) never changes
//! after decoding. The lifecycle timestamps are written by the scheduler, each at most
//! once and in non-decreasing order.

use std::fmt;

use serde::Serialize;

use crate::common::{Cycle, SimError, SimResult, StationId};
use crate::isa::opcode::Opcode;

/// A source operand as written in the program.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Named architectural register.
    Register(String),
    /// Literal value (LOAD's value, or STORE's value when not taken from a register).
    Immediate(f64),
}

impl Source {
    /// Register name, if this source names one.
    pub fn register(&self) -> Option<&str> {
        match self {
            Self::Register(name) => Some(name),
            Self::Immediate(_) => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(name) => f.write_str(name),
            Self::Immediate(v) => write!(f, "{v}"),
        }
    }
}

/// Lifecycle stage of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionState {
    /// Not yet issued.
    Waiting,
    /// Holding a reservation station, waiting for operands.
    Issued,
    /// Operands resolved; the station's cycle counter is advancing.
    Executing,
    /// Result computed, waiting for the result bus.
    Completed,
    /// Result broadcast. Terminal.
    WrittenBack,
}

/// One instruction of a program.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    index: usize,
    opcode: Opcode,
    dest: String,
    src1: Source,
    src2: Option<Source>,

    issue: Option<Cycle>,
    execute_start: Option<Cycle>,
    completion: Option<Cycle>,
    write_back: Option<Cycle>,
    station: Option<StationId>,
}

impl Instruction {
    /// Builds an instruction, checking operand shape against the opcode.
    ///
    /// Arithmetic opcodes take two register sources. LOAD takes a single immediate.
    /// STORE takes a single register or immediate value.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidInstruction`] (with line 0) if the operand shape is wrong.
    pub fn new(
        opcode: Opcode,
        dest: impl Into<String>,
        src1: Source,
        src2: Option<Source>,
    ) -> SimResult<Self> {
        let dest = dest.into();
        let shape_error = |reason: &str| SimError::InvalidInstruction {
            line: 0,
            text: format!("{opcode} {dest}"),
            reason: reason.to_string(),
        };

        match opcode {
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => match (&src1, &src2) {
                (Source::Register(_), Some(Source::Register(_))) => {}
                _ => return Err(shape_error("arithmetic needs two register sources")),
            },
            Opcode::Load => {
                if !matches!(src1, Source::Immediate(_)) || src2.is_some() {
                    return Err(shape_error("LOAD takes exactly one immediate value"));
                }
            }
            Opcode::Store => {
                if src2.is_some() {
                    return Err(shape_error("STORE takes exactly one source"));
                }
            }
        }

        Ok(Self {
            index: 0,
            opcode,
            dest,
            src1,
            src2,
            issue: None,
            execute_start: None,
            completion: None,
            write_back: None,
            station: None,
        })
    }

    /// `dest := a <op> b` for ADD/SUB/MUL/DIV.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidInstruction`] if `opcode` is not arithmetic.
    pub fn arith(opcode: Opcode, dest: &str, a: &str, b: &str) -> SimResult<Self> {
        Self::new(
            opcode,
            dest,
            Source::Register(a.to_string()),
            Some(Source::Register(b.to_string())),
        )
    }

    /// `dest := value`.
    pub fn load(dest: &str, value: f64) -> Self {
        Self {
            index: 0,
            opcode: Opcode::Load,
            dest: dest.to_string(),
            src1: Source::Immediate(value),
            src2: None,
            issue: None,
            execute_start: None,
            completion: None,
            write_back: None,
            station: None,
        }
    }

    /// `dest := src` through the store buffers.
    pub fn store(dest: &str, src: Source) -> Self {
        Self {
            index: 0,
            opcode: Opcode::Store,
            dest: dest.to_string(),
            src1: src,
            src2: None,
            issue: None,
            execute_start: None,
            completion: None,
            write_back: None,
            station: None,
        }
    }

    pub(crate) const fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Program-order index (0-based).
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Operation.
    pub const fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Destination register name.
    pub fn dest(&self) -> &str {
        &self.dest
    }

    /// Source operands, in order. LOAD/STORE have one.
    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        std::iter::once(&self.src1).chain(self.src2.as_ref())
    }

    /// First source operand.
    pub const fn src1(&self) -> &Source {
        &self.src1
    }

    /// Second source operand, absent for LOAD/STORE.
    pub const fn src2(&self) -> Option<&Source> {
        self.src2.as_ref()
    }

    /// Cycle in which the instruction issued.
    pub const fn issue_cycle(&self) -> Option<Cycle> {
        self.issue
    }

    /// First cycle in which its station's counter advanced.
    pub const fn execute_start_cycle(&self) -> Option<Cycle> {
        self.execute_start
    }

    /// Cycle in which execution finished.
    pub const fn completion_cycle(&self) -> Option<Cycle> {
        self.completion
    }

    /// Cycle in which the result was broadcast.
    pub const fn write_back_cycle(&self) -> Option<Cycle> {
        self.write_back
    }

    /// Reservation station assigned at issue.
    pub const fn station(&self) -> Option<StationId> {
        self.station
    }

    /// Current lifecycle stage, derived from the timestamps.
    pub const fn state(&self) -> InstructionState {
        if self.write_back.is_some() {
            InstructionState::WrittenBack
        } else if self.completion.is_some() {
            InstructionState::Completed
        } else if self.execute_start.is_some() {
            InstructionState::Executing
        } else if self.issue.is_some() {
            InstructionState::Issued
        } else {
            InstructionState::Waiting
        }
    }

    /// True once the result has been broadcast.
    pub const fn is_written_back(&self) -> bool {
        self.write_back.is_some()
    }

    pub(crate) fn stamp_issue(&mut self, cycle: Cycle, station: StationId) -> SimResult<()> {
        stamp(&mut self.issue, cycle, None, self.index, "issue")?;
        self.station = Some(station);
        Ok(())
    }

    pub(crate) fn stamp_execute_start(&mut self, cycle: Cycle) -> SimResult<()> {
        stamp(&mut self.execute_start, cycle, self.issue, self.index, "execute")
    }

    pub(crate) fn stamp_completion(&mut self, cycle: Cycle) -> SimResult<()> {
        let floor = self.execute_start.or(self.issue);
        stamp(&mut self.completion, cycle, floor, self.index, "completion")
    }

    /// Stamps the write-back cycle if still unset. Returns false if it was already set.
    pub(crate) fn stamp_write_back(&mut self, cycle: Cycle) -> SimResult<bool> {
        if self.write_back.is_some() {
            return Ok(false);
        }
        stamp(&mut self.write_back, cycle, self.completion, self.index, "write-back")?;
        Ok(true)
    }
}

/// Sets a timestamp once, refusing to go back in time.
fn stamp(
    slot: &mut Option<Cycle>,
    cycle: Cycle,
    floor: Option<Cycle>,
    index: usize,
    what: &str,
) -> SimResult<()> {
    if let Some(prev) = slot {
        return Err(SimError::invariant(format!(
            "instruction {index}: {what} cycle already set to {prev}"
        )));
    }
    match floor {
        Some(floor) if cycle < floor => {
            return Err(SimError::invariant(format!(
                "instruction {index}: {what} cycle {cycle} precedes earlier stage at {floor}"
            )));
        }
        _ => {}
    }
    *slot = Some(cycle);
    Ok(())
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, {}", self.opcode, self.dest, self.src1)?;
        if let Some(src2) = &self.src2 {
            write!(f, ", {src2}")?;
        }
        Ok(())
    }
}
