//! Ordered instruction stream.

use std::ops::Index;
use std::str::FromStr;

use crate::common::{SimError, SimResult};
use crate::isa::instruction::Instruction;
use crate::isa::parse;

/// An ordered sequence of decoded instructions.
///
/// The static fields of each instruction are fixed once the program is built; only the
/// scheduler writes lifecycle timestamps, through crate-private accessors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstructionProgram {
    instructions: Vec<Instruction>,
}

impl InstructionProgram {
    /// Builds a program, numbering instructions in the given order.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        let mut instructions = instructions;
        for (i, inst) in instructions.iter_mut().enumerate() {
            inst.set_index(i);
        }
        Self { instructions }
    }

    /// Parses program text. See [`crate::isa::parse`] for the accepted syntax.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidInstruction`] for the first malformed line.
    pub fn parse(text: &str) -> SimResult<Self> {
        parse::parse_program(text).map(Self::new)
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instruction at a program-order index.
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> SimResult<&mut Instruction> {
        self.instructions
            .get_mut(index)
            .ok_or_else(|| SimError::invariant(format!("no instruction at index {index}")))
    }

    /// Iterates in program order.
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    /// True once every instruction has written back.
    pub fn is_finished(&self) -> bool {
        self.instructions.iter().all(Instruction::is_written_back)
    }

    /// Every register name mentioned by the program, destinations included.
    pub fn register_refs(&self) -> impl Iterator<Item = &str> {
        self.instructions.iter().flat_map(|inst| {
            std::iter::once(inst.dest()).chain(inst.sources().filter_map(|src| src.register()))
        })
    }
}

impl Index<usize> for InstructionProgram {
    type Output = Instruction;

    fn index(&self, index: usize) -> &Instruction {
        &self.instructions[index]
    }
}

impl<'a> IntoIterator for &'a InstructionProgram {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

impl FromStr for InstructionProgram {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        Self::parse(s)
    }
}
