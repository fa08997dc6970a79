//! Register file and register alias table.
//!
//! Each architectural register holds its committed value and, optionally, the tag of
//! the single in-flight station that will next write it. This enables the issue stage
//! to capture either a value or a tag per source operand with one lookup.

use std::collections::HashMap;

use serde::Serialize;

use crate::common::{Operand, SimError, SimResult, StationId};
use crate::config::RegisterConfig;

/// Index of a register in the configured register set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegIdx(pub usize);

/// One architectural register.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Register {
    /// Name as used in program text.
    pub name: String,
    /// Last value written back (or the initial value).
    pub value: f64,
    /// Station that will produce the next value, if any.
    pub pending: Option<StationId>,
}

/// Register file with an integrated alias table.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    regs: Vec<Register>,
    by_name: HashMap<String, RegIdx>,
}

impl RegisterFile {
    /// Builds the register file from the configured registers, in order.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] if a name is declared twice.
    pub fn new(config: &[RegisterConfig]) -> SimResult<Self> {
        let mut regs = Vec::with_capacity(config.len());
        let mut by_name = HashMap::with_capacity(config.len());
        for (i, reg) in config.iter().enumerate() {
            if by_name.insert(reg.name.clone(), RegIdx(i)).is_some() {
                return Err(SimError::InvalidConfig(format!(
                    "register `{}` declared twice",
                    reg.name
                )));
            }
            regs.push(Register {
                name: reg.name.clone(),
                value: reg.value,
                pending: None,
            });
        }
        Ok(Self { regs, by_name })
    }

    /// Looks a register up by name.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownRegister`] if the name is not configured.
    pub fn index_of(&self, name: &str) -> SimResult<RegIdx> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownRegister(name.to_string()))
    }

    /// Number of registers.
    pub fn len(&self) -> usize {
        self.regs.len()
    }

    /// True if no registers are configured.
    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }

    /// Reads a register as the issue stage sees it: its value if no producer is
    /// pending, otherwise the producer's tag.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownRegister`] if the index is out of range.
    pub fn read(&self, reg: RegIdx) -> SimResult<Operand> {
        let r = self.get(reg)?;
        Ok(match r.pending {
            Some(tag) => Operand::Pending(tag),
            None => Operand::Resolved(r.value),
        })
    }

    /// [`RegisterFile::read`] by name.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownRegister`] if the name is not configured.
    pub fn read_named(&self, name: &str) -> SimResult<Operand> {
        self.read(self.index_of(name)?)
    }

    /// Marks `reg` as produced by `tag`.
    ///
    /// Overwrites any earlier pending tag: the last instruction to rename a register
    /// is the only one whose result will be written into it.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownRegister`] if the index is out of range.
    pub fn rename(&mut self, reg: RegIdx, tag: StationId) -> SimResult<()> {
        let r = self.get_mut(reg)?;
        if let Some(prev) = r.pending {
            tracing::trace!(register = %r.name, %prev, %tag, "rename supersedes pending producer");
        }
        r.pending = Some(tag);
        Ok(())
    }

    /// Writes `value` into every register still waiting on `tag` and clears the tag.
    ///
    /// Registers renamed to a different station since `tag` was assigned are left
    /// untouched. Returns the number of registers updated.
    pub fn resolve(&mut self, tag: StationId, value: f64) -> usize {
        let mut updated = 0;
        for r in &mut self.regs {
            if r.pending == Some(tag) {
                r.value = value;
                r.pending = None;
                updated += 1;
            }
        }
        updated
    }

    /// Committed value of a register, ignoring any pending producer.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownRegister`] if the index is out of range.
    pub fn value(&self, reg: RegIdx) -> SimResult<f64> {
        Ok(self.get(reg)?.value)
    }

    /// Pending producer of a register.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownRegister`] if the index is out of range.
    pub fn pending(&self, reg: RegIdx) -> SimResult<Option<StationId>> {
        Ok(self.get(reg)?.pending)
    }

    /// Committed value by name, for tests and reporting.
    pub fn value_of(&self, name: &str) -> Option<f64> {
        self.by_name.get(name).map(|idx| self.regs[idx.0].value)
    }

    /// All registers in configuration order.
    pub fn registers(&self) -> &[Register] {
        &self.regs
    }

    /// True if any register is waiting on a producer.
    pub fn has_pending(&self) -> bool {
        self.regs.iter().any(|r| r.pending.is_some())
    }

    fn get(&self, reg: RegIdx) -> SimResult<&Register> {
        self.regs
            .get(reg.0)
            .ok_or_else(|| SimError::UnknownRegister(format!("r{}", reg.0)))
    }

    fn get_mut(&mut self, reg: RegIdx) -> SimResult<&mut Register> {
        self.regs
            .get_mut(reg.0)
            .ok_or_else(|| SimError::UnknownRegister(format!("r{}", reg.0)))
    }
}
