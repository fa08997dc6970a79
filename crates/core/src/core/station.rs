//! A single reservation station.
//!
//! A station holds one in-flight instruction: its opcode, an operand slot per source
//! (value or producer tag), and its execution progress. Stations never move between
//! pools; their id is fixed at construction and doubles as the renaming tag for the
//! result they produce.

use serde::Serialize;

use crate::common::{Operand, SimError, SimResult, StationId};
use crate::isa::{FuClass, Opcode};

/// Lifecycle stage of a station.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StationState {
    /// Not holding an instruction.
    Free,
    /// Allocated; operands pending or execution not yet started.
    WaitingOperands,
    /// Counter advancing towards the latency.
    Executing,
    /// Latency reached; waiting to win the result bus.
    Completed,
}

/// One reservation station (or load/store buffer).
#[derive(Clone, Debug)]
pub struct ReservationStation {
    id: StationId,
    class: FuClass,
    ordinal: usize,

    busy: bool,
    opcode: Option<Opcode>,
    src1: Option<Operand>,
    src2: Option<Operand>,
    elapsed: u64,
    latency: u64,
    armed: bool,
    instruction: Option<usize>,
}

impl ReservationStation {
    /// Creates a free station. `ordinal` is its 1-based position within its pool.
    pub const fn new(id: StationId, class: FuClass, ordinal: usize) -> Self {
        Self {
            id,
            class,
            ordinal,
            busy: false,
            opcode: None,
            src1: None,
            src2: None,
            elapsed: 0,
            latency: 0,
            armed: false,
            instruction: None,
        }
    }

    /// Station id / renaming tag.
    pub const fn id(&self) -> StationId {
        self.id
    }

    /// Functional-unit class.
    pub const fn class(&self) -> FuClass {
        self.class
    }

    /// Display name, e.g. `Add1` or `Load2`.
    pub fn name(&self) -> String {
        format!("{}{}", self.class.station_prefix(), self.ordinal)
    }

    /// True while holding an instruction.
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// Opcode being executed, if busy.
    pub const fn opcode(&self) -> Option<Opcode> {
        self.opcode
    }

    /// Operand slots. The second slot is unused by LOAD and STORE.
    pub const fn operands(&self) -> (Option<Operand>, Option<Operand>) {
        (self.src1, self.src2)
    }

    /// Cycles of execution completed so far.
    pub const fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Cycles of execution required.
    pub const fn latency(&self) -> u64 {
        self.latency
    }

    /// Program-order index of the instruction held.
    pub const fn instruction(&self) -> Option<usize> {
        self.instruction
    }

    /// True when every used operand slot holds a value.
    pub fn operands_ready(&self) -> bool {
        self.busy
            && self.src1.is_some_and(Operand::is_resolved)
            && self.src2.is_none_or(Operand::is_resolved)
    }

    /// True once readiness has been latched and the counter may advance.
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// True iff the counter has reached the latency.
    pub const fn is_complete(&self) -> bool {
        self.busy && self.latency > 0 && self.elapsed == self.latency
    }

    /// Current lifecycle stage.
    pub const fn state(&self) -> StationState {
        if !self.busy {
            StationState::Free
        } else if self.is_complete() {
            StationState::Completed
        } else if self.armed {
            StationState::Executing
        } else {
            StationState::WaitingOperands
        }
    }

    /// Claims the station for an instruction. Operands are filled separately.
    pub(crate) fn occupy(
        &mut self,
        opcode: Opcode,
        latency: u64,
        instruction: usize,
    ) -> SimResult<()> {
        if self.busy {
            return Err(SimError::invariant(format!(
                "station {} allocated while busy",
                self.name()
            )));
        }
        if opcode.class() != self.class {
            return Err(SimError::invariant(format!(
                "{opcode} cannot run on {} station {}",
                self.class,
                self.name()
            )));
        }
        self.busy = true;
        self.opcode = Some(opcode);
        self.latency = latency;
        self.elapsed = 0;
        self.armed = false;
        self.instruction = Some(instruction);
        Ok(())
    }

    pub(crate) fn set_operands(&mut self, src1: Operand, src2: Option<Operand>) {
        self.src1 = Some(src1);
        self.src2 = src2;
    }

    /// Replaces `tag` with `value` in any slot waiting on it. Returns true if a slot changed.
    pub(crate) fn capture(&mut self, tag: StationId, value: f64) -> bool {
        if !self.busy {
            return false;
        }
        let mut changed = false;
        for slot in [&mut self.src1, &mut self.src2].into_iter().flatten() {
            changed |= slot.capture(tag, value);
        }
        changed
    }

    /// Latches readiness at the end of a cycle. Returns true if newly armed.
    pub(crate) fn arm_if_ready(&mut self) -> bool {
        if !self.armed && self.operands_ready() {
            self.armed = true;
            return true;
        }
        false
    }

    /// Advances the counter by one, saturating at the latency. Returns true if it moved.
    pub(crate) fn tick(&mut self) -> bool {
        if self.busy && self.armed && self.elapsed < self.latency {
            self.elapsed += 1;
            return true;
        }
        false
    }

    /// Applies the opcode to the resolved operands.
    ///
    /// # Errors
    ///
    /// [`SimError::InvariantViolation`] if the station is free or an operand is still pending.
    pub fn compute(&self) -> SimResult<f64> {
        let op = self.opcode.ok_or_else(|| {
            SimError::invariant(format!("compute on free station {}", self.name()))
        })?;
        let a = self.src1.and_then(Operand::value);
        let b = match self.src2 {
            Some(slot) => slot.value(),
            None => Some(0.0),
        };
        match (a, b) {
            (Some(a), Some(b)) => Ok(op.evaluate(a, b)),
            _ => Err(SimError::invariant(format!(
                "compute on station {} with unresolved operands",
                self.name()
            ))),
        }
    }

    /// Returns the station to the free pool. Releasing a free station does nothing.
    /// Returns true if the station was busy.
    pub(crate) fn release(&mut self) -> bool {
        if !self.busy {
            return false;
        }
        self.busy = false;
        self.opcode = None;
        self.src1 = None;
        self.src2 = None;
        self.elapsed = 0;
        self.latency = 0;
        self.armed = false;
        self.instruction = None;
        true
    }
}
