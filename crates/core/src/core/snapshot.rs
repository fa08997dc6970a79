//! Read-only views of scheduler state, taken after a cycle's phases complete.
//!
//! Snapshots are plain data: renderers format them, tests assert on them, and the
//! CLI serializes them to JSON.

use serde::Serialize;

use crate::common::{Cycle, Operand, StationId};
use crate::core::cdb::BusTransfer;
use crate::core::pool::ReservationStationPool;
use crate::core::regfile::RegisterFile;
use crate::core::station::StationState;
use crate::isa::{FuClass, InstructionProgram, InstructionState, Opcode, Source};

/// Status of one instruction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InstructionStatus {
    /// Program-order index.
    pub index: usize,
    /// Assembly text.
    pub text: String,
    /// Operation.
    pub opcode: Opcode,
    /// Destination register.
    pub dest: String,
    /// First source (`j`).
    pub src1: Source,
    /// Second source (`k`); absent for LOAD and STORE.
    pub src2: Option<Source>,
    /// Lifecycle stage.
    pub state: InstructionState,
    /// Station assigned at issue.
    pub station: Option<StationId>,
    /// Issue cycle.
    pub issue: Option<Cycle>,
    /// First execution cycle.
    pub execute_start: Option<Cycle>,
    /// Completion cycle.
    pub completion: Option<Cycle>,
    /// Write-back cycle.
    pub write_back: Option<Cycle>,
}

/// Status of one reservation station.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StationStatus {
    /// Id / tag.
    pub id: StationId,
    /// Display name (`Add1`, `Load2`, ...).
    pub name: String,
    /// Pool.
    pub class: FuClass,
    /// Lifecycle stage.
    pub state: StationState,
    /// True while holding an instruction.
    pub busy: bool,
    /// Operation being executed.
    pub opcode: Option<Opcode>,
    /// First operand slot (`Vj`/`Qj`).
    pub src1: Option<Operand>,
    /// Second operand slot (`Vk`/`Qk`); unused by LOAD and STORE.
    pub src2: Option<Operand>,
    /// Execution cycles done.
    pub elapsed: u64,
    /// Execution cycles required.
    pub latency: u64,
    /// Instruction held.
    pub instruction: Option<usize>,
}

impl StationStatus {
    /// Cycles of execution left, if executing.
    pub const fn remaining(&self) -> Option<u64> {
        match self.state {
            StationState::Executing | StationState::Completed => {
                Some(self.latency.saturating_sub(self.elapsed))
            }
            StationState::Free | StationState::WaitingOperands => None,
        }
    }
}

/// Status of one register.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegisterStatus {
    /// Name.
    pub name: String,
    /// Committed value.
    pub value: f64,
    /// Pending producer.
    pub pending: Option<StationId>,
}

/// Everything observable about the machine at the end of one cycle.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CycleSnapshot {
    /// Cycle that just finished.
    pub cycle: Cycle,
    /// Transfer applied during this cycle's write-back phase.
    pub written_back: Option<BusTransfer>,
    /// Winner selected for the next cycle's write-back.
    pub bus_winner: Option<BusTransfer>,
    /// Per-instruction status, in program order.
    pub instructions: Vec<InstructionStatus>,
    /// Per-station status, in class-then-id order.
    pub stations: Vec<StationStatus>,
    /// Per-register status, in configuration order.
    pub registers: Vec<RegisterStatus>,
}

impl CycleSnapshot {
    pub(crate) fn capture(
        cycle: Cycle,
        written_back: Option<BusTransfer>,
        bus_winner: Option<BusTransfer>,
        program: &InstructionProgram,
        pool: &ReservationStationPool,
        regs: &RegisterFile,
    ) -> Self {
        let instructions = program
            .iter()
            .map(|inst| InstructionStatus {
                index: inst.index(),
                text: inst.to_string(),
                opcode: inst.opcode(),
                dest: inst.dest().to_string(),
                src1: inst.src1().clone(),
                src2: inst.src2().cloned(),
                state: inst.state(),
                station: inst.station(),
                issue: inst.issue_cycle(),
                execute_start: inst.execute_start_cycle(),
                completion: inst.completion_cycle(),
                write_back: inst.write_back_cycle(),
            })
            .collect();

        let stations = pool
            .stations()
            .iter()
            .map(|rs| {
                let (src1, src2) = rs.operands();
                StationStatus {
                    id: rs.id(),
                    name: rs.name(),
                    class: rs.class(),
                    state: rs.state(),
                    busy: rs.is_busy(),
                    opcode: rs.opcode(),
                    src1,
                    src2,
                    elapsed: rs.elapsed(),
                    latency: rs.latency(),
                    instruction: rs.instruction(),
                }
            })
            .collect();

        let registers = regs
            .registers()
            .iter()
            .map(|r| RegisterStatus {
                name: r.name.clone(),
                value: r.value,
                pending: r.pending,
            })
            .collect();

        Self {
            cycle,
            written_back,
            bus_winner,
            instructions,
            stations,
            registers,
        }
    }

    /// Register status by name.
    pub fn register(&self, name: &str) -> Option<&RegisterStatus> {
        self.registers.iter().find(|r| r.name == name)
    }

    /// Station status by id.
    pub fn station(&self, id: StationId) -> Option<&StationStatus> {
        self.stations.iter().find(|s| s.id == id)
    }

    /// Display name of a station, falling back to its tag.
    pub fn station_name(&self, id: StationId) -> String {
        self.station(id)
            .map_or_else(|| id.to_string(), |s| s.name.clone())
    }
}
