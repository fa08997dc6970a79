//! The scheduler clock: one call to [`Scheduler::step`] is one machine cycle.
//!
//! Each cycle runs three phases in a fixed order:
//! 1. **Write-back:** The bus winner chosen last cycle broadcasts its result.
//! 2. **Issue:** The next instruction in program order claims a station, or stalls.
//! 3. **Execute:** Armed stations advance; complete stations compete for the bus.
//!
//! Hardware does all of this simultaneously; serializing it in this order guarantees
//! that no phase observes a value another phase of the same cycle has not produced yet.
//! Readiness is latched at the end of the execute phase, so a station whose operands
//! arrive in cycle `t` (at issue or by broadcast) starts counting in cycle `t + 1`.

use crate::common::{Cycle, SimError, SimResult, StationId};
use crate::config::Config;
use crate::core::cdb::{self, BusTransfer};
use crate::core::pool::{Allocation, ReservationStationPool};
use crate::core::regfile::RegisterFile;
use crate::core::snapshot::CycleSnapshot;
use crate::isa::{InstructionProgram, Source};

/// Outcome of the issue phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssueOutcome {
    /// Instruction `index` now occupies `station`.
    Issued {
        /// Program-order index.
        index: usize,
        /// Station granted.
        station: StationId,
    },
    /// Instruction `index` found no free station of its class.
    Stalled {
        /// Program-order index.
        index: usize,
    },
    /// Every instruction has issued.
    Drained,
}

/// Everything that happened in one cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct CycleReport {
    /// Cycle number (1-based).
    pub cycle: Cycle,
    /// Transfer applied in the write-back phase.
    pub written_back: Option<BusTransfer>,
    /// Issue phase outcome.
    pub issue: IssueOutcome,
    /// Instructions whose station reached its latency this cycle.
    pub completed: Vec<usize>,
    /// Winner selected for the next cycle's write-back.
    pub bus_winner: Option<BusTransfer>,
    /// Complete stations that wanted the bus this cycle.
    pub bus_contenders: usize,
}

/// Tomasulo scheduling engine.
///
/// Owns the program, the register file and all reservation stations for one run.
#[derive(Debug)]
pub struct Scheduler {
    program: InstructionProgram,
    regs: RegisterFile,
    pool: ReservationStationPool,
    cycle: Cycle,
    next_issue: usize,
    pending_bus: Option<BusTransfer>,
    last_written_back: Option<BusTransfer>,
}

impl Scheduler {
    /// Builds a scheduler for `program` on the machine described by `config`.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] if the configuration is invalid;
    /// [`SimError::UnknownRegister`] if the program names an undeclared register;
    /// [`SimError::ProgramAlreadyScheduled`] if any instruction already has a timestamp.
    pub fn new(program: InstructionProgram, config: &Config) -> SimResult<Self> {
        config.validate()?;
        if let Some(stamped) = program.iter().find(|i| i.issue_cycle().is_some()) {
            return Err(SimError::ProgramAlreadyScheduled(stamped.index()));
        }
        let regs = RegisterFile::new(&config.registers)?;
        for name in program.register_refs() {
            let _ = regs.index_of(name)?;
        }
        let pool = ReservationStationPool::new(&config.stations, &config.latency)?;

        tracing::debug!(
            instructions = program.len(),
            stations = pool.stations().len(),
            registers = regs.len(),
            "scheduler ready"
        );

        Ok(Self {
            program,
            regs,
            pool,
            cycle: 0,
            next_issue: 0,
            pending_bus: None,
            last_written_back: None,
        })
    }

    /// Runs one cycle.
    ///
    /// # Errors
    ///
    /// Any fatal error raised by a phase; the scheduler must not be stepped again.
    pub fn step(&mut self) -> SimResult<CycleReport> {
        let cycle = self.cycle + 1;

        let written_back = self.write_back_phase(cycle)?;
        let issue = self.issue_phase(cycle)?;
        let (completed, bus_contenders) = self.execute_phase(cycle)?;

        self.cycle = cycle;
        self.last_written_back = written_back;

        Ok(CycleReport {
            cycle,
            written_back,
            issue,
            completed,
            bus_winner: self.pending_bus,
            bus_contenders,
        })
    }

    fn write_back_phase(&mut self, cycle: Cycle) -> SimResult<Option<BusTransfer>> {
        let Some(transfer) = self.pending_bus.take() else {
            return Ok(None);
        };
        let _ = cdb::broadcast(
            &transfer,
            &mut self.regs,
            &mut self.pool,
            &mut self.program,
            cycle,
        )?;
        Ok(Some(transfer))
    }

    fn issue_phase(&mut self, cycle: Cycle) -> SimResult<IssueOutcome> {
        let index = self.next_issue;
        let Some(inst) = self.program.get(index) else {
            return Ok(IssueOutcome::Drained);
        };
        let opcode = inst.opcode();

        let station = match self.pool.allocate(opcode.class(), opcode, index)? {
            Allocation::Granted(id) => id,
            Allocation::NoFreeStation => {
                tracing::trace!(
                    cycle,
                    index,
                    class = %opcode.class(),
                    "issue stalled: no free station"
                );
                return Ok(IssueOutcome::Stalled { index });
            }
        };

        // Sources are read before the destination is renamed, so an instruction that
        // reads its own destination sees the previous producer.
        let sources: Vec<&Source> = inst.sources().collect();
        self.pool.capture_operands(station, &sources, &self.regs)?;
        let dest = self.regs.index_of(inst.dest())?;
        self.regs.rename(dest, station)?;

        tracing::debug!(cycle, index, %station, instruction = %inst, "issue");

        self.program.get_mut(index)?.stamp_issue(cycle, station)?;
        self.next_issue += 1;
        Ok(IssueOutcome::Issued { index, station })
    }

    fn execute_phase(&mut self, cycle: Cycle) -> SimResult<(Vec<usize>, usize)> {
        let mut completed = Vec::new();

        for id in self.pool.busy_ids() {
            let station = self.pool.station(id)?;
            let started = station.elapsed() > 0;
            let Some(index) = station.instruction() else {
                return Err(SimError::invariant(format!("busy station {id} holds no instruction")));
            };

            if !self.pool.tick(id)? {
                continue;
            }
            tracing::trace!(cycle, station = %id, "tick");

            let inst = self.program.get_mut(index)?;
            if !started {
                inst.stamp_execute_start(cycle)?;
            }
            if self.pool.is_complete(id)? {
                inst.stamp_completion(cycle)?;
                completed.push(index);
                tracing::debug!(cycle, station = %id, index, "complete");
            }
        }

        if self.pending_bus.is_some() {
            return Err(SimError::invariant(format!(
                "cycle {cycle}: a second bus winner was selected before write-back"
            )));
        }
        let arbitration = cdb::arbitrate(&self.pool)?;
        if arbitration.losers() > 0 {
            tracing::trace!(cycle, losers = arbitration.losers(), "result bus contention");
        }
        self.pending_bus = arbitration.winner;

        let _ = self.pool.arm_ready();
        Ok((completed, arbitration.contenders))
    }

    /// True once every instruction has written back.
    pub fn is_finished(&self) -> bool {
        self.program.is_finished()
    }

    /// Number of cycles run so far.
    pub const fn cycle(&self) -> Cycle {
        self.cycle
    }

    /// Index of the next instruction to issue.
    pub const fn next_issue(&self) -> usize {
        self.next_issue
    }

    /// Bus winner waiting for the next write-back phase.
    pub const fn pending_bus(&self) -> Option<BusTransfer> {
        self.pending_bus
    }

    /// The program, with lifecycle timestamps filled in so far.
    pub const fn program(&self) -> &InstructionProgram {
        &self.program
    }

    /// Register file.
    pub const fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Reservation stations.
    pub const fn stations(&self) -> &ReservationStationPool {
        &self.pool
    }

    /// Snapshot of the machine as of the end of the last cycle.
    pub fn snapshot(&self) -> CycleSnapshot {
        CycleSnapshot::capture(
            self.cycle,
            self.last_written_back,
            self.pending_bus,
            &self.program,
            &self.pool,
            &self.regs,
        )
    }

    /// Gives back the program with its timeline.
    pub fn into_program(self) -> InstructionProgram {
        self.program
    }
}
