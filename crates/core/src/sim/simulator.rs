//! Simulator: runs a scheduler to completion and collects statistics.
//!
//! The scheduler itself never stops on its own; the simulator owns the termination
//! check and the cycle watchdog that turns a runaway run into an error.

use serde::Serialize;

use crate::common::{Cycle, SimError, SimResult};
use crate::config::Config;
use crate::core::{CycleReport, CycleSnapshot, InstructionStatus, RegisterStatus, Scheduler};
use crate::isa::InstructionProgram;
use crate::stats::SimStats;

/// Final state of a finished run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    /// Cycles taken.
    pub cycles: Cycle,
    /// Per-instruction timeline.
    pub instructions: Vec<InstructionStatus>,
    /// Final register values.
    pub registers: Vec<RegisterStatus>,
}

/// Top-level simulator: scheduler + statistics + watchdog.
#[derive(Debug)]
pub struct Simulator {
    scheduler: Scheduler,
    stats: SimStats,
    max_cycles: u64,
    trace: bool,
}

impl Simulator {
    /// Creates a simulator for `program` on the machine described by `config`.
    ///
    /// # Errors
    ///
    /// As [`Scheduler::new`].
    pub fn new(program: InstructionProgram, config: &Config) -> SimResult<Self> {
        let scheduler = Scheduler::new(program, config)?;
        Ok(Self {
            scheduler,
            stats: SimStats::default(),
            max_cycles: config.general.max_cycles,
            trace: config.general.trace,
        })
    }

    /// Advances the simulator by one clock cycle.
    ///
    /// # Errors
    ///
    /// [`SimError::CycleLimitExceeded`] once the watchdog limit is reached, or any
    /// fatal scheduler error.
    pub fn tick(&mut self) -> SimResult<CycleReport> {
        if self.scheduler.cycle() >= self.max_cycles {
            return Err(SimError::CycleLimitExceeded(self.max_cycles));
        }
        let report = self.scheduler.step()?;
        self.stats.record(&report, self.scheduler.program());
        if self.trace {
            self.trace_cycle();
        }
        Ok(report)
    }

    fn trace_cycle(&self) {
        let snapshot = self.scheduler.snapshot();
        match serde_json::to_string(&snapshot) {
            Ok(json) => tracing::info!(cycle = snapshot.cycle, snapshot = %json, "cycle"),
            Err(e) => {
                tracing::warn!(cycle = snapshot.cycle, error = %e, "snapshot not serializable");
            }
        }
    }

    /// Runs until every instruction has written back.
    ///
    /// # Errors
    ///
    /// As [`Simulator::tick`].
    pub fn run(&mut self) -> SimResult<RunSummary> {
        self.run_with(|_| {})
    }

    /// Runs to completion, handing the snapshot of every cycle to `observer`.
    ///
    /// # Errors
    ///
    /// As [`Simulator::tick`].
    pub fn run_with<F>(&mut self, mut observer: F) -> SimResult<RunSummary>
    where
        F: FnMut(&CycleSnapshot),
    {
        tracing::info!(
            instructions = self.scheduler.program().len(),
            max_cycles = self.max_cycles,
            "simulation start"
        );
        while !self.scheduler.is_finished() {
            let _ = self.tick()?;
            observer(&self.scheduler.snapshot());
        }
        tracing::info!(
            cycles = self.scheduler.cycle(),
            ipc = self.stats.ipc(),
            "simulation finished"
        );
        Ok(self.summary())
    }

    /// Final timeline and register values as of now.
    pub fn summary(&self) -> RunSummary {
        let snapshot = self.scheduler.snapshot();
        RunSummary {
            cycles: snapshot.cycle,
            instructions: snapshot.instructions,
            registers: snapshot.registers,
        }
    }

    /// True once every instruction has written back.
    pub fn is_finished(&self) -> bool {
        self.scheduler.is_finished()
    }

    /// The underlying scheduler.
    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Statistics collected so far.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Snapshot of the machine after the last cycle.
    pub fn snapshot(&self) -> CycleSnapshot {
        self.scheduler.snapshot()
    }
}
