//! Simulation statistics collection and reporting.
//!
//! This module tracks scheduling metrics for a Tomasulo run. It provides:
//! 1. **Cycle and IPC:** Total cycles, issued and written-back instructions, and derived IPC/CPI.
//! 2. **Hazards:** Structural issue stalls and result-bus contention.
//! 3. **Units:** Broadcasts per functional-unit class.

use std::io::{self, Write};
use std::time::Instant;

use serde::Serialize;

use crate::core::CycleReport;
use crate::core::scheduler::IssueOutcome;
use crate::isa::{FuClass, InstructionProgram};

/// Simulation statistics for one run.
#[derive(Clone, Debug, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    /// Cycles simulated.
    pub cycles: u64,
    /// Instructions that claimed a reservation station.
    pub instructions_issued: u64,
    /// Instructions whose result crossed the bus.
    pub instructions_written_back: u64,

    /// Cycles in which the next instruction found no free station of its class.
    pub stalls_issue: u64,
    /// Cycles in which more than one complete station wanted the bus.
    pub bus_contention_cycles: u64,
    /// Sum over cycles of complete stations that lost arbitration.
    pub bus_losers: u64,

    /// Broadcasts from the add/sub stations.
    pub broadcasts_add: u64,
    /// Broadcasts from the mul/div stations.
    pub broadcasts_mul: u64,
    /// Broadcasts from the load buffers.
    pub broadcasts_load: u64,
    /// Broadcasts from the store buffers.
    pub broadcasts_store: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_issued: 0,
            instructions_written_back: 0,
            stalls_issue: 0,
            bus_contention_cycles: 0,
            bus_losers: 0,
            broadcasts_add: 0,
            broadcasts_mul: 0,
            broadcasts_load: 0,
            broadcasts_store: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"hazards"`, `"units"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "hazards", "units"];

impl SimStats {
    /// Folds one cycle's report into the counters.
    ///
    /// `program` is used to attribute the written-back instruction to its unit class.
    pub fn record(&mut self, report: &CycleReport, program: &InstructionProgram) {
        self.cycles = report.cycle;
        match report.issue {
            IssueOutcome::Issued { .. } => self.instructions_issued += 1,
            IssueOutcome::Stalled { .. } => self.stalls_issue += 1,
            IssueOutcome::Drained => {}
        }
        if let Some(transfer) = report.written_back {
            self.instructions_written_back += 1;
            if let Some(inst) = program.get(transfer.instruction) {
                *self.broadcasts_mut(inst.opcode().class()) += 1;
            }
        }
        if report.bus_contenders > 1 {
            self.bus_contention_cycles += 1;
            self.bus_losers += (report.bus_contenders - 1) as u64;
        }
    }

    fn broadcasts_mut(&mut self, class: FuClass) -> &mut u64 {
        match class {
            FuClass::AddSub => &mut self.broadcasts_add,
            FuClass::MulDiv => &mut self.broadcasts_mul,
            FuClass::Load => &mut self.broadcasts_load,
            FuClass::Store => &mut self.broadcasts_store,
        }
    }

    /// Broadcast count of one class.
    pub const fn broadcasts(&self, class: FuClass) -> u64 {
        match class {
            FuClass::AddSub => self.broadcasts_add,
            FuClass::MulDiv => self.broadcasts_mul,
            FuClass::Load => self.broadcasts_load,
            FuClass::Store => self.broadcasts_store,
        }
    }

    /// Written-back instructions per cycle; 0 for an empty run.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            return 0.0;
        }
        self.instructions_written_back as f64 / self.cycles as f64
    }

    /// Writes the requested sections to `out`. An empty `sections` writes all of them.
    ///
    /// # Errors
    ///
    /// Any error from `out`.
    pub fn write_sections<W: Write>(&self, out: &mut W, sections: &[String]) -> io::Result<()> {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let cyc = self.cycles.max(1) as f64;
        let instr = self.instructions_written_back.max(1) as f64;

        if want("summary") {
            let seconds = self.start_time.elapsed().as_secs_f64();
            writeln!(out, "\n==========================================================")?;
            writeln!(out, "TOMASULO SCHEDULING STATISTICS")?;
            writeln!(out, "==========================================================")?;
            writeln!(out, "host_seconds             {seconds:.4} s")?;
            writeln!(out, "sim_cycles               {}", self.cycles)?;
            writeln!(out, "sim_insts_issued         {}", self.instructions_issued)?;
            writeln!(out, "sim_insts_written_back   {}", self.instructions_written_back)?;
            writeln!(out, "sim_ipc                  {:.4}", self.ipc())?;
            writeln!(out, "sim_cpi                  {:.4}", cyc / instr)?;
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("hazards") {
            writeln!(out, "HAZARDS")?;
            writeln!(
                out,
                "  stalls.issue           {} ({:.2}%)",
                self.stalls_issue,
                (self.stalls_issue as f64 / cyc) * 100.0
            )?;
            writeln!(
                out,
                "  bus.contention         {} ({:.2}%)",
                self.bus_contention_cycles,
                (self.bus_contention_cycles as f64 / cyc) * 100.0
            )?;
            writeln!(out, "  bus.losers             {}", self.bus_losers)?;
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("units") {
            writeln!(out, "UNIT BROADCASTS")?;
            for class in FuClass::ALL {
                let n = self.broadcasts(class);
                writeln!(
                    out,
                    "  {:<22} {} ({:.2}%)",
                    format!("cdb.{}", class.station_prefix().to_lowercase()),
                    n,
                    (n as f64 / instr) * 100.0
                )?;
            }
        }
        writeln!(out, "==========================================================")
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an empty
    /// slice to print all sections.
    pub fn print_sections(&self, sections: &[String]) {
        let stdout = io::stdout();
        if let Err(e) = self.write_sections(&mut stdout.lock(), sections) {
            tracing::warn!(error = %e, "failed to write statistics");
        }
    }

    /// Prints all statistics sections to stdout.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
