use tomasulo_core::Config;
use tomasulo_core::common::{Cycle, SimResult};
use tomasulo_core::config::RegisterConfig;
use tomasulo_core::core::{CycleSnapshot, InstructionStatus};
use tomasulo_core::isa::InstructionProgram;
use tomasulo_core::sim::{RunSummary, Simulator};

/// Owns a simulator for one program and records every cycle snapshot.
pub struct TestContext {
    pub sim: Simulator,
    pub history: Vec<CycleSnapshot>,
}

impl TestContext {
    /// Simulator on the default machine.
    pub fn new(program: InstructionProgram) -> Self {
        Self::with_config(program, &Config::default())
    }

    pub fn with_config(program: InstructionProgram, config: &Config) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        Self {
            sim: Simulator::new(program, config).unwrap(),
            history: Vec::new(),
        }
    }

    /// Parses `text` and builds a simulator on the default machine.
    pub fn parse(text: &str) -> Self {
        Self::new(InstructionProgram::parse(text).unwrap())
    }

    pub fn try_run(&mut self) -> SimResult<RunSummary> {
        let history = &mut self.history;
        self.sim.run_with(|snap| history.push(snap.clone()))
    }

    pub fn run(mut self) -> Self {
        let _ = self.try_run().unwrap();
        self
    }

    /// Status of instruction `index` after the last cycle.
    pub fn instruction(&self, index: usize) -> InstructionStatus {
        self.sim.snapshot().instructions[index].clone()
    }

    /// `(issue, execute start, completion, write-back)` of instruction `index`.
    pub fn timeline(&self, index: usize) -> (Cycle, Cycle, Cycle, Cycle) {
        let i = self.instruction(index);
        (
            i.issue.unwrap(),
            i.execute_start.unwrap(),
            i.completion.unwrap(),
            i.write_back.unwrap(),
        )
    }

    pub fn register(&self, name: &str) -> f64 {
        self.sim.scheduler().registers().value_of(name).unwrap()
    }

    pub fn cycles(&self) -> Cycle {
        self.sim.scheduler().cycle()
    }

    /// Snapshot at the end of `cycle` (1-based).
    pub fn at(&self, cycle: Cycle) -> &CycleSnapshot {
        &self.history[(cycle - 1) as usize]
    }
}

/// Default machine with a different register file.
pub fn config_with_registers(regs: &[(&str, f64)]) -> Config {
    Config {
        registers: regs
            .iter()
            .map(|(name, value)| RegisterConfig::new(*name, *value))
            .collect(),
        ..Config::default()
    }
}
