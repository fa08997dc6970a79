//! # Run Driver Tests
//!
//! Loading programs from disk, the watchdog, observers, and run summaries.

use std::io::Write;

use pretty_assertions::assert_eq;
use tomasulo_core::Config;
use tomasulo_core::common::SimError;
use tomasulo_core::isa::InstructionProgram;
use tomasulo_core::sim::{Simulator, loader};

use crate::common::builder::ProgramBuilder;
use crate::common::harness::{TestContext, config_with_registers};

#[test]
fn test_load_program_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "LD R6, 34\nADDD R0, R6, R2").unwrap();

    let program = loader::load_program(file.path()).unwrap();
    assert_eq!(program.len(), 2);

    let summary = Simulator::new(program, &Config::default())
        .unwrap()
        .run()
        .unwrap();
    let r0 = summary.registers.iter().find(|r| r.name == "R0").unwrap();
    assert_eq!(r0.value, 37.5);
}

#[test]
fn test_load_missing_program_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = loader::load_program(dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, SimError::Io { .. }));
    assert!(err.to_string().contains("missing.txt"));
}

#[test]
fn test_load_malformed_program_reports_line() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "ADD R0 R2 R4\nADD R0").unwrap();
    assert!(matches!(
        loader::load_program(file.path()),
        Err(SimError::InvalidInstruction { line: 2, .. })
    ));
}

#[test]
fn test_unknown_register_fails_before_first_cycle() {
    let program = ProgramBuilder::new().add("F0", "R2", "R4").build();
    let err = Simulator::new(program, &Config::default()).unwrap_err();
    assert!(matches!(err, SimError::UnknownRegister(name) if name == "F0"));
}

#[test]
fn test_invalid_config_rejected_by_simulator() {
    let mut config = Config::default();
    config.stations.mul = 0;
    let program = ProgramBuilder::new().add("R0", "R2", "R4").build();
    assert!(matches!(
        Simulator::new(program, &config),
        Err(SimError::InvalidConfig(_))
    ));
}

#[test]
fn test_oversized_machine_rejected_by_simulator() {
    let mut config = Config::default();
    config.stations.add = usize::MAX;
    let program = ProgramBuilder::new().add("R0", "R2", "R4").build();
    assert!(matches!(
        Simulator::new(program, &config),
        Err(SimError::InvalidConfig(_))
    ));
}

#[test]
fn test_finished_program_cannot_be_rerun() {
    let ctx = TestContext::parse("ADD R0 R0 R2").run();
    let program = ctx.sim.scheduler().program().clone();
    assert!(program.is_finished());

    let err = Simulator::new(program, &Config::default()).unwrap_err();
    assert!(matches!(err, SimError::ProgramAlreadyScheduled(0)), "{err}");
}

#[test]
fn test_partly_run_program_cannot_be_resumed_elsewhere() {
    let mut ctx = TestContext::parse("ADD R0 R0 R2\nMUL R4 R0 R2");
    let _ = ctx.sim.tick().unwrap();
    let program = ctx.sim.scheduler().program().clone();

    let err = Simulator::new(program, &Config::default()).unwrap_err();
    assert!(matches!(err, SimError::ProgramAlreadyScheduled(0)), "{err}");
}

#[test]
fn test_watchdog() {
    let mut config = config_with_registers(&[("R0", 1.0)]);
    config.general.max_cycles = 5;
    config.latency.div = 40;
    let program = ProgramBuilder::new().div("R0", "R0", "R0").build();
    let mut ctx = TestContext::with_config(program, &config);

    assert!(matches!(ctx.try_run(), Err(SimError::CycleLimitExceeded(5))));
    assert_eq!(ctx.history.len(), 5);
    assert!(!ctx.sim.is_finished());
}

#[test]
fn test_summary_matches_final_snapshot() {
    let mut ctx = TestContext::parse("MUL R0 R2 R4\nSUB R6 R0 R8");
    let summary = ctx.try_run().unwrap();
    let last = ctx.history.last().unwrap();

    assert_eq!(summary.cycles, last.cycle);
    assert_eq!(summary.instructions, last.instructions);
    assert_eq!(summary.registers, last.registers);
    assert_eq!(summary, ctx.sim.summary());
}

#[test]
fn test_trace_flag_does_not_change_schedule() {
    let text = "LD R0 2\nMUL R2 R0 R0\nDIV R4 R2 R0";
    let plain = TestContext::parse(text).run();

    let mut config = Config::default();
    config.general.trace = true;
    let traced = TestContext::with_config(InstructionProgram::parse(text).unwrap(), &config).run();

    assert_eq!(plain.sim.summary(), traced.sim.summary());
}
