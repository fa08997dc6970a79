//! # Statistics Tests
//!
//! Counters gathered over complete runs and the sectioned text report.

use pretty_assertions::assert_eq;
use tomasulo_core::core::StationState;
use tomasulo_core::isa::FuClass;
use tomasulo_core::stats::{STATS_SECTIONS, SimStats};

use crate::common::harness::TestContext;

#[test]
fn default_stats_all_zero() {
    let stats = SimStats::default();
    assert_eq!(stats.cycles, 0);
    assert_eq!(stats.instructions_issued, 0);
    assert_eq!(stats.instructions_written_back, 0);
    assert_eq!(stats.stalls_issue, 0);
    assert_eq!(stats.bus_contention_cycles, 0);
    assert_eq!(stats.bus_losers, 0);
    for class in FuClass::ALL {
        assert_eq!(stats.broadcasts(class), 0);
    }
}

#[test]
fn stats_over_mixed_program() {
    let ctx = TestContext::parse(
        "LD R6 34\nADD R0 R2 R4\nMUL R8 R6 R2\nMUL R2 R4 R4\nMUL R4 R0 R0\nSD R0 R8",
    )
    .run();
    let stats = ctx.sim.stats();

    assert_eq!(stats.cycles, ctx.cycles());
    assert_eq!(stats.instructions_issued, 6);
    assert_eq!(stats.instructions_written_back, 6);
    assert_eq!(stats.broadcasts(FuClass::Load), 1);
    assert_eq!(stats.broadcasts(FuClass::AddSub), 1);
    assert_eq!(stats.broadcasts(FuClass::MulDiv), 3);
    assert_eq!(stats.broadcasts(FuClass::Store), 1);
    assert!(stats.stalls_issue >= 1, "third MUL waits for a multiplier");
    assert!((stats.ipc() - 6.0 / ctx.cycles() as f64).abs() < 1e-12);
}

#[test]
fn stall_and_contention_counts_match_history() {
    let ctx = TestContext::parse("ADD R0 R2 R4\nADD R6 R2 R4\nADD R8 R2 R4\nLD R2 1").run();
    let stats = ctx.sim.stats();

    let losers: u64 = ctx
        .history
        .iter()
        .map(|snap| {
            let complete = snap
                .stations
                .iter()
                .filter(|rs| rs.state == StationState::Completed)
                .count() as u64;
            complete.saturating_sub(1)
        })
        .sum();
    assert_eq!(stats.bus_losers, losers);
    assert_eq!(stats.stalls_issue, 1);
}

#[test]
fn report_contains_every_section() {
    let ctx = TestContext::parse("ADD R0 R2 R4").run();
    let mut out = Vec::new();
    ctx.sim.stats().write_sections(&mut out, &[]).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("TOMASULO SCHEDULING STATISTICS"));
    assert!(text.contains("sim_cycles               4"));
    assert!(text.contains("HAZARDS"));
    assert!(text.contains("UNIT BROADCASTS"));
    assert!(text.contains("cdb.add"));
    assert_eq!(STATS_SECTIONS, &["summary", "hazards", "units"]);
}

#[test]
fn report_honours_section_filter() {
    let ctx = TestContext::parse("ADD R0 R2 R4").run();
    let mut out = Vec::new();
    ctx.sim
        .stats()
        .write_sections(&mut out, &["units".to_string()])
        .unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("UNIT BROADCASTS"));
    assert!(!text.contains("HAZARDS"));
    assert!(!text.contains("host_seconds"));
}
