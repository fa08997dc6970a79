//! # Whole-Run Properties
//!
//! Random programs on random machines must finish, keep the single-issue and
//! single-bus limits, respect causality and latency, be deterministic, and end in
//! the same register state as in-order execution.

use std::collections::HashSet;

use proptest::prelude::*;
use tomasulo_core::Config;
use tomasulo_core::config::{LatencyConfig, StationConfig};
use tomasulo_core::isa::InstructionProgram;
use tomasulo_core::sim::Simulator;

use crate::common::reference::run_in_order;

const REGS: [&str; 5] = ["R0", "R2", "R4", "R6", "R8"];

fn line() -> impl Strategy<Value = String> {
    let reg = prop::sample::select(REGS.to_vec());
    let arith = prop::sample::select(vec!["ADD", "SUB", "MUL", "DIV"]);
    prop_oneof![
        4 => (arith, reg.clone(), reg.clone(), reg.clone())
            .prop_map(|(op, d, a, b)| format!("{op} {d} {a} {b}")),
        1 => (reg.clone(), -100i32..100).prop_map(|(d, v)| format!("LD {d} {v}")),
        1 => (reg.clone(), reg).prop_map(|(d, s)| format!("SD {d} {s}")),
    ]
}

fn machine() -> impl Strategy<Value = Config> {
    (
        prop::array::uniform6(1u64..6),
        prop::array::uniform4(1usize..4),
    )
        .prop_map(|(lat, counts)| Config {
            latency: LatencyConfig {
                add: lat[0],
                sub: lat[1],
                mul: lat[2],
                div: lat[3],
                load: lat[4],
                store: lat[5],
            },
            stations: StationConfig {
                add: counts[0],
                mul: counts[1],
                load: counts[2],
                store: counts[3],
            },
            ..Config::default()
        })
}

fn same(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_schedule_invariants(
        lines in prop::collection::vec(line(), 1..24),
        config in machine(),
    ) {
        let program = InstructionProgram::parse(&lines.join("\n")).unwrap();
        let n = program.len();
        let mut sim = Simulator::new(program.clone(), &config).unwrap();
        let summary = sim.run().unwrap();

        let mut issues = HashSet::new();
        let mut write_backs = HashSet::new();
        let mut last_issue = 0;
        for (inst, status) in program.iter().zip(&summary.instructions) {
            let issue = status.issue.unwrap();
            let start = status.execute_start.unwrap();
            let done = status.completion.unwrap();
            let wb = status.write_back.unwrap();
            let latency = config.latency.for_opcode(inst.opcode());

            prop_assert!(issues.insert(issue), "two issues in cycle {}", issue);
            prop_assert!(write_backs.insert(wb), "two write-backs in cycle {}", wb);
            prop_assert!(issue > last_issue, "issue out of program order");
            last_issue = issue;

            prop_assert!(issue < start);
            prop_assert_eq!(done - start + 1, latency);
            prop_assert!(done < wb);
        }
        let last_write_back = summary.instructions.iter().filter_map(|i| i.write_back).max();
        prop_assert_eq!(Some(summary.cycles), last_write_back);
        prop_assert!(summary.cycles > n as u64);
        prop_assert!(!sim.scheduler().registers().has_pending());
        prop_assert!(!sim.scheduler().stations().any_busy());

        let expected = run_in_order(&program, &config.registers);
        for reg in &summary.registers {
            prop_assert!(
                same(reg.value, expected[&reg.name]),
                "{} = {} but in-order execution gives {}", reg.name, reg.value, expected[&reg.name]
            );
        }
    }

    #[test]
    fn prop_runs_are_deterministic(
        lines in prop::collection::vec(line(), 1..16),
        config in machine(),
    ) {
        let program = InstructionProgram::parse(&lines.join("\n")).unwrap();
        let mut first = Simulator::new(program.clone(), &config).unwrap();
        let mut second = Simulator::new(program, &config).unwrap();

        let mut a = Vec::new();
        let mut b = Vec::new();
        let _ = first.run_with(|s| a.push(serde_json::to_string(s).unwrap())).unwrap();
        let _ = second.run_with(|s| b.push(serde_json::to_string(s).unwrap())).unwrap();
        prop_assert_eq!(a, b);
    }
}
