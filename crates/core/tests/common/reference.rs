use std::collections::HashMap;

use tomasulo_core::config::RegisterConfig;
use tomasulo_core::isa::{InstructionProgram, Source};

/// Runs `program` strictly in order, one instruction at a time.
///
/// Register renaming must make the out-of-order schedule end in exactly this state.
pub fn run_in_order(program: &InstructionProgram, regs: &[RegisterConfig]) -> HashMap<String, f64> {
    let mut state: HashMap<String, f64> = regs.iter().map(|r| (r.name.clone(), r.value)).collect();
    let read = |state: &HashMap<String, f64>, src: &Source| match src {
        Source::Register(name) => state[name],
        Source::Immediate(v) => *v,
    };
    for inst in program {
        let a = read(&state, inst.src1());
        let b = inst.src2().map_or(0.0, |s| read(&state, s));
        let _ = state.insert(inst.dest().to_string(), inst.opcode().evaluate(a, b));
    }
    state
}
