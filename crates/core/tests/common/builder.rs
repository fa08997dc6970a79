use tomasulo_core::isa::{Instruction, InstructionProgram, Opcode, Source};

/// Builds an [`InstructionProgram`] one instruction at a time.
#[derive(Default)]
pub struct ProgramBuilder {
    instructions: Vec<Instruction>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn arith(mut self, op: Opcode, dest: &str, a: &str, b: &str) -> Self {
        self.instructions
            .push(Instruction::arith(op, dest, a, b).unwrap());
        self
    }

    pub fn add(self, dest: &str, a: &str, b: &str) -> Self {
        self.arith(Opcode::Add, dest, a, b)
    }

    pub fn sub(self, dest: &str, a: &str, b: &str) -> Self {
        self.arith(Opcode::Sub, dest, a, b)
    }

    pub fn mul(self, dest: &str, a: &str, b: &str) -> Self {
        self.arith(Opcode::Mul, dest, a, b)
    }

    pub fn div(self, dest: &str, a: &str, b: &str) -> Self {
        self.arith(Opcode::Div, dest, a, b)
    }

    pub fn load(mut self, dest: &str, value: f64) -> Self {
        self.instructions.push(Instruction::load(dest, value));
        self
    }

    pub fn store(mut self, dest: &str, src: &str) -> Self {
        self.instructions
            .push(Instruction::store(dest, Source::Register(src.to_string())));
        self
    }

    pub fn build(self) -> InstructionProgram {
        InstructionProgram::new(self.instructions)
    }
}
