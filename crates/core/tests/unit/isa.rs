//! # Instruction Model Tests
//!
//! Mnemonic aliases, operand shapes, comment handling and error reporting.

use pretty_assertions::assert_eq;
use rstest::rstest;
use tomasulo_core::common::SimError;
use tomasulo_core::isa::{FuClass, Instruction, InstructionProgram, Opcode, Source};

#[rstest]
#[case("ADD", Opcode::Add)]
#[case("addd", Opcode::Add)]
#[case("SUBD", Opcode::Sub)]
#[case("MULT", Opcode::Mul)]
#[case("MULTD", Opcode::Mul)]
#[case("muld", Opcode::Mul)]
#[case("DIVD", Opcode::Div)]
#[case("LD", Opcode::Load)]
#[case("Load", Opcode::Load)]
#[case("SD", Opcode::Store)]
#[case("ST", Opcode::Store)]
fn test_mnemonic_aliases(#[case] mnemonic: &str, #[case] op: Opcode) {
    assert_eq!(Opcode::from_mnemonic(mnemonic), Some(op));
}

#[rstest]
#[case(Opcode::Add, FuClass::AddSub)]
#[case(Opcode::Sub, FuClass::AddSub)]
#[case(Opcode::Mul, FuClass::MulDiv)]
#[case(Opcode::Div, FuClass::MulDiv)]
#[case(Opcode::Load, FuClass::Load)]
#[case(Opcode::Store, FuClass::Store)]
fn test_opcode_class(#[case] op: Opcode, #[case] class: FuClass) {
    assert_eq!(op.class(), class);
}

#[test]
fn test_parse_program_skips_blank_and_comment_lines() {
    let text = "\
# daxpy fragment
LD    R6, 34      ; x
MULTD R0, R2, R4  // a * x

SUBD  R8 R6 R2
SD    R8, R0
";
    let program = InstructionProgram::parse(text).unwrap();
    assert_eq!(program.len(), 4);
    let ops: Vec<Opcode> = program.iter().map(Instruction::opcode).collect();
    assert_eq!(ops, vec![Opcode::Load, Opcode::Mul, Opcode::Sub, Opcode::Store]);
    let indexes: Vec<usize> = program.iter().map(Instruction::index).collect();
    assert_eq!(indexes, vec![0, 1, 2, 3]);
    assert_eq!(program[3].src1(), &Source::Register("R0".into()));
}

#[test]
fn test_display_round_trips_through_parser() {
    let program = InstructionProgram::parse("MUL R6 R4 R2\nLD R0 1.5").unwrap();
    assert_eq!(program[0].to_string(), "MUL R6, R4, R2");
    let again: InstructionProgram = program
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
        .parse()
        .unwrap();
    assert_eq!(again, program);
}

#[rstest]
#[case("FOO R0 R2 R4", 1, "unknown opcode")]
#[case("ADD R0 R2", 1, "expects 3 operands")]
#[case("LD R0", 1, "expects 2 operands")]
#[case("ADD R0 R2 4", 1, "two register sources")]
#[case("LD R0 R2", 1, "immediate")]
#[case("LD R0 1e", 1, "bad operand")]
#[case("\n\nMUL 3 R2 R4", 3, "bad destination")]
fn test_invalid_lines(#[case] text: &str, #[case] line: usize, #[case] reason_part: &str) {
    match InstructionProgram::parse(text) {
        Err(SimError::InvalidInstruction { line: l, reason, .. }) => {
            assert_eq!(l, line);
            assert!(reason.contains(reason_part), "{reason:?} lacks {reason_part:?}");
        }
        other => panic!("expected InvalidInstruction, got {other:?}"),
    }
}

#[test]
fn test_error_message_names_line_and_text() {
    let err = InstructionProgram::parse("ADD R0 R2 R4\nNOP").unwrap_err();
    assert_eq!(
        err.to_string(),
        "line 2: invalid instruction `NOP`: unknown opcode `NOP`"
    );
}

#[test]
fn test_constructor_shape_checks() {
    assert!(Instruction::arith(Opcode::Load, "R0", "R2", "R4").is_err());
    let two_sources = Instruction::new(
        Opcode::Store,
        "R0",
        Source::Immediate(1.0),
        Some(Source::Immediate(2.0)),
    );
    assert!(two_sources.is_err());
    assert!(Instruction::new(Opcode::Store, "R0", Source::Immediate(1.0), None).is_ok());
}
