//! Opcodes and functional-unit classes.
//!
//! The instruction set is closed: every opcode maps to exactly one functional-unit
//! class, and every class owns one reservation-station pool.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operation performed by an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Opcode {
    /// Floating-point addition.
    Add,
    /// Floating-point subtraction.
    Sub,
    /// Floating-point multiplication.
    Mul,
    /// Floating-point division.
    Div,
    /// Load an immediate value into a register.
    Load,
    /// Store a value into a destination register ("memory").
    Store,
}

impl Opcode {
    /// All opcodes, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Load,
        Self::Store,
    ];

    /// Functional-unit class that executes this opcode.
    pub const fn class(self) -> FuClass {
        match self {
            Self::Add | Self::Sub => FuClass::AddSub,
            Self::Mul | Self::Div => FuClass::MulDiv,
            Self::Load => FuClass::Load,
            Self::Store => FuClass::Store,
        }
    }

    /// Canonical assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Load => "LOAD",
            Self::Store => "STORE",
        }
    }

    /// Decodes a mnemonic, case-insensitively.
    ///
    /// Accepts the canonical names as well as the double-precision spellings
    /// (`ADDD`, `SUBD`, `MULTD`, `DIVD`, `LD`, `SD`).
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        let op = match s.to_ascii_uppercase().as_str() {
            "ADD" | "ADDD" => Self::Add,
            "SUB" | "SUBD" => Self::Sub,
            "MUL" | "MULT" | "MULD" | "MULTD" => Self::Mul,
            "DIV" | "DIVD" => Self::Div,
            "LOAD" | "LD" => Self::Load,
            "STORE" | "SD" | "ST" => Self::Store,
            _ => return None,
        };
        Some(op)
    }

    /// True for the two-source arithmetic opcodes.
    pub const fn is_arithmetic(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Div)
    }

    /// Applies the opcode to resolved operands.
    ///
    /// LOAD and STORE forward their single value slot. Division follows IEEE-754:
    /// a zero divisor yields an infinity or NaN rather than an error.
    pub fn evaluate(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
            Self::Load | Self::Store => a,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Functional-unit class; one reservation-station pool per class.
///
/// Declaration order is the result-bus arbitration priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuClass {
    /// Adder: ADD and SUB.
    AddSub,
    /// Multiplier: MUL and DIV.
    MulDiv,
    /// Load buffers.
    Load,
    /// Store buffers.
    Store,
}

impl FuClass {
    /// All classes in bus-arbitration priority order.
    pub const ALL: [Self; 4] = [Self::AddSub, Self::MulDiv, Self::Load, Self::Store];

    /// Prefix used to name stations of this class (`Add1`, `Mult2`, ...).
    pub const fn station_prefix(self) -> &'static str {
        match self {
            Self::AddSub => "Add",
            Self::MulDiv => "Mult",
            Self::Load => "Load",
            Self::Store => "Store",
        }
    }

    /// Position of this class in [`FuClass::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FuClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AddSub => "add/sub",
            Self::MulDiv => "mul/div",
            Self::Load => "load",
            Self::Store => "store",
        };
        f.write_str(name)
    }
}
