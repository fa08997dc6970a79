//! Renaming tags and operand slots.
//!
//! A reservation station's id doubles as the renaming tag for the value it will
//! produce. Operand slots hold either a resolved value or the tag of the station
//! that will broadcast it.

use std::fmt;

use serde::Serialize;

/// Simulation cycle number. Cycles are numbered from 1.
pub type Cycle = u64;

/// Globally unique reservation station id, also used as a renaming tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StationId(pub u32);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Contents of a register read or a station operand slot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// The value is available.
    Resolved(f64),
    /// The value will be broadcast by the given station.
    Pending(StationId),
}

impl Operand {
    /// Returns the value if resolved.
    #[inline]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Resolved(v) => Some(v),
            Self::Pending(_) => None,
        }
    }

    /// Returns the producer tag if still pending.
    #[inline]
    pub const fn tag(self) -> Option<StationId> {
        match self {
            Self::Resolved(_) => None,
            Self::Pending(tag) => Some(tag),
        }
    }

    /// True if the slot holds a value.
    #[inline]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Replaces a pending `tag` with `value`. Returns true if the slot changed.
    pub fn capture(&mut self, tag: StationId, value: f64) -> bool {
        if *self == Self::Pending(tag) {
            *self = Self::Resolved(value);
            true
        } else {
            false
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(v) => write!(f, "{v}"),
            Self::Pending(tag) => write!(f, "{tag}"),
        }
    }
}
