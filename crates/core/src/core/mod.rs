//! Tomasulo machine state and the per-cycle scheduler.
//!
//! The register file, the reservation-station pools and the result bus are kept as
//! separate components; the [`Scheduler`] owns one of each and sequences them.

/// Result bus arbitration and broadcast.
pub mod cdb;

/// Reservation-station pools, one per functional-unit class.
pub mod pool;

/// Register file with per-register producer tags.
pub mod regfile;

/// Per-cycle phase sequencing.
pub mod scheduler;

/// Read-only views of machine state.
pub mod snapshot;

/// A single reservation station.
pub mod station;

pub use self::cdb::BusTransfer;
pub use self::pool::{Allocation, ReservationStationPool};
pub use self::regfile::{RegIdx, Register, RegisterFile};
pub use self::scheduler::{CycleReport, IssueOutcome, Scheduler};
pub use self::snapshot::{CycleSnapshot, InstructionStatus, RegisterStatus, StationStatus};
pub use self::station::{ReservationStation, StationState};
