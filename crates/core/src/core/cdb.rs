//! Common data bus (result bus) arbitration and broadcast.
//!
//! Exactly one result can cross the bus per cycle. Arbitration scans classes in
//! priority order (add/sub, mul/div, load, store) and, within a class, ascending
//! station ids; the first complete station wins. Losers stay complete and compete
//! again next cycle.

use serde::Serialize;

use crate::common::{Cycle, SimError, SimResult, StationId};
use crate::core::pool::ReservationStationPool;
use crate::core::regfile::RegisterFile;
use crate::isa::InstructionProgram;

/// A result granted the bus: produced in one cycle, applied at the start of the next.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BusTransfer {
    /// Winning station; its id is the tag consumers are waiting on.
    pub station: StationId,
    /// Program-order index of the producing instruction.
    pub instruction: usize,
    /// Computed result.
    pub value: f64,
}

/// Result of one arbitration round.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Arbitration {
    /// The winner, if any station was complete.
    pub winner: Option<BusTransfer>,
    /// Number of complete stations that wanted the bus.
    pub contenders: usize,
}

impl Arbitration {
    /// Complete stations that lost and must retry.
    pub const fn losers(&self) -> usize {
        self.contenders.saturating_sub(1)
    }
}

/// What a broadcast touched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastEffect {
    /// Registers whose pending tag matched and were written.
    pub registers_updated: usize,
    /// Stations that captured the value into an operand slot.
    pub stations_woken: usize,
}

/// Picks this cycle's bus winner and computes its result.
///
/// # Errors
///
/// [`SimError::InvariantViolation`] if the winning station is inconsistent.
pub fn arbitrate(pool: &ReservationStationPool) -> SimResult<Arbitration> {
    let complete = pool.complete_ids();
    let Some(&winner) = complete.first() else {
        return Ok(Arbitration::default());
    };

    let station = pool.station(winner)?;
    let instruction = station.instruction().ok_or_else(|| {
        SimError::invariant(format!("complete station {winner} holds no instruction"))
    })?;
    let value = pool.compute(winner)?;

    Ok(Arbitration {
        winner: Some(BusTransfer {
            station: winner,
            instruction,
            value,
        }),
        contenders: complete.len(),
    })
}

/// Applies a bus transfer: update the register file, wake waiting stations, free the
/// winner, and stamp the producer's write-back cycle.
///
/// # Errors
///
/// [`SimError::InvariantViolation`] if the winner is no longer a complete station
/// holding the transfer's instruction.
pub fn broadcast(
    transfer: &BusTransfer,
    regs: &mut RegisterFile,
    pool: &mut ReservationStationPool,
    program: &mut InstructionProgram,
    cycle: Cycle,
) -> SimResult<BroadcastEffect> {
    let station = pool.station(transfer.station)?;
    if !station.is_complete() || station.instruction() != Some(transfer.instruction) {
        return Err(SimError::invariant(format!(
            "cycle {cycle}: bus winner {} is not the complete producer of instruction {}",
            transfer.station, transfer.instruction
        )));
    }

    let registers_updated = regs.resolve(transfer.station, transfer.value);
    let stations_woken = pool.on_broadcast(transfer.station, transfer.value);
    let _ = pool.release(transfer.station)?;
    let _ = program
        .get_mut(transfer.instruction)?
        .stamp_write_back(cycle)?;

    tracing::debug!(
        cycle,
        station = %transfer.station,
        instruction = transfer.instruction,
        value = transfer.value,
        registers_updated,
        stations_woken,
        "write-back"
    );

    Ok(BroadcastEffect {
        registers_updated,
        stations_woken,
    })
}
