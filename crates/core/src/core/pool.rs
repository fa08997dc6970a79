//! Reservation-station pools.
//!
//! Four pools, one per functional-unit class, each a fixed set of stations. Station ids
//! are assigned once, consecutively from 1, in class priority order (add/sub, mul/div,
//! load, store). Stations are stored flat in that same order, so iterating the flat
//! array is the "class, then ascending id" scan used by both the execute phase and
//! result-bus arbitration.

use std::ops::Range;

use crate::common::{Operand, SimError, SimResult, StationId};
use crate::config::{LatencyConfig, MAX_STATIONS, StationConfig};
use crate::core::regfile::RegisterFile;
use crate::core::station::ReservationStation;
use crate::isa::{FuClass, Opcode, Source};

/// Outcome of a station allocation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Allocation {
    /// The station now holds the instruction.
    Granted(StationId),
    /// Every station of the class is busy; retry next cycle.
    NoFreeStation,
}

/// All reservation stations of the machine, grouped by class.
#[derive(Clone, Debug)]
pub struct ReservationStationPool {
    stations: Vec<ReservationStation>,
    ranges: [Range<usize>; 4],
    latency: LatencyConfig,
}

impl ReservationStationPool {
    /// Builds the pools with the configured sizes and latencies.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] if the pools together exceed [`MAX_STATIONS`] or a
    /// station id does not fit a tag.
    pub fn new(counts: &StationConfig, latency: &LatencyConfig) -> SimResult<Self> {
        let total = counts
            .total()
            .filter(|&n| n <= MAX_STATIONS)
            .ok_or_else(|| {
                SimError::InvalidConfig(format!("more than {MAX_STATIONS} reservation stations"))
            })?;
        let mut stations = Vec::with_capacity(total);
        let mut ranges: [Range<usize>; 4] = Default::default();
        for class in FuClass::ALL {
            let start = stations.len();
            for ordinal in 1..=counts.count(class) {
                let next = stations.len() + 1;
                let id = u32::try_from(next).map_err(|_| {
                    SimError::InvalidConfig(format!("station id {next} overflows a tag"))
                })?;
                stations.push(ReservationStation::new(StationId(id), class, ordinal));
            }
            ranges[class.index()] = start..stations.len();
        }
        Ok(Self {
            stations,
            ranges,
            latency: latency.clone(),
        })
    }

    /// Claims the first free station of `class` (ascending id) for `opcode`.
    ///
    /// # Errors
    ///
    /// [`SimError::InvariantViolation`] if `opcode` does not belong to `class`.
    pub fn allocate(
        &mut self,
        class: FuClass,
        opcode: Opcode,
        instruction: usize,
    ) -> SimResult<Allocation> {
        if opcode.class() != class {
            return Err(SimError::invariant(format!(
                "{opcode} routed to the {class} pool"
            )));
        }
        let latency = self.latency.for_opcode(opcode);
        let range = self.ranges[class.index()].clone();
        match self.stations[range].iter_mut().find(|rs| !rs.is_busy()) {
            Some(rs) => {
                rs.occupy(opcode, latency, instruction)?;
                Ok(Allocation::Granted(rs.id()))
            }
            None => Ok(Allocation::NoFreeStation),
        }
    }

    /// Fills a freshly allocated station's operand slots from the register file as it
    /// stands right now: an idle register yields its value, a renamed one yields the
    /// producer's tag. Immediates are always resolved.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownRegister`] for an undeclared source register;
    /// [`SimError::InvariantViolation`] if a register is waiting on a free station.
    pub fn capture_operands(
        &mut self,
        id: StationId,
        sources: &[&Source],
        regs: &RegisterFile,
    ) -> SimResult<()> {
        let mut slots = Vec::with_capacity(2);
        for src in sources {
            let operand = match src {
                Source::Immediate(v) => Operand::Resolved(*v),
                Source::Register(name) => regs.read_named(name)?,
            };
            if let Operand::Pending(tag) = operand {
                if !self.station(tag)?.is_busy() {
                    return Err(SimError::invariant(format!(
                        "register waits on {tag}, which is not executing anything"
                    )));
                }
            }
            slots.push(operand);
        }

        let (src1, src2) = match slots.as_slice() {
            [a] => (*a, None),
            [a, b] => (*a, Some(*b)),
            _ => {
                return Err(SimError::invariant(format!(
                    "station {id} given {} operands",
                    slots.len()
                )));
            }
        };
        self.station_mut(id)?.set_operands(src1, src2);
        Ok(())
    }

    /// Delivers a broadcast to every busy station waiting on `tag`. Returns the number
    /// of stations that captured the value.
    pub fn on_broadcast(&mut self, tag: StationId, value: f64) -> usize {
        self.stations
            .iter_mut()
            .map(|rs| rs.capture(tag, value))
            .filter(|&captured| captured)
            .count()
    }

    /// Advances a station's execution counter, saturating at its latency.
    /// Only armed (data-ready) busy stations move. Returns true if the counter moved.
    ///
    /// # Errors
    ///
    /// [`SimError::InvariantViolation`] for an unknown id.
    pub fn tick(&mut self, id: StationId) -> SimResult<bool> {
        Ok(self.station_mut(id)?.tick())
    }

    /// True iff the station's counter equals its latency.
    ///
    /// # Errors
    ///
    /// [`SimError::InvariantViolation`] for an unknown id.
    pub fn is_complete(&self, id: StationId) -> SimResult<bool> {
        Ok(self.station(id)?.is_complete())
    }

    /// Computes the station's result without changing it.
    ///
    /// # Errors
    ///
    /// [`SimError::InvariantViolation`] for an unknown id, a free station, or
    /// unresolved operands.
    pub fn compute(&self, id: StationId) -> SimResult<f64> {
        self.station(id)?.compute()
    }

    /// Frees a station. Releasing an already-free station is a no-op returning false.
    ///
    /// # Errors
    ///
    /// [`SimError::InvariantViolation`] for an unknown id.
    pub fn release(&mut self, id: StationId) -> SimResult<bool> {
        Ok(self.station_mut(id)?.release())
    }

    /// Latches readiness for every busy station whose operands are all resolved.
    /// Returns the ids of stations armed by this call.
    pub fn arm_ready(&mut self) -> Vec<StationId> {
        self.stations
            .iter_mut()
            .filter_map(|rs| rs.arm_if_ready().then(|| rs.id()))
            .collect()
    }

    /// Ids of busy stations in class-then-id order.
    pub fn busy_ids(&self) -> Vec<StationId> {
        self.stations
            .iter()
            .filter(|rs| rs.is_busy())
            .map(ReservationStation::id)
            .collect()
    }

    /// Ids of complete stations in arbitration order.
    pub fn complete_ids(&self) -> Vec<StationId> {
        self.stations
            .iter()
            .filter(|rs| rs.is_complete())
            .map(ReservationStation::id)
            .collect()
    }

    /// Looks a station up by id.
    ///
    /// # Errors
    ///
    /// [`SimError::InvariantViolation`] for an unknown id.
    pub fn station(&self, id: StationId) -> SimResult<&ReservationStation> {
        Self::slot(id)
            .and_then(|i| self.stations.get(i))
            .ok_or_else(|| SimError::invariant(format!("unknown station {id}")))
    }

    fn station_mut(&mut self, id: StationId) -> SimResult<&mut ReservationStation> {
        Self::slot(id)
            .and_then(|i| self.stations.get_mut(i))
            .ok_or_else(|| SimError::invariant(format!("unknown station {id}")))
    }

    fn slot(id: StationId) -> Option<usize> {
        (id.0 as usize).checked_sub(1)
    }

    /// Every station, in class-then-id order.
    pub fn stations(&self) -> &[ReservationStation] {
        &self.stations
    }

    /// Stations of one class, in id order.
    pub fn stations_of(&self, class: FuClass) -> &[ReservationStation] {
        &self.stations[self.ranges[class.index()].clone()]
    }

    /// Number of free stations in a class.
    pub fn free_count(&self, class: FuClass) -> usize {
        self.stations_of(class)
            .iter()
            .filter(|rs| !rs.is_busy())
            .count()
    }

    /// True if any station holds an instruction.
    pub fn any_busy(&self) -> bool {
        self.stations.iter().any(ReservationStation::is_busy)
    }
}
