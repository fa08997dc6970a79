//! Configuration system for the Tomasulo simulator.
//!
//! This module defines the static parameters of a simulation run. It provides:
//! 1. **Defaults:** The classic textbook machine (2 adders, 2 multipliers, 5 registers).
//! 2. **Structures:** General settings, per-opcode latencies, per-class station counts,
//!    and the initial register file.
//! 3. **Loading:** JSON deserialization and validation.
//!
//! Configuration is read once at startup and never mutated by the scheduler.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{SimError, SimResult};
use crate::isa::{FuClass, Opcode};

/// Upper bound on the number of reservation stations across all pools.
pub const MAX_STATIONS: usize = 1024;

/// Default configuration constants for the simulator.
mod defaults {
    /// ADD latency in cycles.
    pub const ADD_LATENCY: u64 = 2;

    /// SUB latency in cycles.
    pub const SUB_LATENCY: u64 = 2;

    /// MUL latency in cycles.
    pub const MUL_LATENCY: u64 = 3;

    /// DIV latency in cycles.
    pub const DIV_LATENCY: u64 = 3;

    /// LOAD latency in cycles.
    pub const LOAD_LATENCY: u64 = 3;

    /// STORE latency in cycles. Matches LOAD.
    pub const STORE_LATENCY: u64 = 3;

    /// Reservation stations in the add/sub pool.
    pub const ADD_STATIONS: usize = 2;

    /// Reservation stations in the mul/div pool.
    pub const MUL_STATIONS: usize = 2;

    /// Load buffers.
    pub const LOAD_STATIONS: usize = 2;

    /// Store buffers.
    pub const STORE_STATIONS: usize = 2;

    /// Watchdog: a run still unfinished after this many cycles is aborted.
    pub const MAX_CYCLES: u64 = 10_000;

    /// Initial register file: even-numbered registers, as in the classic example.
    pub const REGISTERS: [(&str, f64); 5] =
        [("R0", 6.0), ("R2", 3.5), ("R4", 10.0), ("R6", 0.0), ("R8", 7.8)];
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use tomasulo_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.latency.add, 2);
/// assert_eq!(config.stations.mul, 2);
/// assert_eq!(config.registers.len(), 5);
/// ```
///
/// Deserializing from JSON; omitted fields fall back to the defaults:
///
/// ```
/// use tomasulo_core::config::Config;
/// use tomasulo_core::isa::Opcode;
///
/// let json = r#"{
///     "latency": { "mul": 10, "div": 40 },
///     "stations": { "add": 3 },
///     "registers": [
///         { "name": "F0", "value": 1.0 },
///         { "name": "F2", "value": 2.5 }
///     ]
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.latency.for_opcode(Opcode::Div), 40);
/// assert_eq!(config.latency.add, 2);
/// assert_eq!(config.stations.add, 3);
/// assert_eq!(config.registers[1].name, "F2");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General simulation settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Functional-unit latencies.
    #[serde(default)]
    pub latency: LatencyConfig,
    /// Reservation-station pool sizes.
    #[serde(default)]
    pub stations: StationConfig,
    /// Architectural registers and their initial values, in display order.
    #[serde(default = "Config::default_registers")]
    pub registers: Vec<RegisterConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            latency: LatencyConfig::default(),
            stations: StationConfig::default(),
            registers: Self::default_registers(),
        }
    }
}

impl Config {
    /// Returns the default register file.
    fn default_registers() -> Vec<RegisterConfig> {
        defaults::REGISTERS
            .iter()
            .map(|&(name, value)| RegisterConfig {
                name: name.to_string(),
                value,
            })
            .collect()
    }

    /// Deserializes and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// [`SimError::ConfigParse`] for malformed JSON, [`SimError::InvalidConfig`] if
    /// validation fails.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, deserializes and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// [`SimError::Io`] if the file cannot be read, otherwise as [`Config::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks the semantic constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] on a zero latency or station count, more than
    /// [`MAX_STATIONS`] stations in total, an empty or duplicated register name, a
    /// non-finite initial value, or a zero cycle limit.
    pub fn validate(&self) -> SimResult<()> {
        for op in Opcode::ALL {
            if self.latency.for_opcode(op) == 0 {
                return Err(SimError::InvalidConfig(format!(
                    "latency for {op} must be at least 1 cycle"
                )));
            }
        }
        for class in FuClass::ALL {
            if self.stations.count(class) == 0 {
                return Err(SimError::InvalidConfig(format!(
                    "{class} pool needs at least one station"
                )));
            }
        }
        if !self.stations.total().is_some_and(|n| n <= MAX_STATIONS) {
            return Err(SimError::InvalidConfig(format!(
                "at most {MAX_STATIONS} reservation stations are supported"
            )));
        }
        if self.general.max_cycles == 0 {
            return Err(SimError::InvalidConfig("max_cycles must be positive".into()));
        }
        if self.registers.is_empty() {
            return Err(SimError::InvalidConfig("register file is empty".into()));
        }

        let mut seen = HashSet::new();
        for reg in &self.registers {
            if reg.name.trim().is_empty() {
                return Err(SimError::InvalidConfig("register with empty name".into()));
            }
            if !seen.insert(reg.name.as_str()) {
                return Err(SimError::InvalidConfig(format!(
                    "register `{}` declared twice",
                    reg.name
                )));
            }
            if !reg.value.is_finite() {
                return Err(SimError::InvalidConfig(format!(
                    "register `{}` has non-finite initial value",
                    reg.name
                )));
            }
        }
        Ok(())
    }
}

/// General simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log a JSON snapshot of the machine after every cycle.
    #[serde(default)]
    pub trace: bool,

    /// Abort a run that has not finished after this many cycles.
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,
}

impl GeneralConfig {
    /// Returns the default watchdog limit.
    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace: false,
            max_cycles: defaults::MAX_CYCLES,
        }
    }
}

/// Execution latency of each opcode, in cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyConfig {
    /// ADD latency
    #[serde(default = "LatencyConfig::default_add")]
    pub add: u64,
    /// SUB latency
    #[serde(default = "LatencyConfig::default_sub")]
    pub sub: u64,
    /// MUL latency
    #[serde(default = "LatencyConfig::default_mul")]
    pub mul: u64,
    /// DIV latency
    #[serde(default = "LatencyConfig::default_div")]
    pub div: u64,
    /// LOAD latency
    #[serde(default = "LatencyConfig::default_load")]
    pub load: u64,
    /// STORE latency
    #[serde(default = "LatencyConfig::default_store")]
    pub store: u64,
}

impl LatencyConfig {
    /// Latency for one opcode.
    pub const fn for_opcode(&self, op: Opcode) -> u64 {
        match op {
            Opcode::Add => self.add,
            Opcode::Sub => self.sub,
            Opcode::Mul => self.mul,
            Opcode::Div => self.div,
            Opcode::Load => self.load,
            Opcode::Store => self.store,
        }
    }

    fn default_add() -> u64 {
        defaults::ADD_LATENCY
    }

    fn default_sub() -> u64 {
        defaults::SUB_LATENCY
    }

    fn default_mul() -> u64 {
        defaults::MUL_LATENCY
    }

    fn default_div() -> u64 {
        defaults::DIV_LATENCY
    }

    fn default_load() -> u64 {
        defaults::LOAD_LATENCY
    }

    fn default_store() -> u64 {
        defaults::STORE_LATENCY
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            add: defaults::ADD_LATENCY,
            sub: defaults::SUB_LATENCY,
            mul: defaults::MUL_LATENCY,
            div: defaults::DIV_LATENCY,
            load: defaults::LOAD_LATENCY,
            store: defaults::STORE_LATENCY,
        }
    }
}

/// Number of reservation stations per functional-unit class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfig {
    /// Add/sub stations
    #[serde(default = "StationConfig::default_add")]
    pub add: usize,
    /// Mul/div stations
    #[serde(default = "StationConfig::default_mul")]
    pub mul: usize,
    /// Load buffers
    #[serde(default = "StationConfig::default_load")]
    pub load: usize,
    /// Store buffers
    #[serde(default = "StationConfig::default_store")]
    pub store: usize,
}

impl StationConfig {
    /// Pool size for one class.
    pub const fn count(&self, class: FuClass) -> usize {
        match class {
            FuClass::AddSub => self.add,
            FuClass::MulDiv => self.mul,
            FuClass::Load => self.load,
            FuClass::Store => self.store,
        }
    }

    /// Total number of stations across all pools, `None` on overflow.
    pub fn total(&self) -> Option<usize> {
        self.add
            .checked_add(self.mul)?
            .checked_add(self.load)?
            .checked_add(self.store)
    }

    fn default_add() -> usize {
        defaults::ADD_STATIONS
    }

    fn default_mul() -> usize {
        defaults::MUL_STATIONS
    }

    fn default_load() -> usize {
        defaults::LOAD_STATIONS
    }

    fn default_store() -> usize {
        defaults::STORE_STATIONS
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            add: defaults::ADD_STATIONS,
            mul: defaults::MUL_STATIONS,
            load: defaults::LOAD_STATIONS,
            store: defaults::STORE_STATIONS,
        }
    }
}

/// One architectural register and its value at cycle 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterConfig {
    /// Register name as used in program text.
    pub name: String,
    /// Initial value.
    #[serde(default)]
    pub value: f64,
}

impl RegisterConfig {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}
