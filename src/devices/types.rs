//! Common types for battery state and tick accounting.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of simulation ticks per hour; one tick is one minute.
pub const TICKS_PER_HOUR: u32 = 60;

/// Simulated time in hours at the start of `tick`.
pub fn hours_at(tick: u64) -> Decimal {
    Decimal::from(tick) / Decimal::from(TICKS_PER_HOUR)
}

/// Operating state of a battery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryState {
    #[default]
    Idle,
    Charging,
    Discharging,
}

impl fmt::Display for BatteryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Charging => "charging",
            Self::Discharging => "discharging",
        };
        f.write_str(s)
    }
}

/// Direction of a site-level command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Charge,
    Discharge,
}

impl Direction {
    /// The battery state a command in this direction moves a battery into.
    ///
    /// Batteries already in this state are not eligible for selection.
    pub fn target_state(self) -> BatteryState {
        match self {
            Self::Charge => BatteryState::Charging,
            Self::Discharge => BatteryState::Discharging,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Charge => f.write_str("charge"),
            Self::Discharge => f.write_str("discharge"),
        }
    }
}

/// One entry in a battery's input or output history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    /// Tick at which the energy moved; `None` for the opening balance.
    pub tick: Option<u64>,
    /// Energy moved (kWh, non-negative).
    pub kwh: Decimal,
}
