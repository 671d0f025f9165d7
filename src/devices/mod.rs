//! Battery model and the state/accounting types it shares with sites.

/// Battery state machine with tick-based energy accounting.
pub mod battery;
pub mod types;

pub use battery::Battery;
pub use types::{BatteryState, Direction, TICKS_PER_HOUR, Transfer};
