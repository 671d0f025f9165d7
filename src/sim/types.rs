//! Core run types: configuration, commands, and per-tick records.

use std::fmt;

use rust_decimal::Decimal;

use crate::devices::BatteryState;

/// Run-level simulation configuration.
///
/// # Examples
///
/// ```
/// use battery_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(120, 42);
/// assert_eq!(cfg.ticks, 120);
/// ```
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of one-minute ticks to simulate.
    pub ticks: u64,
    /// Master random seed for reproducibility.
    pub seed: u64,
}

impl SimConfig {
    /// Creates a new simulation configuration.
    ///
    /// # Panics
    ///
    /// Panics if `ticks` is zero.
    pub fn new(ticks: u64, seed: u64) -> Self {
        assert!(ticks > 0, "ticks must be > 0");
        Self { ticks, seed }
    }
}

/// A command issued to a site at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Charge { rate_kw: Decimal },
    Discharge { rate_kw: Decimal },
    Idle,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Charge { rate_kw } => write!(f, "charge@{rate_kw}kW"),
            Self::Discharge { rate_kw } => write!(f, "discharge@{rate_kw}kW"),
            Self::Idle => f.write_str("idle"),
        }
    }
}

/// What happened to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Batteries were commanded; `partial` when their combined power falls
    /// short of the requested rate.
    Applied {
        battery_ids: Vec<String>,
        partial: bool,
    },
    /// The command failed; the message is the error's display text.
    Rejected { reason: String },
}

impl CommandOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Applied { partial: true, .. })
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied {
                battery_ids,
                partial,
            } => {
                write!(f, "ok[{}]", battery_ids.join(" "))?;
                if *partial {
                    f.write_str(" partial")?;
                }
                Ok(())
            }
            Self::Rejected { reason } => write!(f, "rejected: {reason}"),
        }
    }
}

/// Complete record of one simulation tick.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Tick index.
    pub tick: u64,
    /// Simulation time in hours at the start of the tick.
    pub time_hr: Decimal,
    /// Commands issued before the tick advanced, with their outcomes.
    pub commands: Vec<(Command, CommandOutcome)>,
    /// Site state after the commands, during the tick.
    pub site_state: BatteryState,
    /// Stored energy after the tick (kWh).
    pub current_kwh: Decimal,
    /// Site state of charge after the tick (0 to 1).
    pub state_of_charge: Decimal,
    /// Energy charged during the tick (kWh).
    pub input_kwh: Decimal,
    /// Energy discharged during the tick (kWh).
    pub output_kwh: Decimal,
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>4} ({:>6.2}h) | {:<11} | stored={:>10.2} kWh (SoC={:>5.1}%) | in={:.3} out={:.3} kWh",
            self.tick,
            self.time_hr,
            self.site_state.to_string(),
            self.current_kwh,
            self.state_of_charge * Decimal::ONE_HUNDRED,
            self.input_kwh,
            self.output_kwh,
        )?;
        for (command, outcome) in &self.commands {
            write!(f, " | {command} -> {outcome}")?;
        }
        Ok(())
    }
}
