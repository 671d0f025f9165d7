//! Site charging strategies: which battery (or batteries) answers a command.

/// Least-full first for charging, most-full first for discharging.
pub mod lowest_to_highest;
/// Uniform draws from an injected random source.
pub mod random;

use rust_decimal::Decimal;

use crate::devices::{Battery, Direction};
use crate::error::StorageError;

pub use lowest_to_highest::LowestToHighest;
pub use random::RandomStrategy;

/// Capability shared by every selection policy.
///
/// Implementations only choose; they never mutate batteries. Selected
/// indices refer to positions in the `batteries` slice, and every selected
/// battery accepts the command: batteries at the refusing boundary are never
/// selected and their power never counts toward the requested rate.
pub trait ChargingStrategy {
    /// Selects the battery or batteries that should start charging.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Validation`] for a non-positive rate,
    /// [`StorageError::Eligibility`] when every battery is already charging,
    /// and [`StorageError::BatteryFull`] when every other battery is full.
    fn determine_charge_battery(
        &mut self,
        requested_kw: Decimal,
        batteries: &[Battery],
    ) -> Result<Selection, StorageError>;

    /// Selects the battery or batteries that should start discharging.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Validation`] for a non-positive rate,
    /// [`StorageError::Eligibility`] when every battery is already
    /// discharging, and [`StorageError::BatteryEmpty`] when every other
    /// battery is empty.
    fn determine_discharge_battery(
        &mut self,
        requested_kw: Decimal,
        batteries: &[Battery],
    ) -> Result<Selection, StorageError>;

    /// Short name used in configuration and logs.
    fn name(&self) -> &'static str;
}

/// Outcome of a strategy selection.
///
/// Holds at least one battery index. When the eligible batteries together
/// cannot reach the requested rate the selection is partial, which callers
/// can detect through [`Selection::is_partial`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    indices: Vec<usize>,
    requested_kw: Decimal,
    selected_kw: Decimal,
}

impl Selection {
    /// Takes candidates in order until their summed power capacity covers
    /// `requested_kw` or the candidates run out.
    fn accumulate(
        requested_kw: Decimal,
        batteries: &[Battery],
        candidates: impl IntoIterator<Item = usize>,
    ) -> Self {
        let mut indices = Vec::new();
        let mut selected_kw = Decimal::ZERO;
        for index in candidates {
            indices.push(index);
            selected_kw += batteries[index].power_capacity();
            if selected_kw >= requested_kw {
                break;
            }
        }
        Self {
            indices,
            requested_kw,
            selected_kw,
        }
    }

    /// Selected battery indices in selection order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The first (best) selected battery.
    pub fn primary(&self) -> usize {
        self.indices[0]
    }

    pub fn requested_kw(&self) -> Decimal {
        self.requested_kw
    }

    /// Summed power capacity of the selected batteries (kW).
    pub fn selected_kw(&self) -> Decimal {
        self.selected_kw
    }

    pub fn is_partial(&self) -> bool {
        self.selected_kw < self.requested_kw
    }

    /// Requested rate left uncovered (kW, zero when fully met).
    pub fn shortfall_kw(&self) -> Decimal {
        (self.requested_kw - self.selected_kw).max(Decimal::ZERO)
    }
}

fn validate_rate(requested_kw: Decimal) -> Result<(), StorageError> {
    if requested_kw <= Decimal::ZERO {
        return Err(StorageError::validation(
            "requested_rate",
            format!("must be > 0, got {requested_kw}"),
        ));
    }
    Ok(())
}

/// Indices of batteries that can act on a command in `direction`.
///
/// A battery qualifies when it is not already in the direction's target
/// state and is not at the boundary that would make it refuse: full for
/// charging, empty for discharging.
///
/// # Errors
///
/// * [`StorageError::Eligibility`] if every battery is already in the target
///   state
/// * [`StorageError::BatteryFull`] or [`StorageError::BatteryEmpty`], naming
///   the first such battery, if every remaining battery is at the boundary
fn eligible(direction: Direction, batteries: &[Battery]) -> Result<Vec<usize>, StorageError> {
    let target = direction.target_state();
    let candidates: Vec<usize> = batteries
        .iter()
        .enumerate()
        .filter(|(_, b)| b.state() != target)
        .map(|(i, _)| i)
        .collect();
    let Some(&first) = candidates.first() else {
        return Err(StorageError::Eligibility { direction });
    };

    let able: Vec<usize> = candidates
        .into_iter()
        .filter(|&i| batteries[i].can_start(direction))
        .collect();
    if able.is_empty() {
        return Err(batteries[first].refusal(direction));
    }
    Ok(able)
}

/// Strategy chosen at runtime from configuration.
#[derive(Debug, Clone)]
pub enum SiteStrategy {
    LowestToHighest(LowestToHighest),
    Random(RandomStrategy),
}

impl SiteStrategy {
    /// Available strategy names.
    pub const NAMES: &[&str] = &["lowest_to_highest", "random"];

    /// Builds a strategy from its configuration name.
    ///
    /// `seed` is only used by the random strategy. Returns `None` for an
    /// unknown name.
    pub fn from_name(name: &str, seed: u64) -> Option<Self> {
        match name {
            "lowest_to_highest" => Some(Self::LowestToHighest(LowestToHighest)),
            "random" => Some(Self::Random(RandomStrategy::new(seed))),
            _ => None,
        }
    }
}

impl ChargingStrategy for SiteStrategy {
    fn determine_charge_battery(
        &mut self,
        requested_kw: Decimal,
        batteries: &[Battery],
    ) -> Result<Selection, StorageError> {
        match self {
            Self::LowestToHighest(s) => s.determine_charge_battery(requested_kw, batteries),
            Self::Random(s) => s.determine_charge_battery(requested_kw, batteries),
        }
    }

    fn determine_discharge_battery(
        &mut self,
        requested_kw: Decimal,
        batteries: &[Battery],
    ) -> Result<Selection, StorageError> {
        match self {
            Self::LowestToHighest(s) => s.determine_discharge_battery(requested_kw, batteries),
            Self::Random(s) => s.determine_discharge_battery(requested_kw, batteries),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::LowestToHighest(s) => s.name(),
            Self::Random(s) => s.name(),
        }
    }
}
