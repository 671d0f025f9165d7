//! Sites: batteries at one location sharing a charging strategy.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::devices::{Battery, BatteryState};
use crate::error::StorageError;
use crate::strategy::{ChargingStrategy, Selection};

/// Energy moved across a site during one tick (kWh).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickEnergy {
    pub input_kwh: Decimal,
    pub output_kwh: Decimal,
}

/// A non-empty group of batteries at one location.
///
/// The site owns its batteries; callers read them through [`Site::batteries`]
/// and change them only through site commands. Every battery is advanced
/// together by [`Site::increment`], which keeps per-battery tick histories
/// index-aligned.
///
/// Generic over `S: ChargingStrategy` for static dispatch.
#[derive(Debug, Clone)]
pub struct Site<S: ChargingStrategy> {
    id: String,
    location: String,
    batteries: Vec<Battery>,
    strategy: S,
}

impl<S: ChargingStrategy> Site<S> {
    /// Creates a site from fully initialized batteries.
    ///
    /// # Errors
    ///
    /// * [`StorageError::Validation`] if `batteries` is empty or two batteries
    ///   share an id
    /// * [`StorageError::TickMisaligned`] if the batteries have not all been
    ///   advanced the same number of ticks
    pub fn new(
        id: impl Into<String>,
        location: impl Into<String>,
        batteries: Vec<Battery>,
        strategy: S,
    ) -> Result<Self, StorageError> {
        if batteries.is_empty() {
            return Err(StorageError::validation(
                "batteries",
                "a site needs at least one battery",
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = batteries.iter().find(|b| !seen.insert(b.id())) {
            return Err(StorageError::validation(
                "batteries",
                format!("duplicate battery id {}", dup.id()),
            ));
        }

        let site = Self {
            id: id.into(),
            location: location.into(),
            batteries,
            strategy,
        };
        site.aligned_ticks()?;
        Ok(site)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn batteries(&self) -> &[Battery] {
        &self.batteries
    }

    /// Looks up a battery by id.
    pub fn battery(&self, id: &str) -> Option<&Battery> {
        self.batteries.iter().find(|b| b.id() == id)
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Total energy capacity of all batteries (kWh).
    pub fn energy_capacity(&self) -> Decimal {
        self.batteries.iter().map(Battery::energy_capacity).sum()
    }

    /// Total power capacity of all batteries (kW).
    pub fn power_capacity(&self) -> Decimal {
        self.batteries.iter().map(Battery::power_capacity).sum()
    }

    /// Total stored energy (kWh).
    pub fn current_capacity(&self) -> Decimal {
        self.batteries.iter().map(Battery::current_capacity).sum()
    }

    /// Stored energy as a fraction of total energy capacity.
    pub fn state_of_charge(&self) -> Decimal {
        self.current_capacity() / self.energy_capacity()
    }

    /// State of the first non-idle battery in list order, or `Idle`.
    pub fn state(&self) -> BatteryState {
        self.batteries
            .iter()
            .map(Battery::state)
            .find(|s| *s != BatteryState::Idle)
            .unwrap_or(BatteryState::Idle)
    }

    /// Ticks the site has been advanced.
    pub fn ticks(&self) -> u64 {
        self.batteries[0].ticks()
    }

    /// Energy drawn into the site per tick (kWh), summed across batteries.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TickMisaligned`] if battery tick counters
    /// differ; histories are never truncated to the shortest.
    pub fn power_input(&self) -> Result<Vec<Decimal>, StorageError> {
        self.aligned_sum(Battery::input_series)
    }

    /// Energy delivered by the site per tick (kWh), summed across batteries.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TickMisaligned`] if battery tick counters differ.
    pub fn power_output(&self) -> Result<Vec<Decimal>, StorageError> {
        self.aligned_sum(Battery::output_series)
    }

    /// Asks the strategy for batteries to charge and commands each of them.
    ///
    /// Full batteries are never selected, so every selected battery accepts
    /// the command. When the batteries that can charge fall short of the rate
    /// the returned selection is partial. If selection fails no battery is
    /// touched.
    ///
    /// # Errors
    ///
    /// Propagates selection errors, including [`StorageError::BatteryFull`]
    /// when every battery not already charging is full.
    pub fn charge(&mut self, rate_kw: Decimal) -> Result<Selection, StorageError> {
        let selection = self
            .strategy
            .determine_charge_battery(rate_kw, &self.batteries)?;
        for &index in selection.indices() {
            self.batteries[index].charge()?;
        }
        Ok(selection)
    }

    /// Asks the strategy for batteries to discharge and commands each of them.
    ///
    /// Same contract as [`Site::charge`], with empty batteries never selected.
    ///
    /// # Errors
    ///
    /// Propagates selection errors, including [`StorageError::BatteryEmpty`]
    /// when every battery not already discharging is empty.
    pub fn discharge(&mut self, rate_kw: Decimal) -> Result<Selection, StorageError> {
        let selection = self
            .strategy
            .determine_discharge_battery(rate_kw, &self.batteries)?;
        for &index in selection.indices() {
            self.batteries[index].discharge()?;
        }
        Ok(selection)
    }

    /// Idles every battery.
    pub fn idle(&mut self) {
        self.batteries.iter_mut().for_each(Battery::idle);
    }

    /// Advances every battery by exactly one tick.
    pub fn increment(&mut self) -> TickEnergy {
        let mut energy = TickEnergy::default();
        for battery in &mut self.batteries {
            let state = battery.state();
            let kwh = battery.increment();
            match state {
                BatteryState::Charging => energy.input_kwh += kwh,
                BatteryState::Discharging => energy.output_kwh += kwh,
                BatteryState::Idle => {}
            }
        }
        energy
    }

    fn aligned_ticks(&self) -> Result<u64, StorageError> {
        let expected = self.batteries[0].ticks();
        match self.batteries.iter().find(|b| b.ticks() != expected) {
            Some(b) => Err(StorageError::TickMisaligned {
                battery_id: b.id().to_string(),
                ticks: b.ticks(),
                expected,
            }),
            None => Ok(expected),
        }
    }

    fn aligned_sum(
        &self,
        series: impl Fn(&Battery) -> Vec<Decimal>,
    ) -> Result<Vec<Decimal>, StorageError> {
        let ticks = usize::try_from(self.aligned_ticks()?).unwrap_or(usize::MAX);
        let mut total = vec![Decimal::ZERO; ticks];
        for battery in &self.batteries {
            for (sum, kwh) in total.iter_mut().zip(series(battery)) {
                *sum += kwh;
            }
        }
        Ok(total)
    }
}
