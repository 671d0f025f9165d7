use std::fmt;

use rust_decimal::Decimal;

use crate::devices::types::{BatteryState, Direction, TICKS_PER_HOUR, Transfer};
use crate::error::StorageError;

/// A battery energy storage unit with fixed energy and power capacity.
///
/// Commands (`charge`, `discharge`, `idle`) only record intent. Energy moves
/// when [`Battery::increment`] advances the battery by one tick, so a driver
/// can command many batteries against the same pre-tick snapshot before any
/// of them is advanced.
///
/// Stored energy is never kept as a running total: it is derived from the
/// `inputs` and `outputs` histories.
#[derive(Debug, Clone)]
pub struct Battery {
    id: String,

    /// Maximum stored energy (kWh).
    energy_capacity: Decimal,

    /// Charge and discharge rate (kW).
    power_capacity: Decimal,

    state: BatteryState,

    /// Energy received, one entry per charging tick plus an optional opening balance.
    inputs: Vec<Transfer>,

    /// Energy delivered, one entry per discharging tick.
    outputs: Vec<Transfer>,

    /// Ticks advanced so far, including idle ones.
    ticks: u64,
}

impl Battery {
    /// Largest accepted energy (kWh) or power (kW) capacity: 10^12.
    ///
    /// Keeps site totals and per-tick history sums inside `Decimal` range.
    pub const MAX_CAPACITY: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

    /// Creates an empty, idle battery.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique identifier from the caller's [`crate::id::IdProvider`]
    /// * `energy_capacity` - Maximum stored energy in kWh, in `(0, MAX_CAPACITY]`
    /// * `power_capacity` - Charge/discharge rate in kW, in `(0, MAX_CAPACITY]`
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Validation`] if either capacity is out of range.
    pub fn new(
        id: impl Into<String>,
        energy_capacity: Decimal,
        power_capacity: Decimal,
    ) -> Result<Self, StorageError> {
        Self::with_charge(id, energy_capacity, power_capacity, Decimal::ZERO)
    }

    /// Creates an idle battery already holding `initial_kwh`.
    ///
    /// A non-zero opening balance is recorded as the first input, untied to
    /// any tick.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Validation`] if either capacity is out of range,
    /// the storage duration is not representable, or `initial_kwh` lies
    /// outside `[0, energy_capacity]`.
    pub fn with_charge(
        id: impl Into<String>,
        energy_capacity: Decimal,
        power_capacity: Decimal,
        initial_kwh: Decimal,
    ) -> Result<Self, StorageError> {
        if energy_capacity <= Decimal::ZERO || energy_capacity > Self::MAX_CAPACITY {
            return Err(StorageError::validation(
                "energy_capacity",
                format!("must be in (0, {}], got {energy_capacity}", Self::MAX_CAPACITY),
            ));
        }
        if power_capacity <= Decimal::ZERO || power_capacity > Self::MAX_CAPACITY {
            return Err(StorageError::validation(
                "power_capacity",
                format!("must be in (0, {}], got {power_capacity}", Self::MAX_CAPACITY),
            ));
        }
        if energy_capacity.checked_div(power_capacity).is_none() {
            return Err(StorageError::validation(
                "power_capacity",
                format!("storage duration {energy_capacity} / {power_capacity} overflows"),
            ));
        }
        if initial_kwh < Decimal::ZERO || initial_kwh > energy_capacity {
            return Err(StorageError::validation(
                "initial_kwh",
                format!("must be in [0, {energy_capacity}], got {initial_kwh}"),
            ));
        }

        let mut inputs = Vec::new();
        if !initial_kwh.is_zero() {
            inputs.push(Transfer {
                tick: None,
                kwh: initial_kwh,
            });
        }

        Ok(Self {
            id: id.into(),
            energy_capacity,
            power_capacity,
            state: BatteryState::Idle,
            inputs,
            outputs: Vec::new(),
            ticks: 0,
        })
    }

    /// Standard grid storage unit: 5000 kWh, 2500 kW, delivered full.
    pub fn grid(id: impl Into<String>) -> Self {
        let capacity = Decimal::from(5000);
        Self {
            id: id.into(),
            energy_capacity: capacity,
            power_capacity: Decimal::from(2500),
            state: BatteryState::Idle,
            inputs: vec![Transfer {
                tick: None,
                kwh: capacity,
            }],
            outputs: Vec::new(),
            ticks: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn energy_capacity(&self) -> Decimal {
        self.energy_capacity
    }

    pub fn power_capacity(&self) -> Decimal {
        self.power_capacity
    }

    pub fn state(&self) -> BatteryState {
        self.state
    }

    pub fn inputs(&self) -> &[Transfer] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Transfer] {
        &self.outputs
    }

    /// Number of ticks this battery has been advanced.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Stored energy (kWh): total inputs minus total outputs.
    pub fn current_capacity(&self) -> Decimal {
        let charged: Decimal = self.inputs.iter().map(|t| t.kwh).sum();
        let discharged: Decimal = self.outputs.iter().map(|t| t.kwh).sum();
        charged - discharged
    }

    /// Stored energy as a fraction of energy capacity.
    pub fn state_of_charge(&self) -> Decimal {
        self.current_capacity() / self.energy_capacity
    }

    /// Hours needed to fully discharge at rated power.
    pub fn storage_duration(&self) -> Decimal {
        self.energy_capacity / self.power_capacity
    }

    /// Energy moved by one tick at rated power (kWh).
    pub fn energy_per_tick(&self) -> Decimal {
        self.power_capacity / Decimal::from(TICKS_PER_HOUR)
    }

    /// Remaining room before the battery is full (kWh).
    pub fn headroom(&self) -> Decimal {
        self.energy_capacity - self.current_capacity()
    }

    /// Whether a command in `direction` would be accepted.
    ///
    /// Charging needs stored energy below capacity and discharging needs it
    /// above zero. Both are exact comparisons: a battery short of full by any
    /// amount may still start charging.
    pub fn can_start(&self, direction: Direction) -> bool {
        match direction {
            Direction::Charge => self.current_capacity() != self.energy_capacity,
            Direction::Discharge => !self.current_capacity().is_zero(),
        }
    }

    /// The error a command in `direction` fails with at the boundary.
    pub(crate) fn refusal(&self, direction: Direction) -> StorageError {
        let battery_id = self.id.clone();
        match direction {
            Direction::Charge => StorageError::BatteryFull { battery_id },
            Direction::Discharge => StorageError::BatteryEmpty { battery_id },
        }
    }

    /// Orders the battery to start charging at its power capacity.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BatteryFull`] when stored energy equals energy
    /// capacity; the state is left unchanged.
    pub fn charge(&mut self) -> Result<(), StorageError> {
        if !self.can_start(Direction::Charge) {
            return Err(self.refusal(Direction::Charge));
        }
        self.state = BatteryState::Charging;
        Ok(())
    }

    /// Orders the battery to start discharging at its power capacity.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BatteryEmpty`] when stored energy is zero; the
    /// state is left unchanged.
    pub fn discharge(&mut self) -> Result<(), StorageError> {
        if !self.can_start(Direction::Discharge) {
            return Err(self.refusal(Direction::Discharge));
        }
        self.state = BatteryState::Discharging;
        Ok(())
    }

    /// Orders the battery to stop charging or discharging.
    pub fn idle(&mut self) {
        self.state = BatteryState::Idle;
    }

    /// Advances the battery by one tick and applies the commanded transfer.
    ///
    /// Transfers are clamped at the boundaries: a charging tick never stores
    /// more than the remaining headroom and a discharging tick never delivers
    /// more than the stored energy. A battery held at a boundary records a
    /// zero-kWh transfer and keeps its state. Idle ticks leave both histories
    /// untouched but still count toward [`Battery::ticks`].
    ///
    /// # Returns
    ///
    /// Energy moved this tick (kWh, non-negative).
    pub fn increment(&mut self) -> Decimal {
        let tick = self.ticks;
        self.ticks += 1;

        match self.state {
            BatteryState::Idle => Decimal::ZERO,
            BatteryState::Charging => {
                let kwh = self
                    .energy_per_tick()
                    .min(self.headroom())
                    .max(Decimal::ZERO);
                self.inputs.push(Transfer {
                    tick: Some(tick),
                    kwh,
                });
                kwh
            }
            BatteryState::Discharging => {
                let kwh = self
                    .energy_per_tick()
                    .min(self.current_capacity())
                    .max(Decimal::ZERO);
                self.outputs.push(Transfer {
                    tick: Some(tick),
                    kwh,
                });
                kwh
            }
        }
    }

    /// Energy received per tick (kWh), one entry per tick advanced.
    pub fn input_series(&self) -> Vec<Decimal> {
        self.series(&self.inputs)
    }

    /// Energy delivered per tick (kWh), one entry per tick advanced.
    pub fn output_series(&self) -> Vec<Decimal> {
        self.series(&self.outputs)
    }

    fn series(&self, transfers: &[Transfer]) -> Vec<Decimal> {
        let len = usize::try_from(self.ticks).unwrap_or(usize::MAX);
        let mut series = vec![Decimal::ZERO; len];
        for transfer in transfers {
            if let Some(slot) = transfer
                .tick
                .and_then(|t| usize::try_from(t).ok())
                .and_then(|t| series.get_mut(t))
            {
                *slot += transfer.kwh;
            }
        }
        series
    }
}

impl fmt::Display for Battery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} | {:.2} / {} kWh (SoC={:.1}%)",
            self.id,
            self.state,
            self.current_capacity(),
            self.energy_capacity,
            self.state_of_charge() * Decimal::ONE_HUNDRED,
        )
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;
    use rust_decimal::prelude::ToPrimitive;

    use super::*;

    fn battery(energy: Decimal, power: Decimal, initial: Decimal) -> Battery {
        Battery::with_charge("b-1", energy, power, initial).expect("valid battery")
    }

    #[test]
    fn test_new_battery() {
        let b = Battery::new("b-1", dec!(10), dec!(5)).expect("valid battery");
        assert_eq!(b.id(), "b-1");
        assert_eq!(b.state(), BatteryState::Idle);
        assert_eq!(b.current_capacity(), Decimal::ZERO);
        assert_eq!(b.storage_duration(), dec!(2));
        assert!(b.inputs().is_empty());
        assert!(b.outputs().is_empty());
    }

    #[test]
    fn test_invalid_capacities() {
        assert!(matches!(
            Battery::new("b", dec!(-1), dec!(5)),
            Err(StorageError::Validation {
                field: "energy_capacity",
                ..
            })
        ));
        assert!(matches!(
            Battery::new("b", dec!(10), Decimal::ZERO),
            Err(StorageError::Validation {
                field: "power_capacity",
                ..
            })
        ));
    }

    #[test]
    fn test_capacity_bounds() {
        let max = Battery::MAX_CAPACITY;
        assert_eq!(max, Decimal::from(1_000_000_000_000_i64));
        assert!(Battery::new("b", max, max).is_ok());
        assert!(matches!(
            Battery::new("b", max + Decimal::ONE, dec!(5)),
            Err(StorageError::Validation {
                field: "energy_capacity",
                ..
            })
        ));
        assert!(matches!(
            Battery::new("b", Decimal::MAX, dec!(5)),
            Err(StorageError::Validation {
                field: "energy_capacity",
                ..
            })
        ));
        assert!(matches!(
            Battery::new("b", max, dec!(0.0000000000000000000000000001)),
            Err(StorageError::Validation {
                field: "power_capacity",
                ..
            })
        ));
    }

    #[test]
    fn can_start_matches_command_outcome() {
        let empty = battery(dec!(100), dec!(10), Decimal::ZERO);
        let full = battery(dec!(100), dec!(10), dec!(100));
        assert!(empty.can_start(Direction::Charge));
        assert!(!empty.can_start(Direction::Discharge));
        assert!(!full.can_start(Direction::Charge));
        assert!(full.can_start(Direction::Discharge));

        let mut refused = full.clone();
        assert_eq!(
            refused.charge().err(),
            Some(full.refusal(Direction::Charge))
        );
    }

    #[test]
    fn test_invalid_initial_charge() {
        let err = Battery::with_charge("b", dec!(10), dec!(5), dec!(10.5));
        assert!(matches!(
            err,
            Err(StorageError::Validation {
                field: "initial_kwh",
                ..
            })
        ));
    }

    #[test]
    fn charge_when_full_fails_and_keeps_state() {
        let mut b = Battery::grid("grid-1");
        b.discharge().expect("full battery can discharge");
        let err = b.charge();
        assert_eq!(
            err,
            Err(StorageError::BatteryFull {
                battery_id: "grid-1".to_string()
            })
        );
        assert_eq!(b.state(), BatteryState::Discharging);
    }

    #[test]
    fn nearly_full_battery_may_charge() {
        let mut b = battery(dec!(100), dec!(60), dec!(99.999));
        assert!(b.charge().is_ok());
        assert_eq!(b.state(), BatteryState::Charging);
    }

    #[test]
    fn discharge_when_empty_fails_and_keeps_state() {
        let mut b = battery(dec!(100), dec!(60), Decimal::ZERO);
        b.charge().expect("empty battery can charge");
        let err = b.discharge();
        assert!(matches!(err, Err(StorageError::BatteryEmpty { .. })));
        assert_eq!(b.state(), BatteryState::Charging);
    }

    #[test]
    fn commands_do_not_move_energy() {
        let mut b = battery(dec!(100), dec!(60), dec!(50));
        b.charge().ok();
        b.discharge().ok();
        b.idle();
        assert_eq!(b.current_capacity(), dec!(50));
        assert_eq!(b.ticks(), 0);
    }

    #[test]
    fn idle_increment_only_advances_ticks() {
        let mut b = battery(dec!(100), dec!(60), dec!(50));
        let inputs_before = b.inputs().to_vec();
        assert_eq!(b.increment(), Decimal::ZERO);
        assert_eq!(b.inputs(), inputs_before.as_slice());
        assert!(b.outputs().is_empty());
        assert_eq!(b.ticks(), 1);
        assert_eq!(b.input_series(), vec![Decimal::ZERO]);
    }

    #[test]
    fn grid_battery_discharges_one_tick() {
        let mut b = Battery::grid("grid-1");
        b.discharge().expect("full battery can discharge");
        b.increment();
        let expected = dec!(5000) - dec!(2500) / dec!(60);
        assert_eq!(b.current_capacity(), expected);
        assert!((b.current_capacity() - dec!(4958.3333)).abs() < dec!(0.0001));
    }

    #[test]
    fn charging_for_storage_duration_fills_exactly() {
        // 1 kWh per tick
        let mut b = battery(dec!(120), dec!(60), Decimal::ZERO);
        b.charge().expect("empty battery can charge");
        let ticks = dec!(60) * b.storage_duration();
        assert_eq!(ticks, dec!(120));
        for _ in 0..ticks.to_u32().unwrap_or(0) {
            b.increment();
        }
        assert_eq!(b.current_capacity(), b.energy_capacity());
        assert_eq!(b.state_of_charge(), Decimal::ONE);
    }

    #[test]
    fn charging_with_repeating_tick_energy_stays_within_tolerance() {
        let mut b = battery(dec!(5000), dec!(2500), Decimal::ZERO);
        b.charge().expect("empty battery can charge");
        for _ in 0..120 {
            b.increment();
        }
        assert!((b.energy_capacity() - b.current_capacity()).abs() < dec!(0.000001));
        assert!(b.current_capacity() <= b.energy_capacity());
    }

    #[test]
    fn charging_past_full_is_clamped() {
        let mut b = battery(dec!(100), dec!(60), dec!(99.5));
        b.charge().expect("not yet full");
        assert_eq!(b.increment(), dec!(0.5));
        assert_eq!(b.current_capacity(), dec!(100));
        assert_eq!(b.increment(), Decimal::ZERO);
        assert_eq!(b.current_capacity(), dec!(100));
        assert_eq!(b.state(), BatteryState::Charging);
        assert!(matches!(b.charge(), Err(StorageError::BatteryFull { .. })));
    }

    #[test]
    fn discharging_past_empty_is_clamped() {
        let mut b = battery(dec!(100), dec!(60), dec!(0.25));
        b.discharge().expect("not yet empty");
        assert_eq!(b.increment(), dec!(0.25));
        assert_eq!(b.increment(), Decimal::ZERO);
        assert_eq!(b.current_capacity(), Decimal::ZERO);
        assert!(matches!(
            b.discharge(),
            Err(StorageError::BatteryEmpty { .. })
        ));
    }

    #[test]
    fn current_capacity_matches_histories() {
        let mut b = battery(dec!(100), dec!(30), dec!(40));
        b.charge().ok();
        b.increment();
        b.increment();
        b.discharge().ok();
        b.increment();
        b.idle();
        b.increment();

        let inputs: Decimal = b.inputs().iter().map(|t| t.kwh).sum();
        let outputs: Decimal = b.outputs().iter().map(|t| t.kwh).sum();
        assert_eq!(b.current_capacity(), inputs - outputs);
        assert_eq!(b.current_capacity(), dec!(40.5));
        assert_eq!(b.ticks(), 4);
        assert_eq!(
            b.input_series(),
            vec![dec!(0.5), dec!(0.5), Decimal::ZERO, Decimal::ZERO]
        );
        assert_eq!(
            b.output_series(),
            vec![Decimal::ZERO, Decimal::ZERO, dec!(0.5), Decimal::ZERO]
        );
    }

    #[test]
    fn display_does_not_panic() {
        let s = format!("{}", Battery::grid("grid-1"));
        assert!(s.contains("grid-1"));
        assert!(s.contains("idle"));
    }
}
