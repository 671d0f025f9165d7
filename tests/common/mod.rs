//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use rust_decimal::Decimal;

use battery_sim::devices::Battery;
use battery_sim::sim::types::StepResult;
use battery_sim::site::Site;
use battery_sim::strategy::ChargingStrategy;

/// Grid-scale battery (5000 kWh, 2500 kW) holding `initial_kwh`.
pub fn grid_battery(id: &str, initial_kwh: Decimal) -> Battery {
    Battery::with_charge(id, Decimal::from(5000), Decimal::from(2500), initial_kwh)
        .expect("grid battery parameters are valid")
}

/// Battery with explicit capacities holding `initial_kwh`.
pub fn battery(id: &str, energy_kwh: i64, power_kw: i64, initial_kwh: i64) -> Battery {
    Battery::with_charge(
        id,
        Decimal::from(energy_kwh),
        Decimal::from(power_kw),
        Decimal::from(initial_kwh),
    )
    .expect("battery parameters are valid")
}

/// Site at a fixed test location.
pub fn site<S: ChargingStrategy>(batteries: Vec<Battery>, strategy: S) -> Site<S> {
    Site::new("site-1", "Test Yard", batteries, strategy).expect("site parameters are valid")
}

/// Stored energy after each tick, for comparing runs.
pub fn stored_trace(results: &[StepResult]) -> Vec<Decimal> {
    results.iter().map(|r| r.current_kwh).collect()
}

/// Command outcomes per tick rendered as text, for comparing runs.
pub fn outcome_trace(results: &[StepResult]) -> Vec<String> {
    results
        .iter()
        .flat_map(|r| r.commands.iter().map(|(c, o)| format!("{}:{c}:{o}", r.tick)))
        .collect()
}

/// Absolute-tolerance comparison for repeating-fraction results.
pub fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}
