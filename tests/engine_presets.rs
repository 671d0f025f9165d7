//! Integration tests for preset scenarios driven through the engine.

mod common;

use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal::dec;

use battery_sim::config::ScenarioConfig;
use battery_sim::devices::BatteryState;
use battery_sim::io::export::write_csv;
use battery_sim::scenario::build_engine;
use battery_sim::sim::kpi::RunSummary;

fn run_preset(name: &str) -> Vec<battery_sim::sim::types::StepResult> {
    let cfg = ScenarioConfig::from_preset(name).expect("preset exists");
    let mut engine = build_engine(&cfg).expect("preset builds");
    engine.run()
}

#[test]
fn grid_demo_discharges_one_tick() {
    let results = run_preset("grid_demo");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].site_state, BatteryState::Discharging);
    assert_eq!(results[0].output_kwh, dec!(2500) / dec!(60));
    common::assert_close(results[0].current_kwh, dec!(4958.33), dec!(0.01));
}

#[test]
fn baseline_moves_energy_between_batteries() {
    let results = run_preset("baseline");
    let summary = RunSummary::from_results(&results);

    assert_eq!(summary.ticks, 180);
    assert_eq!(summary.active_ticks, 120);
    assert_eq!(summary.commands_issued, 4);
    assert_eq!(summary.commands_rejected, 0);
    assert_eq!(summary.commands_partial, 0);
    common::assert_close(summary.energy_out_kwh, dec!(2500), dec!(0.000001));
    common::assert_close(summary.energy_in_kwh, dec!(2500), dec!(0.000001));
    common::assert_close(summary.final_kwh, dec!(5000), dec!(0.000001));
    assert_eq!(results[179].site_state, BatteryState::Idle);
}

#[test]
fn mixed_fleet_flags_oversized_charge_as_partial() {
    let results = run_preset("mixed_fleet");
    let summary = RunSummary::from_results(&results);

    assert_eq!(summary.ticks, 240);
    assert_eq!(summary.commands_rejected, 0);
    assert_eq!(summary.commands_partial, 1);
    assert!(results[120].commands[0].1.is_partial());
    assert!(
        results
            .iter()
            .all(|r| r.state_of_charge >= Decimal::ZERO && r.state_of_charge <= Decimal::ONE)
    );
}

#[test]
fn runs_are_deterministic_for_a_fixed_seed() {
    let first = run_preset("mixed_fleet");
    let second = run_preset("mixed_fleet");
    assert_eq!(common::stored_trace(&first), common::stored_trace(&second));
    assert_eq!(common::outcome_trace(&first), common::outcome_trace(&second));
}

#[test]
fn every_preset_exports_one_row_per_tick() {
    for name in ScenarioConfig::PRESETS {
        let results = run_preset(name);
        let mut buf = Vec::new();
        write_csv(&results, &mut buf).expect("CSV writes to memory");
        let output = String::from_utf8(buf).expect("CSV is UTF-8");
        assert_eq!(
            output.lines().count(),
            results.len() + 1,
            "preset \"{name}\" row count"
        );
    }
}

#[test]
fn bundled_scenario_files_are_valid() {
    for file in ["scenarios/baseline.toml", "scenarios/overload.toml"] {
        let cfg = ScenarioConfig::from_toml_file(Path::new(file));
        assert!(cfg.is_ok(), "{file} should parse: {:?}", cfg.err());
        let errors = cfg.map(|c| c.validate()).unwrap_or_default();
        assert!(errors.is_empty(), "{file} should be valid: {errors:?}");
    }
}
