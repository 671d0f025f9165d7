//! Builds a ready-to-run engine from a validated scenario configuration.

use crate::config::ScenarioConfig;
use crate::devices::Battery;
use crate::error::StorageError;
use crate::id::{IdProvider, SequentialIds};
use crate::sim::engine::Engine;
use crate::sim::schedule::CommandSchedule;
use crate::sim::types::SimConfig;
use crate::site::Site;
use crate::strategy::SiteStrategy;

/// Builds the site, schedule, and engine for a scenario.
///
/// Battery ids come from `battery-N` and the site id from `site-N`.
///
/// # Errors
///
/// Returns [`StorageError::Validation`] if the scenario names an unknown
/// strategy, has zero ticks, or has an invalid command, and propagates
/// battery and site construction errors. Running
/// [`ScenarioConfig::validate`] first rules all of these out.
pub fn build_engine(cfg: &ScenarioConfig) -> Result<Engine<SiteStrategy>, StorageError> {
    let mut battery_ids = SequentialIds::new("battery");
    let mut site_ids = SequentialIds::new("site");
    build_engine_with(cfg, &mut battery_ids, &mut site_ids)
}

/// Like [`build_engine`], with caller-supplied id providers.
///
/// # Errors
///
/// Same as [`build_engine`].
pub fn build_engine_with(
    cfg: &ScenarioConfig,
    battery_ids: &mut impl IdProvider,
    site_ids: &mut impl IdProvider,
) -> Result<Engine<SiteStrategy>, StorageError> {
    let s = &cfg.simulation;
    if s.ticks == 0 {
        return Err(StorageError::validation("simulation.ticks", "must be > 0"));
    }
    let site = build_site(cfg, battery_ids, site_ids)?;
    let schedule = build_schedule(cfg)?;
    Ok(Engine::new(SimConfig::new(s.ticks, s.seed), site, schedule))
}

/// Builds the site described by a scenario, batteries in configuration order.
///
/// # Errors
///
/// Returns [`StorageError::Validation`] for an unknown strategy name and
/// propagates battery and site construction errors.
pub fn build_site(
    cfg: &ScenarioConfig,
    battery_ids: &mut impl IdProvider,
    site_ids: &mut impl IdProvider,
) -> Result<Site<SiteStrategy>, StorageError> {
    let s = &cfg.simulation;
    let strategy = SiteStrategy::from_name(&s.strategy, s.seed).ok_or_else(|| {
        StorageError::validation(
            "simulation.strategy",
            format!("unknown strategy \"{}\"", s.strategy),
        )
    })?;

    let mut batteries = Vec::new();
    for group in &cfg.batteries {
        for _ in 0..group.count {
            batteries.push(Battery::with_charge(
                battery_ids.next_id(),
                group.energy_capacity_kwh,
                group.power_capacity_kw,
                group.initial_kwh,
            )?);
        }
    }

    Site::new(site_ids.next_id(), cfg.site.location.clone(), batteries, strategy)
}

/// Collects the scenario's commands keyed by tick, preserving file order
/// within a tick.
///
/// # Errors
///
/// Returns [`StorageError::Validation`] for an unknown action or a
/// charge/discharge without a rate.
pub fn build_schedule(cfg: &ScenarioConfig) -> Result<CommandSchedule, StorageError> {
    let mut schedule = CommandSchedule::new();
    for entry in &cfg.commands {
        let command = entry.command().ok_or_else(|| {
            StorageError::validation(
                "commands.action",
                format!("cannot build command from action \"{}\"", entry.action),
            )
        })?;
        schedule.push(entry.tick, command);
    }
    Ok(schedule)
}
