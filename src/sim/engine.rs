//! Simulation engine that drives a site through the command-then-advance tick loop.

use tracing::{debug, info, warn};

use crate::devices::types::hours_at;
use crate::site::Site;
use crate::strategy::{ChargingStrategy, Selection};

use super::clock::Clock;
use super::schedule::CommandSchedule;
use super::types::{Command, CommandOutcome, SimConfig, StepResult};

/// Simulation engine owning the site, its command schedule, and configuration.
///
/// Every tick runs in two phases: all commands scheduled for the tick are
/// issued against the pre-tick state, then every battery is advanced once.
pub struct Engine<S: ChargingStrategy> {
    config: SimConfig,
    site: Site<S>,
    schedule: CommandSchedule,
    /// Ticks already executed.
    elapsed: u64,
}

impl<S: ChargingStrategy> Engine<S> {
    /// Creates a new simulation engine.
    ///
    /// # Arguments
    ///
    /// * `config` - Run length and seed
    /// * `site` - Site to drive; its batteries may already have history
    /// * `schedule` - Commands keyed by tick, relative to the start of this run
    pub fn new(config: SimConfig, site: Site<S>, schedule: CommandSchedule) -> Self {
        Self {
            config,
            site,
            schedule,
            elapsed: 0,
        }
    }

    /// Executes the next tick and returns its record.
    pub fn step(&mut self) -> StepResult {
        let t = self.elapsed;

        // 1. Issue every command for this tick against the pre-tick state
        let commands: Vec<Command> = self.schedule.at(t).to_vec();
        let mut outcomes = Vec::with_capacity(commands.len());
        for command in commands {
            let outcome = self.apply(t, command);
            outcomes.push((command, outcome));
        }
        let site_state = self.site.state();

        // 2. Advance every battery exactly once
        let energy = self.site.increment();
        self.elapsed += 1;

        StepResult {
            tick: t,
            time_hr: hours_at(t),
            commands: outcomes,
            site_state,
            current_kwh: self.site.current_capacity(),
            state_of_charge: self.site.state_of_charge(),
            input_kwh: energy.input_kwh,
            output_kwh: energy.output_kwh,
        }
    }

    /// Executes all remaining ticks and returns their records.
    pub fn run(&mut self) -> Vec<StepResult> {
        let mut clock = Clock::new(self.config.ticks.saturating_sub(self.elapsed));
        let mut results = Vec::with_capacity(usize::try_from(clock.remaining()).unwrap_or(0));
        info!(
            site = self.site.id(),
            strategy = self.site.strategy().name(),
            batteries = self.site.batteries().len(),
            seed = self.config.seed,
            commands = self.schedule.len(),
            ticks = clock.remaining(),
            "starting run"
        );
        if self.schedule.is_empty() {
            debug!(site = self.site.id(), "no commands scheduled");
        }
        clock.run(|_| results.push(self.step()));
        info!(
            site = self.site.id(),
            stored_kwh = %self.site.current_capacity(),
            "run finished"
        );
        results
    }

    fn apply(&mut self, tick: u64, command: Command) -> CommandOutcome {
        let result = match command {
            Command::Charge { rate_kw } => self.site.charge(rate_kw),
            Command::Discharge { rate_kw } => self.site.discharge(rate_kw),
            Command::Idle => {
                self.site.idle();
                debug!(tick, "site idled");
                return CommandOutcome::Applied {
                    battery_ids: Vec::new(),
                    partial: false,
                };
            }
        };

        match result {
            Ok(selection) => self.applied(tick, command, &selection),
            Err(err) => {
                warn!(tick, %command, error = %err, "command rejected");
                CommandOutcome::Rejected {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn applied(&self, tick: u64, command: Command, selection: &Selection) -> CommandOutcome {
        let battery_ids: Vec<String> = selection
            .indices()
            .iter()
            .map(|&i| self.site.batteries()[i].id().to_string())
            .collect();
        let partial = selection.is_partial();
        if partial {
            warn!(
                tick,
                %command,
                selected_kw = %selection.selected_kw(),
                shortfall_kw = %selection.shortfall_kw(),
                "command only partially fulfilled"
            );
        } else {
            debug!(tick, %command, batteries = ?battery_ids, "command applied");
        }
        CommandOutcome::Applied {
            battery_ids,
            partial,
        }
    }

    /// Returns a reference to the site.
    pub fn site(&self) -> &Site<S> {
        &self.site
    }

    /// Returns a reference to the simulation configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::{Decimal, dec};

    use super::*;
    use crate::devices::{Battery, BatteryState};
    use crate::strategy::LowestToHighest;

    fn engine(ticks: u64, schedule: CommandSchedule) -> Engine<LowestToHighest> {
        let batteries = vec![
            Battery::with_charge("a", dec!(120), dec!(60), dec!(20)).expect("valid battery"),
            Battery::with_charge("b", dec!(120), dec!(60), dec!(100)).expect("valid battery"),
        ];
        let site = Site::new("s-1", "Depot", batteries, LowestToHighest).expect("valid site");
        Engine::new(SimConfig::new(ticks, 0), site, schedule)
    }

    #[test]
    fn run_produces_one_record_per_tick() {
        let mut e = engine(5, CommandSchedule::new());
        let results = e.run();
        assert_eq!(results.len(), 5);
        assert_eq!(e.site().ticks(), 5);
        assert!(results.iter().all(|r| r.site_state == BatteryState::Idle));
    }

    #[test]
    fn commands_apply_before_the_tick_advances() {
        let schedule = CommandSchedule::new()
            .with(0, Command::Charge { rate_kw: dec!(60) })
            .with(2, Command::Idle);
        let mut e = engine(4, schedule);
        let results = e.run();

        assert_eq!(results[0].input_kwh, Decimal::ONE);
        assert_eq!(results[0].site_state, BatteryState::Charging);
        assert_eq!(results[1].input_kwh, Decimal::ONE);
        assert_eq!(results[2].input_kwh, Decimal::ZERO);
        assert_eq!(
            e.site().battery("a").map(Battery::current_capacity),
            Some(dec!(22))
        );
    }

    #[test]
    fn rejected_and_partial_commands_are_recorded() {
        let schedule = CommandSchedule::new()
            .with(0, Command::Discharge { rate_kw: dec!(500) })
            .with(1, Command::Discharge { rate_kw: dec!(10) });
        let mut e = engine(2, schedule);
        let results = e.run();

        assert!(results[0].commands[0].1.is_partial());
        assert!(results[1].commands[0].1.is_rejected());
        assert_eq!(results[0].output_kwh, dec!(2));
    }

    #[test]
    fn time_advances_one_minute_per_tick() {
        let mut e = engine(61, CommandSchedule::new());
        let results = e.run();
        assert_eq!(results[60].time_hr, Decimal::ONE);
    }
}
