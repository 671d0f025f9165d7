//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::devices::Battery;
use crate::sim::types::Command;
use crate::strategy::SiteStrategy;

/// Top-level scenario configuration parsed from TOML.
///
/// All sections have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run length, seed, and strategy.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Site parameters.
    #[serde(default)]
    pub site: SiteConfig,
    /// Battery groups installed at the site, in site order.
    #[serde(default = "default_batteries")]
    pub batteries: Vec<BatteryConfig>,
    /// Commands issued to the site during the run.
    #[serde(default)]
    pub commands: Vec<CommandConfig>,
}

/// Run length, seed, and strategy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of one-minute ticks to simulate (must be > 0).
    pub ticks: u64,
    /// Master random seed.
    pub seed: u64,
    /// Charging strategy: `"lowest_to_highest"` or `"random"`.
    pub strategy: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: 180,
            seed: 42,
            strategy: "lowest_to_highest".to_string(),
        }
    }
}

/// Site parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Free-form site location.
    pub location: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            location: "Main Street Substation".to_string(),
        }
    }
}

/// A group of identical batteries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Energy capacity per battery (kWh).
    pub energy_capacity_kwh: Decimal,
    /// Power capacity per battery (kW).
    pub power_capacity_kw: Decimal,
    /// Stored energy per battery at the start of the run (kWh).
    pub initial_kwh: Decimal,
    /// Number of batteries in the group (must be > 0).
    pub count: usize,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            energy_capacity_kwh: Decimal::from(5000),
            power_capacity_kw: Decimal::from(2500),
            initial_kwh: Decimal::ZERO,
            count: 1,
        }
    }
}

/// One scheduled site command.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    /// Tick at which the command is issued.
    pub tick: u64,
    /// `"charge"`, `"discharge"`, or `"idle"`.
    pub action: String,
    /// Requested rate (kW); required for charge and discharge.
    #[serde(default)]
    pub rate_kw: Option<Decimal>,
}

impl CommandConfig {
    fn new(tick: u64, action: &str, rate_kw: Option<Decimal>) -> Self {
        Self {
            tick,
            action: action.to_string(),
            rate_kw,
        }
    }

    /// The site command this entry describes.
    ///
    /// Returns `None` for an unknown action or a charge/discharge without a rate.
    pub fn command(&self) -> Option<Command> {
        match (self.action.as_str(), self.rate_kw) {
            ("charge", Some(rate_kw)) => Some(Command::Charge { rate_kw }),
            ("discharge", Some(rate_kw)) => Some(Command::Discharge { rate_kw }),
            ("idle", _) => Some(Command::Idle),
            _ => None,
        }
    }
}

fn default_batteries() -> Vec<BatteryConfig> {
    vec![
        BatteryConfig {
            initial_kwh: Decimal::from(1000),
            ..BatteryConfig::default()
        },
        BatteryConfig {
            initial_kwh: Decimal::from(4000),
            ..BatteryConfig::default()
        },
    ]
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.ticks"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Two grid batteries at 1000 and 4000 kWh: the fuller one discharges for
    /// an hour, then the emptier one charges for an hour.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            site: SiteConfig::default(),
            batteries: default_batteries(),
            commands: vec![
                CommandConfig::new(0, "discharge", Some(Decimal::from(2500))),
                CommandConfig::new(60, "idle", None),
                CommandConfig::new(60, "charge", Some(Decimal::from(2500))),
                CommandConfig::new(120, "idle", None),
            ],
        }
    }

    /// One full grid battery discharged for a single tick.
    pub fn grid_demo() -> Self {
        Self {
            simulation: SimulationConfig {
                ticks: 1,
                ..SimulationConfig::default()
            },
            site: SiteConfig {
                location: "Grid Demo".to_string(),
            },
            batteries: vec![BatteryConfig {
                initial_kwh: Decimal::from(5000),
                ..BatteryConfig::default()
            }],
            commands: vec![CommandConfig::new(0, "discharge", Some(Decimal::from(2500)))],
        }
    }

    /// Mixed battery sizes under the random strategy, with requests larger
    /// than any single battery.
    pub fn mixed_fleet() -> Self {
        Self {
            simulation: SimulationConfig {
                ticks: 240,
                seed: 7,
                strategy: "random".to_string(),
            },
            site: SiteConfig::default(),
            batteries: vec![
                BatteryConfig {
                    energy_capacity_kwh: Decimal::from(2000),
                    power_capacity_kw: Decimal::from(500),
                    initial_kwh: Decimal::from(1500),
                    count: 2,
                },
                BatteryConfig {
                    energy_capacity_kwh: Decimal::from(5000),
                    power_capacity_kw: Decimal::from(2500),
                    initial_kwh: Decimal::from(2500),
                    count: 1,
                },
            ],
            commands: vec![
                CommandConfig::new(0, "discharge", Some(Decimal::from(3000))),
                CommandConfig::new(90, "idle", None),
                CommandConfig::new(120, "charge", Some(Decimal::from(5000))),
                CommandConfig::new(200, "idle", None),
            ],
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "grid_demo", "mixed_fleet"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "grid_demo" => Ok(Self::grid_demo()),
            "mixed_fleet" => Ok(Self::mixed_fleet()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.ticks == 0 {
            errors.push(ConfigError {
                field: "simulation.ticks".into(),
                message: "must be > 0".into(),
            });
        }
        if !SiteStrategy::NAMES.contains(&s.strategy.as_str()) {
            errors.push(ConfigError {
                field: "simulation.strategy".into(),
                message: format!(
                    "must be one of {}, got \"{}\"",
                    SiteStrategy::NAMES.join(", "),
                    s.strategy
                ),
            });
        }

        if self.batteries.is_empty() {
            errors.push(ConfigError {
                field: "batteries".into(),
                message: "at least one battery group is required".into(),
            });
        }
        for (i, bat) in self.batteries.iter().enumerate() {
            let max = Battery::MAX_CAPACITY;
            if bat.energy_capacity_kwh <= Decimal::ZERO || bat.energy_capacity_kwh > max {
                errors.push(ConfigError {
                    field: format!("batteries[{i}].energy_capacity_kwh"),
                    message: format!("must be in (0, {max}]"),
                });
            }
            if bat.power_capacity_kw <= Decimal::ZERO || bat.power_capacity_kw > max {
                errors.push(ConfigError {
                    field: format!("batteries[{i}].power_capacity_kw"),
                    message: format!("must be in (0, {max}]"),
                });
            } else if bat.energy_capacity_kwh > Decimal::ZERO
                && bat.energy_capacity_kwh.checked_div(bat.power_capacity_kw).is_none()
            {
                errors.push(ConfigError {
                    field: format!("batteries[{i}].power_capacity_kw"),
                    message: "too small for energy_capacity_kwh".into(),
                });
            }
            if bat.initial_kwh < Decimal::ZERO || bat.initial_kwh > bat.energy_capacity_kwh {
                errors.push(ConfigError {
                    field: format!("batteries[{i}].initial_kwh"),
                    message: "must be in [0, energy_capacity_kwh]".into(),
                });
            }
            if bat.count == 0 {
                errors.push(ConfigError {
                    field: format!("batteries[{i}].count"),
                    message: "must be > 0".into(),
                });
            }
        }

        for (i, cmd) in self.commands.iter().enumerate() {
            if cmd.tick >= s.ticks {
                errors.push(ConfigError {
                    field: format!("commands[{i}].tick"),
                    message: format!("must be < simulation.ticks ({})", s.ticks),
                });
            }
            match cmd.command() {
                None => errors.push(ConfigError {
                    field: format!("commands[{i}].action"),
                    message: format!(
                        "must be \"charge\" or \"discharge\" with rate_kw, or \"idle\", got \"{}\"",
                        cmd.action
                    ),
                }),
                Some(Command::Charge { rate_kw } | Command::Discharge { rate_kw })
                    if rate_kw <= Decimal::ZERO =>
                {
                    errors.push(ConfigError {
                        field: format!("commands[{i}].rate_kw"),
                        message: "must be > 0".into(),
                    });
                }
                Some(_) => {}
            }
        }

        errors
    }
}
