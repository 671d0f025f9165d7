//! Battery site simulator entry point: CLI wiring, logging, and config-driven runs.

use std::io;
use std::process;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use battery_sim::cli::{self, CliOptions};
use battery_sim::config::ScenarioConfig;
use battery_sim::io::export::export_csv;
use battery_sim::scenario::build_engine;
use battery_sim::sim::kpi::RunSummary;

fn load_scenario(opts: &CliOptions) -> Result<ScenarioConfig, String> {
    let mut scenario = match (&opts.scenario, &opts.preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(path),
        (None, Some(name)) => ScenarioConfig::from_preset(name),
        (None, None) => Ok(ScenarioConfig::baseline()),
    }
    .map_err(|e| e.to_string())?;

    if let Some(seed) = opts.seed {
        scenario.simulation.seed = seed;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(lines.join("\n"));
    }
    Ok(scenario)
}

fn main() {
    // stdout is reserved for the step table
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(2);
        }
    };
    if opts.help {
        cli::print_usage();
        return;
    }

    let scenario = match load_scenario(&opts) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let mut engine = match build_engine(&scenario) {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, "failed to build scenario");
            process::exit(1);
        }
    };
    let results = engine.run();

    for r in &results {
        println!("{r}");
    }
    println!("\n{}", RunSummary::from_results(&results));

    if let Some(ref path) = opts.telemetry_out {
        if let Err(e) = export_csv(&results, path) {
            error!(path = %path.display(), error = %e, "failed to write CSV");
            process::exit(1);
        }
        info!(path = %path.display(), rows = results.len(), "telemetry written");
    }
}
