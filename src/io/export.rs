//! CSV export for simulation step results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::StepResult;

/// Column header for CSV telemetry export.
const HEADER: &str = "tick,time_hr,command,outcome,site_state,current_kwh,\
                      state_of_charge,input_kwh,output_kwh";

/// Exports simulation results to a CSV file at the given path.
///
/// Writes a header row followed by one data row per tick. Ticks with several
/// commands join them with `;` in the `command` and `outcome` columns; ticks
/// without commands leave both empty.
///
/// # Arguments
///
/// * `results` - Complete simulation step results
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &[StepResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(results, buf)
}

/// Writes simulation results as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &[StepResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in results {
        let commands: Vec<String> = r.commands.iter().map(|(c, _)| c.to_string()).collect();
        let outcomes: Vec<String> = r.commands.iter().map(|(_, o)| o.to_string()).collect();
        wtr.write_record(&[
            r.tick.to_string(),
            format!("{:.4}", r.time_hr),
            commands.join(";"),
            outcomes.join(";"),
            r.site_state.to_string(),
            format!("{:.4}", r.current_kwh),
            format!("{:.4}", r.state_of_charge),
            format!("{:.4}", r.input_kwh),
            format!("{:.4}", r.output_kwh),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
