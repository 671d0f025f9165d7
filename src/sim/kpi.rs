//! Post-hoc run summary computed from step records.

use std::fmt;

use rust_decimal::Decimal;

use super::types::StepResult;

/// Aggregate metrics derived from a complete simulation run.
///
/// Computed post-hoc from `Vec<StepResult>` so the summary always agrees
/// with the per-tick records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of ticks simulated.
    pub ticks: usize,
    /// Total energy charged (kWh).
    pub energy_in_kwh: Decimal,
    /// Total energy discharged (kWh).
    pub energy_out_kwh: Decimal,
    /// Stored energy after the last tick (kWh).
    pub final_kwh: Decimal,
    /// State of charge after the last tick (0 to 1).
    pub final_state_of_charge: Decimal,
    /// Commands issued across the run.
    pub commands_issued: usize,
    /// Commands that failed.
    pub commands_rejected: usize,
    /// Commands whose selected batteries fell short of the requested rate.
    pub commands_partial: usize,
    /// Ticks during which at least one battery moved energy.
    pub active_ticks: usize,
}

impl RunSummary {
    /// Computes the summary from the complete step record vector.
    pub fn from_results(results: &[StepResult]) -> Self {
        let mut summary = Self {
            ticks: results.len(),
            energy_in_kwh: Decimal::ZERO,
            energy_out_kwh: Decimal::ZERO,
            final_kwh: Decimal::ZERO,
            final_state_of_charge: Decimal::ZERO,
            commands_issued: 0,
            commands_rejected: 0,
            commands_partial: 0,
            active_ticks: 0,
        };

        for r in results {
            summary.energy_in_kwh += r.input_kwh;
            summary.energy_out_kwh += r.output_kwh;
            if !(r.input_kwh.is_zero() && r.output_kwh.is_zero()) {
                summary.active_ticks += 1;
            }
            for (_, outcome) in &r.commands {
                summary.commands_issued += 1;
                if outcome.is_rejected() {
                    summary.commands_rejected += 1;
                }
                if outcome.is_partial() {
                    summary.commands_partial += 1;
                }
            }
        }

        if let Some(last) = results.last() {
            summary.final_kwh = last.current_kwh;
            summary.final_state_of_charge = last.state_of_charge;
        }
        summary
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ---")?;
        writeln!(f, "Ticks simulated:       {} ({} active)", self.ticks, self.active_ticks)?;
        writeln!(f, "Energy charged:        {:.3} kWh", self.energy_in_kwh)?;
        writeln!(f, "Energy discharged:     {:.3} kWh", self.energy_out_kwh)?;
        writeln!(
            f,
            "Final stored energy:   {:.3} kWh (SoC={:.1}%)",
            self.final_kwh,
            self.final_state_of_charge * Decimal::ONE_HUNDRED
        )?;
        write!(
            f,
            "Commands:              {} issued, {} rejected, {} partial",
            self.commands_issued, self.commands_rejected, self.commands_partial
        )
    }
}
