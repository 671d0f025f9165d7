use rust_decimal::Decimal;

use super::{ChargingStrategy, Selection, eligible, validate_rate};
use crate::devices::{Battery, Direction};
use crate::error::StorageError;

/// Charges the least-full eligible battery first and discharges the
/// most-full one first.
///
/// When one battery cannot meet the requested rate, the next battery in the
/// same order is added until the rate is covered. Ties keep list order, so
/// selection is deterministic for a fixed battery list.
#[derive(Debug, Default, Clone, Copy)]
pub struct LowestToHighest;

impl LowestToHighest {
    /// Eligible indices ranked by stored energy.
    ///
    /// The sort is stable, so equal capacities keep their list order.
    fn ranked(
        direction: Direction,
        batteries: &[Battery],
    ) -> Result<Vec<usize>, StorageError> {
        let mut ranked: Vec<(usize, Decimal)> = eligible(direction, batteries)?
            .into_iter()
            .map(|i| (i, batteries[i].current_capacity()))
            .collect();
        match direction {
            Direction::Charge => ranked.sort_by(|a, b| a.1.cmp(&b.1)),
            Direction::Discharge => ranked.sort_by(|a, b| b.1.cmp(&a.1)),
        }
        Ok(ranked.into_iter().map(|(i, _)| i).collect())
    }

    fn select(
        direction: Direction,
        requested_kw: Decimal,
        batteries: &[Battery],
    ) -> Result<Selection, StorageError> {
        validate_rate(requested_kw)?;
        let ranked = Self::ranked(direction, batteries)?;
        Ok(Selection::accumulate(requested_kw, batteries, ranked))
    }
}

impl ChargingStrategy for LowestToHighest {
    fn determine_charge_battery(
        &mut self,
        requested_kw: Decimal,
        batteries: &[Battery],
    ) -> Result<Selection, StorageError> {
        Self::select(Direction::Charge, requested_kw, batteries)
    }

    fn determine_discharge_battery(
        &mut self,
        requested_kw: Decimal,
        batteries: &[Battery],
    ) -> Result<Selection, StorageError> {
        Self::select(Direction::Discharge, requested_kw, batteries)
    }

    fn name(&self) -> &'static str {
        "lowest_to_highest"
    }
}
