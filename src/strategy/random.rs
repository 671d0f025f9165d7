use rand::{Rng, SeedableRng, rngs::StdRng};
use rust_decimal::Decimal;

use super::{ChargingStrategy, Selection, eligible, validate_rate};
use crate::devices::{Battery, Direction};
use crate::error::StorageError;

/// Picks eligible batteries uniformly at random.
///
/// The random source is owned by the strategy and injected at construction,
/// so two strategies built from the same seed make identical selections.
/// Extra batteries needed to cover a rate are drawn without replacement.
#[derive(Debug, Clone)]
pub struct RandomStrategy<R = StdRng> {
    rng: R,
}

impl RandomStrategy<StdRng> {
    /// Creates a strategy backed by a seeded `StdRng`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomStrategy<R> {
    /// Creates a strategy drawing from the given random source.
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }

    fn select(
        &mut self,
        direction: Direction,
        requested_kw: Decimal,
        batteries: &[Battery],
    ) -> Result<Selection, StorageError> {
        validate_rate(requested_kw)?;
        let mut pool = eligible(direction, batteries)?;
        let rng = &mut self.rng;
        let draws = std::iter::from_fn(|| {
            if pool.is_empty() {
                None
            } else {
                let pick = rng.random_range(0..pool.len());
                Some(pool.remove(pick))
            }
        });
        Ok(Selection::accumulate(requested_kw, batteries, draws))
    }
}

impl<R: Rng> ChargingStrategy for RandomStrategy<R> {
    fn determine_charge_battery(
        &mut self,
        requested_kw: Decimal,
        batteries: &[Battery],
    ) -> Result<Selection, StorageError> {
        self.select(Direction::Charge, requested_kw, batteries)
    }

    fn determine_discharge_battery(
        &mut self,
        requested_kw: Decimal,
        batteries: &[Battery],
    ) -> Result<Selection, StorageError> {
        self.select(Direction::Discharge, requested_kw, batteries)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}
