//! Error taxonomy shared by batteries, strategies, and sites.

use thiserror::Error;

use crate::devices::types::Direction;

/// Failures surfaced by the storage core.
///
/// Every failure is returned synchronously to the immediate caller; the core
/// never retries or logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// A constructor argument or command parameter is out of range.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("battery {battery_id} is full and cannot charge")]
    BatteryFull { battery_id: String },

    #[error("battery {battery_id} is empty and cannot discharge")]
    BatteryEmpty { battery_id: String },

    /// No battery satisfies the strategy's state predicate.
    #[error("no battery is eligible to {direction}")]
    Eligibility { direction: Direction },

    /// Per-battery tick counters disagree, so tick histories cannot be zipped.
    #[error("battery {battery_id} has advanced {ticks} ticks, expected {expected}")]
    TickMisaligned {
        battery_id: String,
        ticks: u64,
        expected: u64,
    },
}

impl StorageError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}
