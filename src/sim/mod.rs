/// Simulation clock for tick management.
pub mod clock;
pub mod engine;
pub mod kpi;
/// Per-tick command scheduling.
pub mod schedule;
pub mod types;
