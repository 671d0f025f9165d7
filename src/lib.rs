//! Grid battery storage simulator.
//!
//! Batteries are one-minute-tick state machines grouped into sites; a site
//! routes charge and discharge commands through a pluggable charging strategy.

pub mod cli;
pub mod config;
pub mod devices;
pub mod error;
pub mod id;
pub mod io;
pub mod scenario;
/// Simulation engine, clock, schedule, and run summaries.
pub mod sim;
pub mod site;
pub mod strategy;
