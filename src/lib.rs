//! Mediacook - per-content-type media processing
//!
//! This library crate exposes the recipe table, the phase scheduler and the
//! compression rate calculator for the binary and for integration testing.

pub mod config;
pub mod rate;
pub mod recipe;
pub mod scheduler;
