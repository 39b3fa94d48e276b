//! `bayes-grid` library crate.
//!
//! Sequential Bayesian inference for the mean and standard deviation of a normal
//! population over a discrete `(mean, sd)` grid. Each observation turns the
//! current posterior into the next one; every intermediate posterior is kept.
//!
//! The binary (`bg`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the inference engine is reusable by other front-ends (charts, notebooks, etc.)

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod inference;
pub mod io;
pub mod math;
pub mod report;
