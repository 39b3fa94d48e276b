//! Grid-approximation Bayesian inference for a normal population's mean and sd.
//!
//! Responsibilities:
//!
//! - build the hypothesis grid and uniform prior (`grid`)
//! - evaluate batch likelihoods per hypothesis (`likelihood`)
//! - apply Bayes' rule over the whole grid (`update`, parallel per cell)
//! - fold the observation stream into a snapshot history (`sequential`)

pub mod grid;
pub mod likelihood;
pub mod sequential;
pub mod update;

pub use grid::*;
pub use likelihood::*;
pub use sequential::*;
pub use update::*;
