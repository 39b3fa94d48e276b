//! Mathematical utilities: normal densities and log-domain reductions.

pub mod normal;

pub use normal::*;
