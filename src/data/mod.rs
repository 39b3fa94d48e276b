//! Observation sources that live inside the crate (synthetic streams).

pub mod sample;

pub use sample::*;
