//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the hypothesis space (`Hypothesis`, `HypothesisGrid`)
//! - posterior state (`PosteriorSnapshot`, `History`)
//! - run configuration (`GridRange`, `GridConfig`, `LikelihoodMode`, `RunConfig`)

pub mod types;

pub use types::*;
