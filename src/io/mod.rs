//! Input/output helpers.
//!
//! - observation ingest from text/CSV (`observations`)
//! - history export to long-format CSV (`export`)
//! - history JSON read/write (`history`)

pub mod export;
pub mod history;
pub mod observations;

pub use export::*;
pub use history::*;
pub use observations::*;
