//! Input/output helpers.
//!
//! - indicator exports (JSON/CSV) (`export`)
//! - reading pre-fetched payload files (`payload`)

pub mod export;
pub mod payload;

pub use export::*;
pub use payload::*;
