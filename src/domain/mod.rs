//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - request parameters (`DataKind`, `DimensionFilters`)
//! - the periodicity tag (`Periodicity`)
//! - typed views over the INE data and metadata payloads

pub mod types;

pub use types::*;
