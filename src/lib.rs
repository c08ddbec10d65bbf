//! `ine-indicators` library crate.
//!
//! Fetches Statistics Portugal (INE) indicators and reshapes the nested,
//! dimension-encoded JSON into a dense period × dimension table plus one
//! canonical metadata record.
//!
//! The binary (`ine`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes or touching the network
//! - the reshaping engine is reusable from other tools

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod indicator;
pub mod io;
pub mod metadata;
pub mod report;
pub mod table;

pub use data::{IndicatorQuery, IneClient};
pub use error::IneError;
pub use indicator::Indicator;
