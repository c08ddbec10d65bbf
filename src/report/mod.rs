//! Reporting utilities: formatted terminal output.
//!
//! Formatting stays out of the table/metadata code so output changes are
//! localized.

pub mod format;

pub use format::{format_preview, format_summary};
