//! Reshaping INE payloads into a dense table.
//!
//! - period label → date (`period`)
//! - dimension descriptors → column axis (`dimensions`)
//! - sparse records → dense table (`builder`)

pub mod builder;
pub mod dimensions;
pub mod period;

pub use builder::{IndicatorTable, PERIOD_AXIS, TableBuilder, build_table};
pub use dimensions::{Axis, ColumnAxis, LOCATION_AXIS, resolve, resolve_axis};
pub use period::{Period, normalize};
