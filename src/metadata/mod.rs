//! Canonical indicator metadata.

pub mod merge;

pub use merge::{MergedMetadata, canonical_name, geo_level, merge_metadata};
