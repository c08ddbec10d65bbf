//! The `Indicator`: one built table plus its canonical metadata.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::domain::{DimensionFilters, RawIndicatorData, RawMetadata};
use crate::error::IneError;
use crate::metadata::{MergedMetadata, merge_metadata};
use crate::table::{IndicatorTable, build_table, resolve};

pub const VALUE_FIELD: &str = "Value";
pub const DATA_FIELD: &str = "data";

/// An INE indicator: data table and merged metadata, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    table: IndicatorTable,
    metadata: MergedMetadata,
}

impl Indicator {
    pub fn new(table: IndicatorTable, metadata: MergedMetadata) -> Self {
        Self { table, metadata }
    }

    /// Build from the two `[0]`-wrapped payloads as returned by INE.
    pub fn from_payloads(data: &Value, metadata: &Value, filters: &DimensionFilters) -> Result<Self, IneError> {
        let data = RawIndicatorData::from_payload(data)?;
        let metadata = RawMetadata::from_payload(metadata)?;

        let axis = resolve(&metadata.dimensions, &metadata.categories, filters)?;
        let table = build_table(&data, &axis, &metadata.periodicity)?;
        let merged = merge_metadata(&data, &metadata)?;

        let (rows, cols) = table.shape();
        tracing::info!(rows, cols, values = table.count_values(), "indicator table built");
        Ok(Self::new(table, merged))
    }

    pub fn table(&self) -> &IndicatorTable {
        &self.table
    }

    pub fn metadata(&self) -> &MergedMetadata {
        &self.metadata
    }

    pub fn code(&self) -> Option<&str> {
        self.metadata.get_str("code")
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.get_str("description")
    }

    pub fn meta_info_url(&self) -> Option<&str> {
        self.metadata.get_str("meta_info_url")
    }

    pub fn last_update_date(&self) -> Option<&str> {
        self.metadata.get_str("last_update_date")
    }

    pub fn periodicity(&self) -> Option<&str> {
        self.metadata.get_str("periodicity")
    }

    /// ISO date of the first period.
    pub fn first_period(&self) -> Option<&str> {
        self.metadata.get_str("first_period")
    }

    /// ISO date of the last period.
    pub fn last_period(&self) -> Option<&str> {
        self.metadata.get_str("last_period")
    }

    pub fn unit(&self) -> Option<&str> {
        self.metadata.get_str("unit")
    }

    pub fn language(&self) -> Option<&str> {
        self.metadata.get_str("language")
    }

    pub fn geo_level(&self) -> Option<&str> {
        self.metadata.get_str("geo_level")
    }

    pub fn extraction_date(&self) -> Option<&Value> {
        self.metadata.get("extraction_date")
    }

    pub fn metadata_field(&self, name: &str) -> Option<&Value> {
        self.metadata.get(name)
    }

    /// Like [`Indicator::metadata_field`], but an absent field is an error.
    pub fn field(&self, name: &str) -> Result<&Value, IneError> {
        self.metadata
            .get(name)
            .ok_or_else(|| IneError::UnknownField(name.to_string()))
    }

    /// Unpivot the table: one record per (column, period), column-major.
    pub fn to_records(&self) -> Vec<FlatRecord> {
        let table = &self.table;
        let (n_rows, n_cols) = table.shape();
        let names = table.column_names();
        let mut out = Vec::with_capacity(n_rows * n_cols);

        for (col, labels) in table.columns().iter().enumerate() {
            for (row, period) in table.rows().iter().enumerate() {
                out.push(FlatRecord {
                    period: period.to_string(),
                    levels: names.iter().cloned().zip(labels.iter().cloned()).collect(),
                    value: table.cell(row, col),
                });
            }
        }
        out
    }

    /// Every metadata field plus `data` with the flat records.
    pub fn to_json(&self) -> Result<Value, IneError> {
        let mut out: Map<String, Value> = self.metadata.fields().clone();
        let records = serde_json::to_value(self.to_records())?;
        out.insert(DATA_FIELD.to_string(), records);
        Ok(Value::Object(out))
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Indicator: {} ({})>",
            self.description().unwrap_or("?"),
            self.code().unwrap_or("?")
        )
    }
}

/// One cell of the unpivoted table.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord {
    /// ISO date (or the raw label for unconverted periodicities).
    pub period: String,
    /// `(axis name, category label)` per column level.
    pub levels: Vec<(String, String)>,
    pub value: Option<f64>,
}

impl Serialize for FlatRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.levels.len() + 2))?;
        map.serialize_entry(crate::table::PERIOD_AXIS, &self.period)?;
        for (name, label) in &self.levels {
            map.serialize_entry(name, label)?;
        }
        map.serialize_entry(VALUE_FIELD, &self.value)?;
        map.end()
    }
}
