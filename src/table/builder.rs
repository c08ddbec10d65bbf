//! Dense table assembly from sparse per-period records.
//!
//! The builder preallocates every (period, column) cell before reading a single
//! record, so inserting never creates rows or columns on the fly: a record
//! either lands on an existing cell or is dropped.

use std::collections::HashMap;

use crate::domain::{Periodicity, RawIndicatorData, StatRecord};
use crate::error::IneError;
use crate::table::dimensions::{Axis, ColumnAxis};
use crate::table::period::{self, Period};

pub const PERIOD_AXIS: &str = "Period";

/// Period rows × multi-level columns of optional values.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorTable {
    rows: Vec<Period>,
    column_names: Vec<String>,
    columns: Vec<Vec<String>>,
    /// Row-major, `rows.len() * columns.len()`.
    cells: Vec<Option<f64>>,
}

impl IndicatorTable {
    pub fn row_axis_name(&self) -> &'static str {
        PERIOD_AXIS
    }

    pub fn rows(&self) -> &[Period] {
        &self.rows
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn columns(&self) -> &[Vec<String>] {
        &self.columns
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.rows.len() || column >= self.columns.len() {
            return None;
        }
        self.cells[row * self.columns.len() + column]
    }

    /// Look a value up by period and column labels.
    pub fn value<S: AsRef<str>>(&self, period: &Period, column: &[S]) -> Option<f64> {
        let row = self.rows.iter().position(|p| p == period)?;
        let col = self
            .columns
            .iter()
            .position(|c| c.len() == column.len() && c.iter().zip(column).all(|(a, b)| a == b.as_ref()))?;
        self.cell(row, col)
    }

    /// Number of cells holding a value.
    pub fn count_values(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Matches records against a resolved [`ColumnAxis`] and fills the table.
pub struct TableBuilder<'a> {
    axis: &'a ColumnAxis,
    periodicity: &'a Periodicity,
}

impl<'a> TableBuilder<'a> {
    pub fn new(axis: &'a ColumnAxis, periodicity: &'a Periodicity) -> Self {
        Self { axis, periodicity }
    }

    pub fn build(&self, data: &RawIndicatorData) -> Result<IndicatorTable, IneError> {
        let columns = self.axis.sorted_columns();
        if columns.is_empty() {
            return Err(IneError::Validation(
                "dimension filters leave no columns to fill".to_string(),
            ));
        }
        let column_index: HashMap<&[String], usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_slice(), i))
            .collect();

        let n_cols = columns.len();
        let mut cells = vec![None; data.periods.len() * n_cols];
        let mut dropped = 0usize;

        for (row, (label, records)) in data.periods.iter().enumerate() {
            for record in records {
                let Some(key) = self.column_key(record) else {
                    dropped += 1;
                    tracing::trace!(period = %label, geocode = %record.geocode, "record outside built columns");
                    continue;
                };
                let Some(&col) = column_index.get(key.as_slice()) else {
                    dropped += 1;
                    continue;
                };
                if let Some(value) = record.value {
                    cells[row * n_cols + col] = Some(value);
                }
            }
        }

        if dropped > 0 {
            tracing::debug!(dropped, "records did not match any column");
        }

        // Rows keep payload order after conversion.
        let rows = data
            .periods
            .iter()
            .map(|(label, _)| period::normalize(self.periodicity, label))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen: HashMap<&Period, &str> = HashMap::with_capacity(rows.len());
        for (period, (label, _)) in rows.iter().zip(&data.periods) {
            if let Some(first) = seen.insert(period, label) {
                return Err(IneError::Decode(format!(
                    "period labels '{first}' and '{label}' both map to {period}"
                )));
            }
        }

        Ok(IndicatorTable {
            rows,
            column_names: self.axis.names(),
            columns,
            cells,
        })
    }

    /// Column labels for a record, or `None` when any level has no matching category.
    fn column_key(&self, record: &StatRecord) -> Option<Vec<String>> {
        self.axis
            .axes()
            .iter()
            .map(|axis| match_level(axis, record))
            .collect()
    }
}

fn match_level(axis: &Axis, record: &StatRecord) -> Option<String> {
    let (code, label) = if axis.is_location() {
        (Some(record.geocode.as_str()), record.geo_label.as_deref())
    } else {
        let value = record.dimension(axis.dimension)?;
        (value.code.as_deref(), value.label.as_deref())
    };

    // A record carrying a code is placed by that code alone; labels can repeat.
    let found = match code.filter(|c| !c.is_empty()) {
        Some(code) => axis.categories.iter().find(|c| c.code == code),
        None => {
            let label = label?;
            // Repeated labels carry a " (code)" suffix on the axis.
            let mut matches = axis
                .categories
                .iter()
                .filter(|c| c.label == label || c.label == format!("{label} ({})", c.code));
            match (matches.next(), matches.next()) {
                (Some(only), None) => Some(only),
                _ => None,
            }
        }
    };
    found.map(|c| c.label.clone())
}

/// Convenience wrapper around [`TableBuilder`].
pub fn build_table(
    data: &RawIndicatorData,
    axis: &ColumnAxis,
    periodicity: &Periodicity,
) -> Result<IndicatorTable, IneError> {
    TableBuilder::new(axis, periodicity).build(data)
}
