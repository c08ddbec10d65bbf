//! Column axis resolution from metadata dimension descriptors.
//!
//! Dimension 1 on the wire is the reference period and never becomes a column
//! level. The first remaining dimension is geography and is always exposed as
//! the `Location` axis; later dimensions are named by their abbreviation.

use crate::domain::{Category, CategoryEntry, DimensionDescriptor, DimensionFilters};
use crate::error::IneError;

pub const LOCATION_AXIS: &str = "Location";

/// Dimension number INE reserves for the reference period.
pub const PERIOD_DIMENSION: u32 = 1;

/// One column level: a dimension and the categories kept for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    pub name: String,
    pub dimension: u32,
    pub categories: Vec<Category>,
}

impl Axis {
    pub fn is_location(&self) -> bool {
        self.name == LOCATION_AXIS
    }
}

/// Ordered column levels. Columns are the Cartesian product of the levels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnAxis {
    axes: Vec<Axis>,
}

impl ColumnAxis {
    pub fn new(axes: Vec<Axis>) -> Self {
        Self { axes }
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn names(&self) -> Vec<String> {
        self.axes.iter().map(|a| a.name.clone()).collect()
    }

    /// Product of category counts (0 if any level is empty, 0 with no levels).
    pub fn cardinality(&self) -> usize {
        if self.axes.is_empty() {
            return 0;
        }
        self.axes.iter().map(|a| a.categories.len()).product()
    }

    /// Label tuples of every column, in declared (not yet sorted) order.
    pub fn product(&self) -> Vec<Vec<String>> {
        if self.axes.is_empty() {
            return Vec::new();
        }
        let mut out: Vec<Vec<String>> = vec![Vec::with_capacity(self.axes.len())];
        for axis in &self.axes {
            let mut next = Vec::with_capacity(out.len() * axis.categories.len());
            for prefix in &out {
                for cat in &axis.categories {
                    let mut key = prefix.clone();
                    key.push(cat.label.clone());
                    next.push(key);
                }
            }
            out = next;
        }
        out
    }

    /// Label tuples sorted lexicographically, the order used by the table.
    pub fn sorted_columns(&self) -> Vec<Vec<String>> {
        let mut cols = self.product();
        cols.sort();
        cols
    }
}

/// Build the column axis for the given descriptors, categories and filters.
///
/// A filter that matches no category of its dimension leaves that level empty;
/// use [`resolve`] to turn that into an error.
pub fn resolve_axis(
    descriptors: &[DimensionDescriptor],
    categories: &[CategoryEntry],
    filters: &DimensionFilters,
) -> ColumnAxis {
    let mut axes = Vec::new();

    for descriptor in descriptors.iter().filter(|d| d.number != PERIOD_DIMENSION) {
        let wanted = filters.get(descriptor.number);
        let mut kept: Vec<Category> = Vec::new();

        for entry in categories.iter().filter(|e| e.dimension == descriptor.number) {
            if wanted.is_some_and(|code| entry.code != code) {
                continue;
            }
            let Some(category) = entry.categories.first() else {
                continue;
            };
            if kept.iter().any(|c| c.code == category.code) {
                continue;
            }
            // Column tuples are built from labels, so a repeated label gets its code appended.
            let mut category = category.clone();
            if kept.iter().any(|c| c.label == category.label) {
                tracing::debug!(
                    dimension = descriptor.number,
                    label = %category.label,
                    code = %category.code,
                    "duplicate category label"
                );
                category.label = format!("{} ({})", category.label, category.code);
            }
            kept.push(category);
        }

        let name = if axes.is_empty() {
            LOCATION_AXIS.to_string()
        } else {
            descriptor.abbreviation.clone()
        };
        axes.push(Axis {
            name,
            dimension: descriptor.number,
            categories: kept,
        });
    }

    ColumnAxis::new(axes)
}

/// Like [`resolve_axis`], but rejects filters that empty a dimension.
pub fn resolve(
    descriptors: &[DimensionDescriptor],
    categories: &[CategoryEntry],
    filters: &DimensionFilters,
) -> Result<ColumnAxis, IneError> {
    let axis = resolve_axis(descriptors, categories, filters);
    if axis.axes().is_empty() {
        return Err(IneError::Decode(
            "metadata describes no dimensions besides the reference period".to_string(),
        ));
    }
    if let Some(empty) = axis.axes().iter().find(|a| a.categories.is_empty()) {
        let message = match filters.get(empty.dimension) {
            Some(code) => format!(
                "Filter Dim{}={code} matches no category of dimension '{}'.",
                empty.dimension, empty.name
            ),
            None => format!("Dimension '{}' has no categories.", empty.name),
        };
        return Err(IneError::Validation(message));
    }
    Ok(axis)
}
