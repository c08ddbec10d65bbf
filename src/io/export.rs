//! Export an indicator to JSON or CSV.
//!
//! - JSON: every metadata field plus `data`, the unpivoted records
//! - CSV: the unpivoted records only (`Period`, one column per level, `Value`)

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::IneError;
use crate::indicator::{Indicator, VALUE_FIELD};
use crate::table::PERIOD_AXIS;

/// Write `Indicator::to_json` as pretty JSON.
pub fn write_indicator_json(path: &Path, indicator: &Indicator) -> Result<(), IneError> {
    let file = File::create(path)
        .map_err(|e| IneError::Io(format!("Failed to create export JSON '{}': {e}", path.display())))?;
    let value = indicator.to_json()?;
    serde_json::to_writer_pretty(file, &value)
        .map_err(|e| IneError::Io(format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

/// Write the flat records as CSV. Missing values are empty cells.
pub fn write_records_csv(path: &Path, indicator: &Indicator) -> Result<(), IneError> {
    let file = File::create(path)
        .map_err(|e| IneError::Io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_records_csv_to(file, indicator)
}

pub fn write_records_csv_to<W: Write>(writer: W, indicator: &Indicator) -> Result<(), IneError> {
    let mut csv = csv::Writer::from_writer(writer);
    let table = indicator.table();

    let mut header = vec![PERIOD_AXIS.to_string()];
    header.extend(table.column_names().iter().cloned());
    header.push(VALUE_FIELD.to_string());
    csv.write_record(&header)
        .map_err(|e| IneError::Io(format!("Failed to write export CSV header: {e}")))?;

    for record in indicator.to_records() {
        let mut row = Vec::with_capacity(record.levels.len() + 2);
        row.push(record.period);
        row.extend(record.levels.into_iter().map(|(_, label)| label));
        row.push(record.value.map(|v| v.to_string()).unwrap_or_default());
        csv.write_record(&row)
            .map_err(|e| IneError::Io(format!("Failed to write export CSV row: {e}")))?;
    }

    csv.flush()
        .map_err(|e| IneError::Io(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, CategoryEntry, DimensionDescriptor, DimensionFilters, Periodicity, RawIndicatorData};
    use crate::metadata::MergedMetadata;
    use crate::table::{build_table, resolve};
    use serde_json::json;

    fn indicator() -> Indicator {
        let descriptors = vec![
            DimensionDescriptor { number: 1, abbreviation: "Period".into() },
            DimensionDescriptor { number: 2, abbreviation: "Geo".into() },
        ];
        let categories = vec![CategoryEntry {
            key: "Dim_Num2_PT".into(),
            dimension: 2,
            code: "PT".into(),
            categories: vec![Category { code: "PT".into(), label: "Portugal".into() }],
        }];
        let axis = resolve(&descriptors, &categories, &DimensionFilters::new()).unwrap();
        let data = RawIndicatorData::from_payload(&json!([{"Dados": {
            "2020": [{"geocod": "PT", "valor": "1.5"}],
            "2021": [{"geocod": "PT"}]
        }}]))
        .unwrap();
        let table = build_table(&data, &axis, &Periodicity::Annual).unwrap();
        Indicator::new(table, MergedMetadata::default())
    }

    #[test]
    fn csv_has_header_and_empty_missing_cells() {
        let mut buf = Vec::new();
        write_records_csv_to(&mut buf, &indicator()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Period,Location,Value\n2020-01-01,Portugal,1.5\n2021-01-01,Portugal,\n");
    }

    #[test]
    fn json_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_indicator_json(&path, &indicator()).unwrap();
        let back: serde_json::Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(back["data"][0]["Value"], 1.5);
        assert!(back["data"][1]["Value"].is_null());
    }
}
