//! Merging the data and metadata payloads' descriptive fields.
//!
//! Both payloads describe the indicator with overlapping, Portuguese-named
//! fields. The merged record uses stable English names, ISO dates for the
//! period bounds, and a derived geography level.

use serde_json::{Map, Value, json};

use crate::domain::{Periodicity, RawIndicatorData, RawMetadata};
use crate::error::IneError;
use crate::table::period;

pub const SOURCE: &str = "INE";

/// Source field → canonical field.
pub const CANONICAL_FIELDS: [(&str, &str); 12] = [
    ("IndicadorCod", "code"),
    ("IndicadorDsg", "description"),
    ("MetaInfUrl", "meta_info_url"),
    ("DataUltimoAtualizacao", "last_update_date"),
    ("Periodic", "periodicity"),
    ("PrimeiroPeriodo", "first_period"),
    ("UltimoPref", "last_period"),
    ("UltimoPeriodo", "last_period"),
    ("UnidadeMedida", "unit"),
    ("Potencia10", "power_of_10"),
    ("PrecisaoDecimal", "decimal_precision"),
    ("Lingua", "language"),
];

/// Source fields holding a period label, converted to ISO dates.
const PERIOD_FIELDS: [&str; 3] = ["PrimeiroPeriodo", "UltimoPref", "UltimoPeriodo"];

/// Sources of `last_period`, lowest precedence first.
const LAST_PERIOD_SOURCES: [&str; 2] = ["UltimoPref", "UltimoPeriodo"];

/// Geography standards recognized in the description, checked in order.
const GEO_MARKERS: [(&str, &str); 2] = [("(NUTS - 2002)", "nuts-2002"), ("(NUTS - 2013)", "nuts-2013")];

pub const GEO_LEVEL_NATIONAL: &str = "national";

pub fn canonical_name(source: &str) -> &str {
    CANONICAL_FIELDS
        .iter()
        .find(|(from, _)| *from == source)
        .map_or(source, |(_, to)| *to)
}

/// Canonical metadata record for one indicator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedMetadata {
    fields: Map<String, Value>,
}

impl MergedMetadata {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

/// Merge the two payloads' scalar fields.
///
/// Metadata-payload values overwrite data-payload values. `last_period` comes
/// from `UltimoPeriodo` whenever present, otherwise from `UltimoPref`.
pub fn merge_metadata(data: &RawIndicatorData, metadata: &RawMetadata) -> Result<MergedMetadata, IneError> {
    let mut source: Map<String, Value> = data.scalars.clone();
    for (k, v) in &metadata.scalars {
        source.insert(k.clone(), v.clone());
    }

    let mut fields = Map::new();
    fields.insert(
        "extraction_date".to_string(),
        json!({
            "data": data.extraction_date.clone().unwrap_or(Value::Null),
            "metadata": metadata.extraction_date.clone().unwrap_or(Value::Null),
        }),
    );
    fields.insert("source".to_string(), Value::String(SOURCE.to_string()));

    for (key, value) in &source {
        if LAST_PERIOD_SOURCES.contains(&key.as_str()) {
            continue;
        }
        let value = convert_value(&metadata.periodicity, key, value)?;
        fields.insert(canonical_name(key).to_string(), value);
    }
    for key in LAST_PERIOD_SOURCES {
        if let Some(value) = source.get(key) {
            let value = convert_value(&metadata.periodicity, key, value)?;
            fields.insert(canonical_name(key).to_string(), value);
        }
    }

    let description = fields.get("description").and_then(Value::as_str).unwrap_or_default();
    let geo_level = geo_level(description);
    fields.insert("geo_level".to_string(), Value::String(geo_level.to_string()));

    Ok(MergedMetadata { fields })
}

fn convert_value(periodicity: &Periodicity, key: &str, value: &Value) -> Result<Value, IneError> {
    if !PERIOD_FIELDS.contains(&key) {
        return Ok(value.clone());
    }
    let Some(label) = value.as_str() else {
        return Ok(value.clone());
    };
    let period = period::normalize(periodicity, label)?;
    Ok(Value::String(period.to_string()))
}

/// Geography classification tag derived from an indicator description.
pub fn geo_level(description: &str) -> &'static str {
    GEO_MARKERS
        .iter()
        .find(|(marker, _)| description.contains(marker))
        .map_or(GEO_LEVEL_NATIONAL, |(_, tag)| *tag)
}
