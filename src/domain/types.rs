//! Shared domain types.
//!
//! This module defines:
//!
//! - request enums and parameters (`DataKind`, `DimensionFilters`)
//! - the periodicity tag INE attaches to every indicator (`Periodicity`)
//! - typed views over the two INE payloads (`RawIndicatorData`, `RawMetadata`)

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::IneError;

/// Which INE endpoint to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Data,
    Metadata,
}

impl FromStr for DataKind {
    type Err = IneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data" => Ok(Self::Data),
            "metadata" => Ok(Self::Metadata),
            other => Err(IneError::Validation(format!(
                "Invalid data type: '{other}'. Expected 'data' or 'metadata'."
            ))),
        }
    }
}

/// Calendar granularity of an indicator's observations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Periodicity {
    Annual,
    Decennial,
    Quarterly,
    Monthly,
    /// Any tag INE sends that we do not convert (kept verbatim).
    Other(String),
}

impl Periodicity {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Annual" => Self::Annual,
            "Decennial" => Self::Decennial,
            "Quarterly" => Self::Quarterly,
            "Monthly" => Self::Monthly,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Annual => "Annual",
            Self::Decennial => "Decennial",
            Self::Quarterly => "Quarterly",
            Self::Monthly => "Monthly",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Category code INE uses for "all periods" on dimension 1.
pub const PERIOD_DIMENSION_ALL: &str = "T";

/// Per-dimension filters (`Dim{n}` → category code), in caller order.
///
/// Keys may be given as `"Dim3"` or `"3"`; both are stored as `"Dim3"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionFilters {
    entries: Vec<(String, String)>,
}

impl DimensionFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter for one dimension, replacing an existing value in place.
    pub fn insert(&mut self, dimension: &str, code: impl Into<String>) -> Result<(), IneError> {
        let key = normalize_dimension_key(dimension)?;
        let code = code.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = code,
            None => self.entries.push((key, code)),
        }
        Ok(())
    }

    pub fn with(mut self, dimension: &str, code: impl Into<String>) -> Result<Self, IneError> {
        self.insert(dimension, code)?;
        Ok(self)
    }

    /// Parse a `Dim3=1` / `3=1` style argument.
    pub fn parse_pair(raw: &str) -> Result<(String, String), IneError> {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| IneError::Validation(format!("Dimension filter '{raw}' must look like Dim3=1.")))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(IneError::Validation(format!("Dimension filter '{raw}' has an empty code.")));
        }
        Ok((normalize_dimension_key(key)?, value.to_string()))
    }

    pub fn get(&self, dimension: u32) -> Option<&str> {
        let key = format!("Dim{dimension}");
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Query pairs for a data request: caller filters in order, then `Dim1=T`
    /// when dimension 1 was not pinned.
    pub fn request_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.entries.clone();
        if self.get(1).is_none() {
            pairs.push(("Dim1".to_string(), PERIOD_DIMENSION_ALL.to_string()));
        }
        pairs
    }
}

fn normalize_dimension_key(raw: &str) -> Result<String, IneError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("Dim")
        .or_else(|| trimmed.strip_prefix("dim"))
        .unwrap_or(trimmed);
    match digits.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(format!("Dim{n}")),
        _ => Err(IneError::Validation(format!(
            "Unknown dimension '{raw}'. Expected Dim<n> or <n> with n >= 1."
        ))),
    }
}

/// One dimension as described by the metadata payload (`Descricao_Dim`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionDescriptor {
    pub number: u32,
    pub abbreviation: String,
}

/// One category of a dimension (`Categoria_Dim`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Category {
    pub code: String,
    pub label: String,
}

/// Category list keyed by its encoded `Dim_Num{n}_{code}` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub key: String,
    pub dimension: u32,
    pub code: String,
    pub categories: Vec<Category>,
}

impl CategoryEntry {
    /// Decode `Dim_Num3_T` into `(3, "T")`.
    pub fn parse_key(key: &str) -> Option<(u32, &str)> {
        let rest = key.strip_prefix("Dim_Num")?;
        let (num, code) = rest.split_once('_')?;
        Some((num.parse().ok()?, code))
    }
}

/// The value of one non-geography dimension on a stat record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionValue {
    /// `dim_N`
    pub code: Option<String>,
    /// `dim_N_t`
    pub label: Option<String>,
}

/// One observation under a period in `Dados`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRecord {
    pub geocode: String,
    pub geo_label: Option<String>,
    /// Indexed by dimension number (3, 4, ...).
    pub dimensions: Vec<(u32, DimensionValue)>,
    /// `None` means "not reported", never zero.
    pub value: Option<f64>,
}

/// Wire shape of a record under `Dados`; `dim_N` / `dim_N_t` land in `rest`.
#[derive(Debug, Deserialize)]
struct StatRecordWire {
    geocod: Option<Value>,
    #[serde(default)]
    geodsg: Option<Value>,
    #[serde(default)]
    valor: Option<Value>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl StatRecord {
    pub fn from_json(raw: &Value) -> Result<Self, IneError> {
        Self::from_wire(StatRecordWire::deserialize(raw)?)
    }

    fn from_wire(wire: StatRecordWire) -> Result<Self, IneError> {
        let geocode = wire
            .geocod
            .as_ref()
            .and_then(scalar_string)
            .ok_or_else(|| IneError::Decode("stat record without 'geocod'".to_string()))?;

        let mut dimensions: Vec<(u32, DimensionValue)> = Vec::new();
        for (key, value) in &wire.rest {
            let Some(rest) = key.strip_prefix("dim_") else {
                continue;
            };
            let (num, is_label) = match rest.strip_suffix("_t") {
                Some(num) => (num, true),
                None => (rest, false),
            };
            let Ok(number) = num.parse::<u32>() else {
                continue;
            };
            let idx = match dimensions.iter().position(|(n, _)| *n == number) {
                Some(idx) => idx,
                None => {
                    dimensions.push((number, DimensionValue::default()));
                    dimensions.len() - 1
                }
            };
            let text = scalar_string(value);
            if is_label {
                dimensions[idx].1.label = text;
            } else {
                dimensions[idx].1.code = text;
            }
        }
        dimensions.sort_by_key(|(n, _)| *n);

        Ok(Self {
            geocode,
            geo_label: wire.geodsg.as_ref().and_then(scalar_string),
            dimensions,
            value: wire.valor.as_ref().and_then(parse_value),
        })
    }

    pub fn dimension(&self, number: u32) -> Option<&DimensionValue> {
        self.dimensions
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, v)| v)
    }
}

/// Keys of a payload element that are not scalar descriptive fields.
pub const NON_SCALAR_KEYS: [&str; 4] = ["Dados", "DataExtracao", "Dimensoes", "Sucesso"];

/// The data payload (`pindica.jsp`).
#[derive(Debug, Clone, PartialEq)]
pub struct RawIndicatorData {
    /// Raw period label → records, in payload order.
    pub periods: Vec<(String, Vec<StatRecord>)>,
    pub extraction_date: Option<Value>,
    pub scalars: Map<String, Value>,
}

impl RawIndicatorData {
    pub fn from_payload(payload: &Value) -> Result<Self, IneError> {
        let element = first_element(payload, "data")?;
        let dados = element
            .get("Dados")
            .and_then(Value::as_object)
            .ok_or_else(|| IneError::Decode("data payload has no 'Dados' object".to_string()))?;

        let mut periods = Vec::with_capacity(dados.len());
        for (label, records) in dados {
            let wires = Vec::<StatRecordWire>::deserialize(records)
                .map_err(|e| IneError::Decode(format!("records under period '{label}': {e}")))?;
            let parsed = wires
                .into_iter()
                .map(StatRecord::from_wire)
                .collect::<Result<Vec<_>, _>>()?;
            periods.push((label.clone(), parsed));
        }

        Ok(Self {
            periods,
            extraction_date: element.get("DataExtracao").cloned(),
            scalars: scalars_of(element),
        })
    }
}

/// The metadata payload (`pindicaMeta.jsp`).
#[derive(Debug, Clone, PartialEq)]
pub struct RawMetadata {
    pub dimensions: Vec<DimensionDescriptor>,
    pub categories: Vec<CategoryEntry>,
    pub periodicity: Periodicity,
    pub extraction_date: Option<Value>,
    pub scalars: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct DescriptorWire {
    dim_num: Value,
    #[serde(default)]
    abrv: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CategoryWire {
    #[serde(default)]
    categ_cod: Option<Value>,
    categ_dsg: Value,
}

impl RawMetadata {
    pub fn from_payload(payload: &Value) -> Result<Self, IneError> {
        let element = first_element(payload, "metadata")?;
        let dims = element
            .get("Dimensoes")
            .and_then(Value::as_object)
            .ok_or_else(|| IneError::Decode("metadata payload has no 'Dimensoes' object".to_string()))?;

        let descriptors = dims
            .get("Descricao_Dim")
            .ok_or_else(|| IneError::Decode("metadata payload has no 'Descricao_Dim' list".to_string()))?;
        let descriptors = Vec::<DescriptorWire>::deserialize(descriptors)
            .map_err(|e| IneError::Decode(format!("dimension descriptors: {e}")))?;
        let dimensions = descriptors
            .into_iter()
            .map(|d| {
                let number = scalar_string(&d.dim_num)
                    .and_then(|s| s.parse::<u32>().ok())
                    .ok_or_else(|| IneError::Decode(format!("dimension descriptor without a numeric 'dim_num': {}", d.dim_num)))?;
                let abbreviation = d.abrv.as_ref().and_then(scalar_string).unwrap_or_default();
                Ok(DimensionDescriptor { number, abbreviation })
            })
            .collect::<Result<Vec<_>, IneError>>()?;

        // INE wraps the whole category mapping in a one-element array.
        let category_map = match dims.get("Categoria_Dim") {
            Some(Value::Array(items)) => items.first().and_then(Value::as_object),
            Some(Value::Object(map)) => Some(map),
            _ => None,
        }
        .ok_or_else(|| IneError::Decode("metadata payload has no 'Categoria_Dim' mapping".to_string()))?;

        let mut categories = Vec::with_capacity(category_map.len());
        for (key, list) in category_map {
            let Some((dimension, code)) = CategoryEntry::parse_key(key) else {
                tracing::debug!(key = %key, "skipping category key that does not encode a dimension");
                continue;
            };
            let wires: Vec<CategoryWire> = serde_json::from_value(list.clone())
                .map_err(|e| IneError::Decode(format!("category list '{key}': {e}")))?;
            let categories_for_key = wires
                .into_iter()
                .map(|w| Category {
                    code: w.categ_cod.as_ref().and_then(scalar_string).unwrap_or_else(|| code.to_string()),
                    label: scalar_string(&w.categ_dsg).unwrap_or_default(),
                })
                .collect();
            categories.push(CategoryEntry {
                key: key.clone(),
                dimension,
                code: code.to_string(),
                categories: categories_for_key,
            });
        }

        let periodicity = element
            .get("Periodic")
            .and_then(Value::as_str)
            .map(Periodicity::from_tag)
            .ok_or_else(|| IneError::Decode("metadata payload has no 'Periodic' tag".to_string()))?;

        Ok(Self {
            dimensions,
            categories,
            periodicity,
            extraction_date: element.get("DataExtracao").cloned(),
            scalars: scalars_of(element),
        })
    }
}

fn first_element<'a>(payload: &'a Value, what: &str) -> Result<&'a Map<String, Value>, IneError> {
    payload
        .as_array()
        .and_then(|items| items.first())
        .and_then(Value::as_object)
        .ok_or_else(|| IneError::Decode(format!("{what} payload is not a non-empty array of objects")))
}

fn scalars_of(element: &Map<String, Value>) -> Map<String, Value> {
    element
        .iter()
        .filter(|(k, _)| !NON_SCALAR_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Render a JSON scalar as a string (`"1"` and `1` both give `"1"`).
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a reported value. INE sends numbers as strings; anything non-numeric
/// is treated as not reported.
pub fn parse_value(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if v.is_finite() { Some(v) } else { None }
}
