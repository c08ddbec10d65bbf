//! Shared "fetch pipeline" logic used by the CLI subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! arguments -> query (filters, payload files) -> client -> Indicator

use serde_json::Value;

use crate::cli::{FetchArgs, RequestArgs};
use crate::config::ClientConfig;
use crate::data::{IndicatorQuery, IneClient};
use crate::domain::DimensionFilters;
use crate::error::IneError;
use crate::indicator::Indicator;
use crate::io::payload::read_payload;

/// Parse repeated `DIM=CODE` arguments into filters (later duplicates win).
pub fn parse_filters(raw: &[String]) -> Result<DimensionFilters, IneError> {
    let mut filters = DimensionFilters::new();
    for arg in raw {
        let (key, code) = DimensionFilters::parse_pair(arg)?;
        filters.insert(&key, code)?;
    }
    Ok(filters)
}

/// Build the query for `ine fetch` without touching the network.
pub fn build_query(args: &FetchArgs) -> Result<IndicatorQuery, IneError> {
    let filters = parse_filters(&args.dims)?;
    let data = args.data_file.as_deref().map(read_payload).transpose()?;
    let metadata = args.metadata_file.as_deref().map(read_payload).transpose()?;
    let query = IndicatorQuery {
        code: args.code.clone(),
        filters,
        data,
        metadata,
    };
    query.validate()?;
    Ok(query)
}

/// Execute `ine fetch`: build the query, then fetch what is missing and reshape.
pub fn run_fetch(config: &ClientConfig, args: &FetchArgs) -> Result<Indicator, IneError> {
    let query = build_query(args)?;
    let client = IneClient::with_config(config.clone())?;
    client.get_indicator(&query)
}

/// Execute `ine request`: one classified raw payload.
pub fn run_request(config: &ClientConfig, args: &RequestArgs) -> Result<Value, IneError> {
    let filters = parse_filters(&args.dims)?;
    let client = IneClient::with_config(config.clone())?;
    client.fetch_json(&args.code, args.kind, &filters)
}
