//! INE JSON API client.
//!
//! Two endpoints are used:
//! - `pindica.jsp`: observations for an indicator (optionally filtered by dimension)
//! - `pindicaMeta.jsp`: dimension descriptors, categories and descriptive fields
//!
//! The HTTP call itself sits behind [`Transport`] so the reshaping pipeline can
//! be driven from canned payloads.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::data::response::{self, Classification, IneResponse};
use crate::domain::{DataKind, DimensionFilters};
use crate::error::IneError;
use crate::indicator::Indicator;

pub const USER_AGENT: &str = concat!("ine-indicators/", env!("CARGO_PKG_VERSION"));

const DATA_ENDPOINT: &str = "pindica.jsp";
const METADATA_ENDPOINT: &str = "pindicaMeta.jsp";

/// Issues a GET and hands back the completed response.
pub trait Transport {
    fn get(&self, url: &str, timeout: Duration) -> Result<IneResponse, IneError>;
}

/// Blocking `reqwest` transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, IneError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| IneError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, timeout: Duration) -> Result<IneResponse, IneError> {
        let resp = self.client.get(url).timeout(timeout).send()?;
        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let body = resp.text()?;
        Ok(IneResponse::new(status, final_url, body))
    }
}

/// What to build an [`Indicator`] from.
///
/// Either an indicator code (payloads are fetched), or both payloads
/// pre-fetched; a code plus one payload fetches only the missing one.
#[derive(Debug, Clone, Default)]
pub struct IndicatorQuery {
    pub code: Option<String>,
    pub filters: DimensionFilters,
    pub data: Option<Value>,
    pub metadata: Option<Value>,
}

impl IndicatorQuery {
    pub fn for_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn from_payloads(data: Value, metadata: Value) -> Self {
        Self {
            data: Some(data),
            metadata: Some(metadata),
            ..Self::default()
        }
    }

    pub fn with_filters(mut self, filters: DimensionFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn validate(&self) -> Result<(), IneError> {
        let has_code = self.code.as_deref().is_some_and(|c| !c.trim().is_empty());
        if !has_code && (self.data.is_none() || self.metadata.is_none()) {
            return Err(IneError::Validation(
                "Either an indicator code or both the data and metadata payloads must be set.".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct IneClient<T = HttpTransport> {
    transport: T,
    config: ClientConfig,
}

impl IneClient<HttpTransport> {
    pub fn from_env() -> Result<Self, IneError> {
        Self::with_config(ClientConfig::from_env()?)
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, IneError> {
        Ok(Self::new(HttpTransport::new()?, config))
    }
}

impl<T: Transport> IneClient<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// URL for a data or metadata request.
    ///
    /// Data requests always carry a dimension 1 filter (`Dim1=T` unless pinned).
    pub fn request_url(&self, code: &str, kind: DataKind, filters: &DimensionFilters) -> Result<Url, IneError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(IneError::Validation("Indicator code must not be empty.".to_string()));
        }
        let endpoint = match kind {
            DataKind::Data => DATA_ENDPOINT,
            DataKind::Metadata => METADATA_ENDPOINT,
        };
        let base = format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&base)
            .map_err(|e| IneError::Validation(format!("Invalid INE base URL '{}': {e}", self.config.base_url)))?;

        {
            let mut query = url.query_pairs_mut();
            if kind == DataKind::Data {
                query.append_pair("op", "2");
            }
            query.append_pair("varcd", code);
            query.append_pair("lang", &self.config.lang);
            if kind == DataKind::Data {
                for (key, value) in filters.request_pairs() {
                    query.append_pair(&key, &value);
                }
            }
        }
        Ok(url)
    }

    /// Send one request and return the unclassified response.
    pub fn request(&self, code: &str, kind: DataKind, filters: &DimensionFilters) -> Result<IneResponse, IneError> {
        let url = self.request_url(code, kind, filters)?;
        tracing::info!(%url, ?kind, "requesting INE indicator");
        self.transport.get(url.as_str(), self.config.timeout)
    }

    /// Send one request and return the body once both status and body checks pass.
    pub fn fetch_json(&self, code: &str, kind: DataKind, filters: &DimensionFilters) -> Result<Value, IneError> {
        self.request(code, kind, filters)?.error_for_status()
    }

    /// Fetch (as needed) both payloads and build the [`Indicator`].
    pub fn get_indicator(&self, query: &IndicatorQuery) -> Result<Indicator, IneError> {
        query.validate()?;
        let code = query.code.as_deref().unwrap_or_default();

        let data = match &query.data {
            Some(payload) => checked_payload(payload)?,
            None => self.fetch_json(code, DataKind::Data, &query.filters)?,
        };
        let metadata = match &query.metadata {
            Some(payload) => checked_payload(payload)?,
            None => self.fetch_json(code, DataKind::Metadata, &DimensionFilters::new())?,
        };

        Indicator::from_payloads(&data, &metadata, &query.filters)
    }
}

/// Pre-fetched payloads still go through the body check.
fn checked_payload(payload: &Value) -> Result<Value, IneError> {
    match response::classify(200, payload) {
        Classification::SemanticFailure(errors) => Err(IneError::semantic(errors)),
        _ => Ok(payload.clone()),
    }
}
