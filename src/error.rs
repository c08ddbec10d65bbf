//! Error types.
//!
//! Library code returns [`IneError`]; the `ine` binary converts it into an
//! [`AppError`] carrying the process exit code.
//!
//! Exit codes:
//! - `2`: invalid input (arguments, files, configuration)
//! - `4`: data source failure (network, HTTP status, INE rejection, bad payload)

use serde_json::Value;

/// One error record reported by INE inside an otherwise successful response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiErrorRecord {
    /// Human-readable message (`Msg`), when INE sent one.
    pub message: Option<String>,
    /// The record as received.
    pub raw: Value,
}

impl ApiErrorRecord {
    pub fn from_json(raw: &Value) -> Self {
        let message = raw.get("Msg").and_then(Value::as_str).map(str::to_string);
        Self {
            message,
            raw: raw.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IneError {
    /// Network, DNS or timeout failure before a status code was received.
    #[error("INE request failed: {0}")]
    Transport(String),

    #[error("INE request to {url} failed with status {status}.")]
    HttpStatus { status: u16, url: String },

    /// HTTP success, but INE rejected the request in the response body.
    #[error("{}", semantic_message(.message, .errors))]
    SemanticApi {
        message: String,
        errors: Vec<ApiErrorRecord>,
    },

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("failed to decode INE payload: {0}")]
    Decode(String),

    #[error("'Indicator' has no field '{0}' and '{0}' is not a metadata field")]
    UnknownField(String),

    #[error("{0}")]
    Io(String),
}

pub const SEMANTIC_DEFAULT_MESSAGE: &str = "INE returned an error.";

fn semantic_message(message: &str, errors: &[ApiErrorRecord]) -> String {
    match errors.first().and_then(|e| e.message.as_deref()) {
        Some(msg) => format!("{message} Error: {msg}"),
        None => message.to_string(),
    }
}

impl IneError {
    pub fn semantic(errors: Vec<ApiErrorRecord>) -> Self {
        Self::SemanticApi {
            message: SEMANTIC_DEFAULT_MESSAGE.to_string(),
            errors,
        }
    }

    /// Errors INE reported in the body; empty for every other variant.
    pub fn ine_errors(&self) -> &[ApiErrorRecord] {
        match self {
            Self::SemanticApi { errors, .. } => errors,
            _ => &[],
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::UnknownField(_) | Self::Io(_) => 2,
            Self::Transport(_) | Self::HttpStatus { .. } | Self::SemanticApi { .. } | Self::Decode(_) => 4,
        }
    }
}

impl From<reqwest::Error> for IneError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for IneError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<IneError> for AppError {
    fn from(err: IneError) -> Self {
        Self::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
