//! INE API access: client, transport and response classification.

pub mod client;
pub mod response;

pub use client::{HttpTransport, IndicatorQuery, IneClient, Transport};
pub use response::{Classification, IneResponse, classify};
