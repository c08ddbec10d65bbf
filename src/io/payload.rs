//! Read INE payloads saved to disk (e.g. with `ine request ... > data.json`).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;

use crate::error::IneError;

pub fn read_payload(path: &Path) -> Result<Value, IneError> {
    let file = File::open(path)
        .map_err(|e| IneError::Io(format!("Failed to open payload '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| IneError::Decode(format!("Invalid payload JSON '{}': {e}", path.display())))
}
