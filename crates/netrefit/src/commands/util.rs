//! Small helpers shared by command handlers.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::CliError;

/// Read and deserialize a JSON document.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
