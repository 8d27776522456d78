//! Command implementations.

pub mod mask;
pub mod project;
pub mod run;

pub use self::mask::execute_mask;
pub use self::project::execute_project;
pub use self::run::execute_run;

use crate::error::Result;
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// Read a file, or stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Read and parse a JSON document. Blank input reads as `null`.
pub fn read_document(path: Option<&Path>) -> Result<Value> {
    let text = read_input(path)?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}
