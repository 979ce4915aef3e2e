//! Rows as the hosted store returns them, and their conversion into matching inputs.
//!
//! The store keeps list-valued fields as JSON text. Columns are decoded once
//! here so the matching core only ever sees typed values.

pub mod job;
pub mod resume;

pub use job::JobRow;
pub use resume::ResumeRow;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::matching::MatchError;

/// Accepts a JSON text column, an already-decoded JSON value, or nothing.
/// Null and blank text decode to `T::default()`.
fn decode_json_column<T>(column: &str, value: Option<Value>) -> Result<T, MatchError>
where
    T: DeserializeOwned + Default,
{
    let decoded = match value {
        None | Some(Value::Null) => return Ok(T::default()),
        Some(Value::String(text)) if text.trim().is_empty() => return Ok(T::default()),
        Some(Value::String(text)) => serde_json::from_str(&text),
        Some(other) => serde_json::from_value(other),
    };
    decoded.map_err(|e| MatchError::invalid(format!("column '{column}' is not valid JSON: {e}")))
}
