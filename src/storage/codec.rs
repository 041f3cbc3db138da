/// Ordered string lists stored as JSON array text
///
/// Tags, actions, hashtags and keywords live in flat TEXT columns. An empty
/// list encodes to `[]`. Decoding accepts any JSON array; elements that are
/// not strings keep their JSON text (`[1, true]` reads as `["1", "true"]`).
/// Anything that is not an array is an error rather than an empty list.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array, found {0}")]
    NotAnArray(&'static str),
}

pub fn encode(items: &[String]) -> String {
    Value::Array(items.iter().cloned().map(Value::String).collect()).to_string()
}

pub fn decode(text: &str) -> Result<Vec<String>, CodecError> {
    let items = match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => items,
        Value::Object(_) => return Err(CodecError::NotAnArray("object")),
        Value::String(_) => return Err(CodecError::NotAnArray("string")),
        Value::Number(_) => return Err(CodecError::NotAnArray("number")),
        Value::Bool(_) => return Err(CodecError::NotAnArray("boolean")),
        Value::Null => return Err(CodecError::NotAnArray("null")),
    };

    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}
