//! Streamed response chunks and payload text extraction.

use derive_getters::Getters;
use serde::Serialize;
use serde_json::Value;

/// One incremental unit of a streamed response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Getters)]
pub struct Chunk {
    /// Position within its stream, starting at 0
    index: usize,
    /// Generated text carried by this chunk
    text: String,
    /// Payload as received
    raw: String,
}

impl Chunk {
    /// Build a chunk from a received payload, extracting its text.
    pub fn from_payload(index: usize, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            index,
            text: extract_text(&raw),
            raw,
        }
    }

    /// Build a chunk whose text is already known.
    pub fn from_text(index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            index,
            raw: text.clone(),
            text,
        }
    }
}

/// Pull generated text out of a server payload.
///
/// Recognises `{"text": ...}`, `{"outputs": [{"text": ...}]}` and bare JSON
/// strings. Anything else is returned verbatim.
pub fn extract_text(payload: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(payload) else {
        return payload.to_string();
    };

    match &value {
        Value::String(text) => text.clone(),
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                return text.clone();
            }
            map.get("outputs")
                .and_then(Value::as_array)
                .and_then(|outputs| outputs.first())
                .and_then(|first| first.get("text"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| payload.to_string())
        }
        _ => payload.to_string(),
    }
}
