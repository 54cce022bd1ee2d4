//! Display-text extraction.
//!
//! Every cell can be rendered as a human label, whatever its shape. The
//! worst case, an object that will not serialize, renders as the empty
//! string; nothing in here fails.

use geopin_common::CellValue;
use serde_json::Value as JsonValue;

/// Separator between rich-text fragments.
const FRAGMENT_JOIN: &str = " / ";

/// Render any raw cell as a display string.
pub fn cell_text(raw: &CellValue) -> String {
    match raw {
        CellValue::Empty => String::new(),
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => n.to_string(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Seq(items) => items
            .iter()
            .map(fragment_text)
            .collect::<Vec<_>>()
            .join(FRAGMENT_JOIN),
        CellValue::Object(_) => match raw.text_member() {
            Some(text) => member_text(text),
            None => serialized_or_empty(raw),
        },
        CellValue::Location(_) => serialized_or_empty(raw),
    }
}

/// A fragment renders through its `text` member when it carries one, else
/// through its own extracted text.
fn fragment_text(item: &CellValue) -> String {
    match item.text_member() {
        Some(text) => member_text(text),
        None => cell_text(item),
    }
}

/// Stringify a `text` member of any type: strings verbatim, scalars via
/// display, anything structured as best-effort JSON.
fn member_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Structured fallback; fails closed to `""` rather than propagating a
/// serialization fault.
fn serialized_or_empty(raw: &CellValue) -> String {
    serde_json::to_string(&raw.to_json()).unwrap_or_default()
}
