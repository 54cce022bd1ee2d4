//! The raw cell union.
//!
//! Bitable hands cell contents back with no fixed schema: a plain string, a
//! number, an array of rich-text fragments, a location object, or a
//! `{text}`/`{value}` wrapper, and any of these can appear interchangeably
//! for the same field. `CellValue` pins that down to a closed union so every
//! downstream concern (coordinate parsing, text extraction, exclusion) can
//! dispatch exhaustively instead of probing at runtime.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::GeoPoint;

/// One raw cell as received from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Absent / null cell.
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Ordered fragment sequence (rich text, multi-select, lookups).
    Seq(Vec<CellValue>),
    /// Object that is unambiguously a coordinate: finite
    /// `latitude`/`longitude` (or `lat`/`lng`) and no text wrapper.
    Location(GeoPoint),
    /// Any other object, raw map retained for concern-level probing.
    Object(JsonMap<String, JsonValue>),
}

impl From<JsonValue> for CellValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => CellValue::Empty,
            JsonValue::Bool(b) => CellValue::Bool(b),
            JsonValue::Number(n) => n.as_f64().map_or(CellValue::Empty, CellValue::Number),
            JsonValue::String(s) => CellValue::Text(s),
            JsonValue::Array(items) => {
                CellValue::Seq(items.into_iter().map(CellValue::from).collect())
            }
            JsonValue::Object(map) => classify_object(map),
        }
    }
}

impl From<&JsonValue> for CellValue {
    fn from(value: &JsonValue) -> Self {
        value.clone().into()
    }
}

/// An object classifies as `Location` only when nothing else could claim it:
/// a `text` member of any type (extractor priority) or a string `value`
/// member (parser priority) keeps it generic.
fn classify_object(map: JsonMap<String, JsonValue>) -> CellValue {
    let wrapped = map.contains_key("text")
        || matches!(map.get("value"), Some(JsonValue::String(_)));
    if !wrapped {
        if let Some((lat, lng)) = geo_pair_of(&map) {
            if let Some(point) = GeoPoint::checked(lat, lng) {
                return CellValue::Location(point);
            }
        }
    }
    CellValue::Object(map)
}

fn geo_pair_of(map: &JsonMap<String, JsonValue>) -> Option<(f64, f64)> {
    let finite = |key: &str| {
        map.get(key)
            .and_then(JsonValue::as_f64)
            .filter(|v| v.is_finite())
    };
    if let (Some(lat), Some(lng)) = (finite("latitude"), finite("longitude")) {
        return Some((lat, lng));
    }
    if let (Some(lat), Some(lng)) = (finite("lat"), finite("lng")) {
        return Some((lat, lng));
    }
    None
}

impl CellValue {
    /// String payload of a `{text}`/`{value}` wrapper.
    ///
    /// Only string-typed members count: the coordinate parser recurses into
    /// these before it will look at numeric fields on the same object.
    pub fn wrapped_str(&self) -> Option<&str> {
        let CellValue::Object(map) = self else {
            return None;
        };
        match map.get("text") {
            Some(JsonValue::String(s)) => Some(s),
            _ => match map.get("value") {
                Some(JsonValue::String(s)) => Some(s),
                _ => None,
            },
        }
    }

    /// The `text` member of a generic object, whatever its type.
    pub fn text_member(&self) -> Option<&JsonValue> {
        let CellValue::Object(map) = self else {
            return None;
        };
        map.get("text")
    }

    /// Finite coordinate pair on a generic object, `latitude`/`longitude`
    /// preferred over `lat`/`lng`. Unambiguous coordinates classify as
    /// [`CellValue::Location`] up front; this covers objects that also carry
    /// a text wrapper.
    pub fn geo_pair(&self) -> Option<(f64, f64)> {
        let CellValue::Object(map) = self else {
            return None;
        };
        geo_pair_of(map)
    }

    /// Member lookup on a generic object, classified on the way out.
    pub fn member(&self, key: &str) -> Option<CellValue> {
        let CellValue::Object(map) = self else {
            return None;
        };
        map.get(key).map(CellValue::from)
    }

    /// Host-style truthiness, used for `a || b` member fallbacks: empty
    /// text, zero, NaN, false and absence are all falsy; any sequence or
    /// object is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Text(s) => !s.is_empty(),
            CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CellValue::Bool(b) => *b,
            CellValue::Seq(_) | CellValue::Location(_) | CellValue::Object(_) => true,
        }
    }

    /// Render back to the equivalent JSON shape. Total: a non-finite number
    /// (unreachable via JSON input) degrades to null.
    pub fn to_json(&self) -> JsonValue {
        match self {
            CellValue::Empty => JsonValue::Null,
            CellValue::Text(s) => JsonValue::String(s.clone()),
            CellValue::Number(n) => {
                // Integral values re-serialize as JSON integers so a cell
                // that arrived as `5` does not echo back as `5.0`.
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64 {
                    JsonValue::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number)
                }
            }
            CellValue::Bool(b) => JsonValue::Bool(*b),
            CellValue::Seq(items) => {
                JsonValue::Array(items.iter().map(CellValue::to_json).collect())
            }
            CellValue::Location(p) => {
                serde_json::json!({ "latitude": p.lat, "longitude": p.lng })
            }
            CellValue::Object(map) => JsonValue::Object(map.clone()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(JsonValue::deserialize(deserializer)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_classify() {
        assert_eq!(CellValue::from(json!(null)), CellValue::Empty);
        assert_eq!(CellValue::from(json!("x")), CellValue::Text("x".into()));
        assert_eq!(CellValue::from(json!(3.5)), CellValue::Number(3.5));
        assert_eq!(CellValue::from(json!(true)), CellValue::Bool(true));
    }

    #[test]
    fn bare_coordinate_object_is_location() {
        let v = CellValue::from(json!({"latitude": 31.2, "longitude": 121.5}));
        assert_eq!(v, CellValue::Location(GeoPoint::new(31.2, 121.5)));
        let v = CellValue::from(json!({"lat": 31.2, "lng": 121.5}));
        assert_eq!(v, CellValue::Location(GeoPoint::new(31.2, 121.5)));
    }

    #[test]
    fn text_wrapper_keeps_object_generic() {
        // A text member must stay visible to the parser and the extractor,
        // even when coordinate fields are present on the same object.
        let v = CellValue::from(json!({"text": "30,120", "lat": 1.0, "lng": 2.0}));
        assert!(matches!(v, CellValue::Object(_)));
        assert_eq!(v.wrapped_str(), Some("30,120"));
        assert_eq!(v.geo_pair(), Some((1.0, 2.0)));
    }

    #[test]
    fn non_string_text_member_is_not_a_wrapper_string() {
        let v = CellValue::from(json!({"text": 7, "value": "ok"}));
        assert_eq!(v.wrapped_str(), Some("ok"));
        assert_eq!(v.text_member(), Some(&json!(7)));
    }

    #[test]
    fn string_typed_coordinates_stay_generic() {
        let v = CellValue::from(json!({"latitude": "31.2", "longitude": "121.5"}));
        assert!(matches!(v, CellValue::Object(_)));
        assert_eq!(v.geo_pair(), None);
    }

    #[test]
    fn json_round_trip() {
        let raw = json!([{"text": "A"}, "B", 5, null]);
        let cell = CellValue::from(&raw);
        assert_eq!(cell.to_json(), raw);
    }
}
