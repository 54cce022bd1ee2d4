//! Persisted widget configuration.
//!
//! The host stores one opaque blob per widget:
//! `{ dataConditions, customConfig: { nameFieldId, locationFieldId,
//! defaultCenter, exclusion } }`. Decoding is tolerant end to end: the blob
//! may come from an older widget version or a different client, so junk
//! fields are ignored and malformed sub-blobs normalize to absence. Nothing
//! in here returns an error for bad saved data.

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value as JsonValue;

use geopin_common::GeoPoint;
use geopin_core::{ExcludeOperator, ExclusionRule, FieldBinding};

/// Built-in map center used when the saved config carries none.
pub const DEFAULT_CENTER: GeoPoint = GeoPoint::new(44.0, 12.0);

/// One saved data condition. The host persists these alongside the custom
/// config and expects them back when preview data is requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataCondition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
}

/// Widget-owned section of the persisted blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomConfig {
    pub name_field_id: String,
    pub location_field_id: String,
    /// Saved map center; kept raw and parsed on demand so a malformed
    /// value degrades to "no center" instead of poisoning the whole blob.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_center: Option<JsonValue>,
    /// Saved exclusion rule, raw for the same reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusion: Option<JsonValue>,
}

impl CustomConfig {
    /// Saved center, if present and finite.
    pub fn center(&self) -> Option<GeoPoint> {
        self.default_center.as_ref().and_then(parse_center)
    }

    /// Saved exclusion rule, normalized; a malformed blob is no rule.
    pub fn exclusion_rule(&self) -> Option<ExclusionRule> {
        self.exclusion.as_ref().and_then(decode_exclusion)
    }

    /// Field binding for a normalization pass, once both fields are chosen.
    pub fn binding(&self) -> Option<FieldBinding> {
        (!self.name_field_id.is_empty() && !self.location_field_id.is_empty()).then(|| {
            FieldBinding::new(self.name_field_id.clone(), self.location_field_id.clone())
        })
    }
}

/// The whole persisted blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    /// Host-shaped data conditions, array or single object; kept raw.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_conditions: Option<JsonValue>,
    pub custom_config: CustomConfig,
}

impl WidgetConfig {
    /// Tolerant decode of a persisted blob. Field-by-field: one malformed
    /// member never discards the rest, and the worst case is an empty
    /// config.
    pub fn decode(blob: &JsonValue) -> Self {
        let custom = blob.get("customConfig");
        let str_member = |key: &str| -> String {
            custom
                .and_then(|m| m.get(key))
                .and_then(JsonValue::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let raw_member = |key: &str| -> Option<JsonValue> {
            custom
                .and_then(|m| m.get(key))
                .filter(|v| !v.is_null())
                .cloned()
        };
        Self {
            data_conditions: blob
                .get("dataConditions")
                .filter(|v| !v.is_null())
                .cloned(),
            custom_config: CustomConfig {
                name_field_id: str_member("nameFieldId"),
                location_field_id: str_member("locationFieldId"),
                default_center: raw_member("defaultCenter"),
                exclusion: raw_member("exclusion"),
            },
        }
    }

    /// Encode for persistence. Serialization of this shape cannot fail; the
    /// fallback still fails closed to `null` rather than panicking.
    pub fn encode(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

/// Serialize a map center into the plain `{lat, lng}` record the blob
/// stores.
pub fn serialize_center(center: GeoPoint) -> JsonValue {
    serde_json::json!({ "lat": center.lat, "lng": center.lng })
}

/// Parse a persisted center, accepting `{lat,lng}` or
/// `{latitude,longitude}` naming. Both components must be finite numbers,
/// else there is no center and the caller falls back to
/// [`DEFAULT_CENTER`].
pub fn parse_center(value: &JsonValue) -> Option<GeoPoint> {
    let get = |key: &str| {
        value
            .get(key)
            .and_then(JsonValue::as_f64)
            .filter(|v| v.is_finite())
    };
    let (lat, lng) = match (get("lat"), get("lng")) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => (get("latitude")?, get("longitude")?),
    };
    GeoPoint::checked(lat, lng)
}

/// Decode a persisted exclusion blob into a valid rule, or nothing. A
/// missing field id, unknown operator or missing operand all mean "no
/// rule"; a malformed rule is never propagated.
pub fn decode_exclusion(value: &JsonValue) -> Option<ExclusionRule> {
    let field_id = value.get("fieldId").and_then(JsonValue::as_str)?.to_string();
    let operator = ExcludeOperator::parse(value.get("operator").and_then(JsonValue::as_str)?)?;
    let operand = value
        .get("value")
        .and_then(JsonValue::as_str)
        .map(str::to_owned);
    ExclusionRule {
        field_id,
        operator,
        value: operand,
    }
    .normalized()
}

/// Serialize a rule for persistence, normalizing on the way out so an
/// invalid rule is stored as nothing at all.
pub fn encode_exclusion(rule: &ExclusionRule) -> Option<JsonValue> {
    rule.clone()
        .normalized()
        .and_then(|rule| serde_json::to_value(rule).ok())
}

/// First table id in a saved `dataConditions` value (array or single
/// object).
pub fn normalize_data_conditions(dc: &JsonValue) -> Option<DataCondition> {
    let first = match dc {
        JsonValue::Array(items) => items.first()?,
        JsonValue::Null => return None,
        other => other,
    };
    Some(DataCondition {
        table_id: first
            .get("tableId")
            .and_then(JsonValue::as_str)
            .map(str::to_owned),
    })
}

/// Data conditions to hand to a preview query: existing saved conditions
/// win, else a single condition for the selected table, else nothing.
pub fn derive_data_conditions(config: Option<&WidgetConfig>, table_id: &str) -> Option<JsonValue> {
    if let Some(dc) = config.and_then(|c| c.data_conditions.as_ref()) {
        if !dc.is_null() {
            return Some(dc.clone());
        }
    }
    (!table_id.is_empty()).then(|| serde_json::json!([{ "tableId": table_id }]))
}

/// JSON schema of the persisted blob, for host-side validation tooling.
pub fn config_schema() -> JsonValue {
    serde_json::to_value(schemars::schema_for!(WidgetConfig)).unwrap_or(JsonValue::Null)
}
