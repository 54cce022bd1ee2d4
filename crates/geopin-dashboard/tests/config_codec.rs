use geopin_common::GeoPoint;
use geopin_core::{ExcludeOperator, ExclusionRule};
use geopin_dashboard::{
    DEFAULT_CENTER, WidgetConfig, config_schema, derive_data_conditions,
    normalize_data_conditions, parse_center, serialize_center,
};
use serde_json::json;

#[test]
fn decode_reads_a_full_blob() {
    let config = WidgetConfig::decode(&json!({
        "dataConditions": [{"tableId": "tblStores"}],
        "customConfig": {
            "nameFieldId": "fldName",
            "locationFieldId": "fldLocation",
            "defaultCenter": {"lat": 31.2, "lng": 121.5},
            "exclusion": {"fieldId": "fldStatus", "operator": "equals", "value": "closed"},
        },
    }));

    assert_eq!(config.custom_config.name_field_id, "fldName");
    assert_eq!(config.custom_config.location_field_id, "fldLocation");
    assert_eq!(
        config.custom_config.center(),
        Some(GeoPoint::new(31.2, 121.5))
    );
    assert_eq!(
        config.custom_config.exclusion_rule(),
        Some(ExclusionRule {
            field_id: "fldStatus".into(),
            operator: ExcludeOperator::Equals,
            value: Some("closed".into()),
        })
    );
    let dc = normalize_data_conditions(config.data_conditions.as_ref().unwrap()).unwrap();
    assert_eq!(dc.table_id.as_deref(), Some("tblStores"));
}

#[test]
fn decode_tolerates_junk_without_failing() {
    let config = WidgetConfig::decode(&json!({
        "customConfig": {
            "nameFieldId": 42,
            "defaultCenter": "31.2,121.5",
            "exclusion": {"fieldId": "fldStatus", "operator": "contains", "value": "  "},
        },
        "unexpected": {"deeply": ["nested", "junk"]},
    }));

    // A malformed member degrades to absence; the rest of the blob stays.
    assert_eq!(config.custom_config.name_field_id, "");
    assert_eq!(config.custom_config.center(), None);
    assert_eq!(config.custom_config.exclusion_rule(), None);

    let empty = WidgetConfig::decode(&json!("not even an object"));
    assert_eq!(empty, WidgetConfig::default());
}

#[test]
fn encode_decode_round_trip() {
    let mut config = WidgetConfig::default();
    config.custom_config.name_field_id = "fldName".into();
    config.custom_config.location_field_id = "fldLocation".into();
    config.custom_config.default_center = Some(serialize_center(GeoPoint::new(30.0, 120.0)));

    let decoded = WidgetConfig::decode(&config.encode());
    assert_eq!(decoded, config);
}

#[test]
fn center_falls_back_to_the_builtin_default() {
    let config = WidgetConfig::decode(&json!({"customConfig": {}}));
    let center = config.custom_config.center().unwrap_or(DEFAULT_CENTER);
    assert_eq!(center, GeoPoint::new(44.0, 12.0));
}

#[test]
fn center_codec_round_trips_through_json() {
    let center = GeoPoint::new(31.2, 121.5);
    assert_eq!(parse_center(&serialize_center(center)), Some(center));
}

#[test]
fn data_conditions_derivation_prefers_saved_conditions() {
    let saved = WidgetConfig::decode(&json!({
        "dataConditions": [{"tableId": "tblSaved"}],
        "customConfig": {},
    }));
    assert_eq!(
        derive_data_conditions(Some(&saved), "tblSelected"),
        Some(json!([{"tableId": "tblSaved"}]))
    );
    assert_eq!(
        derive_data_conditions(None, "tblSelected"),
        Some(json!([{"tableId": "tblSelected"}]))
    );
    assert_eq!(derive_data_conditions(None, ""), None);
}

#[test]
fn data_conditions_accept_object_or_array() {
    let from_object = normalize_data_conditions(&json!({"tableId": "tblA"})).unwrap();
    assert_eq!(from_object.table_id.as_deref(), Some("tblA"));

    let no_table = normalize_data_conditions(&json!([{"viewId": "viwB"}])).unwrap();
    assert_eq!(no_table.table_id, None);

    assert!(normalize_data_conditions(&json!(null)).is_none());
    assert!(normalize_data_conditions(&json!([])).is_none());
}

#[test]
fn schema_is_well_formed() {
    let schema = config_schema();
    assert!(schema.is_object(), "schema root should be an object");
    let text = serde_json::to_string(&schema).unwrap();
    assert!(text.contains("customConfig"));
}
