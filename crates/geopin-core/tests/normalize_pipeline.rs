use geopin_common::CellValue;
use geopin_core::{
    ExcludeOperator, ExclusionRule, FieldBinding, RecordBatch, TableRecord, normalize,
};
use serde_json::json;

fn binding() -> FieldBinding {
    FieldBinding::new("fldName", "fldLocation")
}

fn records(rows: serde_json::Value) -> RecordBatch {
    let records: Vec<TableRecord> =
        serde_json::from_value(rows).expect("record fixture should deserialize");
    RecordBatch::Table(records)
}

fn store_fixture() -> RecordBatch {
    records(json!([
        {"recordId": "rec1", "fields": {"fldName": "静安寺店", "fldLocation": "31.223,121.445", "fldStatus": "open"}},
        {"recordId": "rec2", "fields": {"fldName": "陆家嘴店", "fldLocation": {"latitude": 31.240, "longitude": 121.513}, "fldStatus": "open"}},
        {"recordId": "rec3", "fields": {"fldName": "坏数据店", "fldLocation": "not a location", "fldStatus": "open"}},
        {"recordId": "rec4", "fields": {"fldName": "西湖店", "fldLocation": "30.249,120.155", "fldStatus": "open"}},
        {"recordId": "rec5", "fields": {"fldName": "已关闭店", "fldLocation": "22.533,113.930", "fldStatus": "closed"}},
    ]))
}

fn closed_rule() -> ExclusionRule {
    ExclusionRule {
        field_id: "fldStatus".into(),
        operator: ExcludeOperator::Contains,
        value: Some("closed".into()),
    }
}

#[test]
fn five_rows_one_invalid_one_excluded() {
    let rule = closed_rule();
    let result = normalize(&store_fixture(), &binding(), Some(&rule));

    assert_eq!(result.total, 5);
    assert_eq!(result.invalid, 1);
    assert_eq!(result.excluded, Some(1));
    assert_eq!(result.points.len(), 3);
    assert_eq!(
        result.points.len() + result.invalid + result.excluded.unwrap(),
        result.total
    );

    let ids: Vec<&str> = result.points.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["rec1", "rec2", "rec4"], "input order preserved");
    assert_eq!(
        result.invalid_sample,
        Some(CellValue::Text("not a location".into()))
    );
}

#[test]
fn invalid_rows_are_never_also_excluded() {
    // rec3's status matches the rule, but its location already failed to
    // parse; it must count once, as invalid.
    let rule = ExclusionRule {
        field_id: "fldName".into(),
        operator: ExcludeOperator::Contains,
        value: Some("坏数据".into()),
    };
    let result = normalize(&store_fixture(), &binding(), Some(&rule));
    assert_eq!(result.invalid, 1);
    assert_eq!(result.excluded, Some(0));
    assert_eq!(result.points.len(), 4);
}

#[test]
fn no_rule_means_no_excluded_count() {
    let result = normalize(&store_fixture(), &binding(), None);
    assert_eq!(result.excluded, None);
    assert_eq!(result.points.len(), 4);
    assert_eq!(result.invalid, 1);
}

#[test]
fn first_invalid_sample_is_kept() {
    let batch = records(json!([
        {"fields": {"fldLocation": "first bad"}},
        {"fields": {"fldLocation": "second bad"}},
    ]));
    let result = normalize(&batch, &binding(), None);
    assert_eq!(result.invalid, 2);
    assert_eq!(result.invalid_sample, Some(CellValue::Text("first bad".into())));
}

#[test]
fn missing_cells_count_as_invalid_and_unnamed() {
    let batch = records(json!([
        {"recordId": "recA", "fields": {"fldLocation": "31.0,121.0"}},
        {"recordId": "recB", "fields": {"fldName": "named, unplaced"}},
    ]));
    let result = normalize(&batch, &binding(), None);
    assert_eq!(result.points.len(), 1);
    assert_eq!(result.points[0].name, "unnamed");
    assert_eq!(result.invalid, 1);
    assert_eq!(result.invalid_sample, Some(CellValue::Empty));
}

#[test]
fn records_without_ids_fall_back_to_row_index() {
    let batch = records(json!([
        {"fields": {"fldName": "a", "fldLocation": "31.0,121.0"}},
        {"fields": {"fldName": "b", "fldLocation": "32.0,120.0"}},
    ]));
    let result = normalize(&batch, &binding(), None);
    assert_eq!(result.points[0].id, "0");
    assert_eq!(result.points[1].id, "1");
}

#[test]
fn exclusion_rule_is_not_applicable_to_positional_rows() {
    let batch = RecordBatch::from_dashboard_data(&json!([
        [{"text": "name"}, {"text": "location"}],
        [{"text": "closed store"}, {"text": "31.0,121.0"}],
    ]));
    let rule = ExclusionRule {
        field_id: "fldStatus".into(),
        operator: ExcludeOperator::Contains,
        value: Some("closed".into()),
    };
    let result = normalize(&batch, &binding(), Some(&rule));
    // The field id cannot resolve on a positional row: no exclusion, no
    // error.
    assert_eq!(result.excluded, Some(0));
    assert_eq!(result.points.len(), 1);
}

#[test]
fn keyed_lookup_treats_absent_fields_as_empty() {
    let batch = records(json!([
        {"recordId": "rec1", "fields": {"fldName": "a", "fldLocation": "31.0,121.0"}},
        {"recordId": "rec2", "fields": {"fldName": "b", "fldLocation": "32.0,120.0", "fldNote": "x"}},
    ]));
    let rule = ExclusionRule {
        field_id: "fldNote".into(),
        operator: ExcludeOperator::IsEmpty,
        value: None,
    };
    let result = normalize(&batch, &binding(), Some(&rule));
    assert_eq!(result.excluded, Some(1));
    assert_eq!(result.points.len(), 1);
    assert_eq!(result.points[0].id, "rec2");
}

#[test]
fn identical_inputs_produce_identical_results() {
    let rule = closed_rule();
    let first = normalize(&store_fixture(), &binding(), Some(&rule));
    let second = normalize(&store_fixture(), &binding(), Some(&rule));
    assert_eq!(first, second);
}
