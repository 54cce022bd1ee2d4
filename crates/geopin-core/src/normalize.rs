//! Batch normalization: raw host rows in, [`MapResult`] out.
//!
//! The host hands rows back in one of three shapes (live table records, a
//! 2-D dashboard aggregate, or a loose array of objects) and the same
//! pipeline runs over each row regardless: parse the location, apply the
//! exclusion rule, build a point. Rows that fail to parse are counted, not
//! fatal; the first failing raw value is kept as a sample for the status
//! line.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use geopin_common::CellValue;

use crate::exclude::ExclusionRule;
use crate::parse::parse_location;
use crate::text::cell_text;

/// Placeholder label for rows whose name cell renders empty.
pub const UNNAMED_LABEL: &str = "unnamed";

/// One live table record as returned by the table accessor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRecord {
    #[serde(default)]
    pub record_id: Option<String>,
    #[serde(default)]
    pub fields: FxHashMap<String, CellValue>,
}

/// The row shapes the host can hand back.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBatch {
    /// Live table records keyed by field id.
    Table(Vec<TableRecord>),
    /// Dashboard 2-D aggregate: a header row followed by data rows whose
    /// two leading columns are name and location. Cells may arrive
    /// `{text|value}`-wrapped.
    Aggregate(Vec<Vec<CellValue>>),
    /// Loosely shaped objects: `name`/`title` and `location`/`loc` members.
    Loose(Vec<CellValue>),
}

impl RecordBatch {
    /// Detect the dashboard payload shape: an array whose first row is an
    /// array is an aggregate, any other array is a loose batch, and
    /// anything else is an empty batch.
    pub fn from_dashboard_data(data: &JsonValue) -> Self {
        match data {
            JsonValue::Array(rows) if matches!(rows.first(), Some(JsonValue::Array(_))) => {
                RecordBatch::Aggregate(
                    rows.iter()
                        .map(|row| match row {
                            JsonValue::Array(cells) => {
                                cells.iter().map(CellValue::from).collect()
                            }
                            other => vec![CellValue::from(other)],
                        })
                        .collect(),
                )
            }
            JsonValue::Array(rows) => {
                RecordBatch::Loose(rows.iter().map(CellValue::from).collect())
            }
            _ => RecordBatch::Loose(Vec::new()),
        }
    }

    /// Number of data rows this batch will offer to [`normalize`]. The
    /// aggregate header row does not count.
    pub fn len(&self) -> usize {
        match self {
            RecordBatch::Table(records) => records.len(),
            RecordBatch::Aggregate(rows) => rows.len().saturating_sub(1),
            RecordBatch::Loose(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Field selection driving a normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBinding {
    pub name_field_id: String,
    pub location_field_id: String,
}

impl FieldBinding {
    pub fn new(name_field_id: impl Into<String>, location_field_id: impl Into<String>) -> Self {
        Self {
            name_field_id: name_field_id.into(),
            location_field_id: location_field_id.into(),
        }
    }
}

/// One renderable pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Outcome of one normalization pass: the points plus the diagnostics the
/// status line renders. Rebuilt wholesale on every pass, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapResult {
    pub points: Vec<MapPoint>,
    /// First raw location value that failed to parse, kept for the "check
    /// your field format" hint. Later failures never overwrite it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_sample: Option<CellValue>,
    /// Rows examined (aggregate header excluded).
    pub total: usize,
    /// Rows whose location cell failed to parse.
    pub invalid: usize,
    /// Rows dropped by the exclusion rule; present only while a rule is
    /// active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded: Option<usize>,
}

/// A row reduced to the cells the pipeline needs, whatever shape it came
/// from. `rule_target` is `None` when the rule cannot apply to the row's
/// shape (positional rows have no field ids to resolve).
struct RowView {
    id: Option<String>,
    name: Option<CellValue>,
    location: Option<CellValue>,
    rule_target: Option<CellValue>,
}

/// Normalize one batch of rows into points plus diagnostics.
///
/// Per row, in order: parse the location cell (failure counts as `invalid`
/// and skips the row), evaluate the exclusion rule (a match counts as
/// `excluded` and skips the row, never double-counted with `invalid`),
/// else emit a point. Input order is preserved; ids fall back to the row
/// index when the record has no native id. The pass is pure: identical
/// inputs produce an identical result.
pub fn normalize(
    batch: &RecordBatch,
    binding: &FieldBinding,
    rule: Option<&ExclusionRule>,
) -> MapResult {
    let rows: Vec<RowView> = match batch {
        RecordBatch::Table(records) => records
            .iter()
            .map(|record| RowView {
                id: record.record_id.clone(),
                name: record.fields.get(&binding.name_field_id).cloned(),
                location: record.fields.get(&binding.location_field_id).cloned(),
                rule_target: rule.map(|r| {
                    record
                        .fields
                        .get(&r.field_id)
                        .cloned()
                        .unwrap_or(CellValue::Empty)
                }),
            })
            .collect(),
        RecordBatch::Aggregate(rows) => rows
            .iter()
            .skip(1)
            .map(|cells| RowView {
                id: None,
                name: cells.first().map(unwrap_data_item),
                location: cells.get(1).map(unwrap_data_item),
                rule_target: None,
            })
            .collect(),
        RecordBatch::Loose(items) => items
            .iter()
            .map(|item| RowView {
                id: loose_id(item),
                name: first_member(item, &["name", "title"]),
                location: first_member(item, &["location", "loc"]),
                rule_target: rule
                    .map(|r| item.member(&r.field_id).unwrap_or(CellValue::Empty)),
            })
            .collect(),
    };

    let mut result = MapResult {
        points: Vec::new(),
        invalid_sample: None,
        total: rows.len(),
        invalid: 0,
        excluded: rule.map(|_| 0),
    };

    for (idx, row) in rows.into_iter().enumerate() {
        let location = row.location.unwrap_or(CellValue::Empty);
        let Some(point) = parse_location(&location) else {
            result.invalid += 1;
            if result.invalid_sample.is_none() {
                result.invalid_sample = Some(location);
            }
            continue;
        };

        if let (Some(rule), Some(target)) = (rule, row.rule_target.as_ref()) {
            if rule.matches(target) {
                if let Some(excluded) = result.excluded.as_mut() {
                    *excluded += 1;
                }
                continue;
            }
        }

        let name = match row.name {
            Some(cell) => cell_text(&cell),
            None => String::new(),
        };
        let name = if name.is_empty() {
            UNNAMED_LABEL.to_string()
        } else {
            name
        };
        let id = row
            .id
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| idx.to_string());
        result.points.push(MapPoint {
            id,
            name,
            lat: point.lat,
            lng: point.lng,
        });
    }

    debug!(
        total = result.total,
        invalid = result.invalid,
        excluded = result.excluded,
        points = result.points.len(),
        "normalized record batch"
    );
    result
}

/// Dashboard aggregate cells may arrive `{text|value}`-wrapped; unwrap one
/// level before parsing or rendering. Null members fall through to the next
/// candidate, then to the cell itself.
fn unwrap_data_item(cell: &CellValue) -> CellValue {
    if let CellValue::Object(map) = cell {
        if let Some(text) = map.get("text").filter(|v| !v.is_null()) {
            return CellValue::from(text);
        }
        if let Some(value) = map.get("value").filter(|v| !v.is_null()) {
            return CellValue::from(value);
        }
    }
    cell.clone()
}

/// First truthy member among `keys`, host-style: empty strings and zeros
/// fall through to the next candidate.
fn first_member(item: &CellValue, keys: &[&str]) -> Option<CellValue> {
    keys.iter()
        .find_map(|key| item.member(key).filter(CellValue::is_truthy))
}

/// Native id of a loose row: a non-empty string or numeric `id` member.
fn loose_id(item: &CellValue) -> Option<String> {
    match item.member("id")? {
        CellValue::Text(s) if !s.is_empty() => Some(s),
        CellValue::Number(n) if n != 0.0 => Some(n.to_string()),
        _ => None,
    }
}
