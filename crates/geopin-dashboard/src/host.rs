//! Host collaborator contracts and the built-in sample host.
//!
//! The real host is a JS bridge outside this workspace; these traits pin
//! down the narrow slice of it the widget actually consumes. [`SampleHost`]
//! implements both sides in memory and doubles as the recovery data source
//! when no bridge is reachable.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use geopin_core::{MapPoint, TableRecord};

use crate::error::DashboardError;
use crate::state::DashboardState;

/// A selectable table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMeta {
    pub id: String,
    pub name: String,
}

/// A selectable field of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMeta {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
}

/// Table/record accessor backed by the Bitable side of the host.
pub trait TableSource {
    fn table_meta(&self) -> Result<Vec<TableMeta>, DashboardError>;
    fn field_meta(&self, table_id: &str) -> Result<Vec<FieldMeta>, DashboardError>;
    fn records(&self, table_id: &str) -> Result<Vec<TableRecord>, DashboardError>;
}

/// Dashboard side of the host: lifecycle state, config persistence,
/// aggregated data.
pub trait DashboardBridge {
    fn state(&self) -> DashboardState;
    fn config(&self) -> Result<Option<JsonValue>, DashboardError>;
    fn save_config(&mut self, blob: &JsonValue) -> Result<(), DashboardError>;
    /// Formal data while displaying; `None` when the host has none yet.
    fn data(&self) -> Result<Option<JsonValue>, DashboardError>;
    /// Preview data for the given data conditions while configuring.
    fn preview_data(&self, conditions: &JsonValue) -> Result<Option<JsonValue>, DashboardError>;
}

/// Built-in demo points, used when every data path comes up empty.
pub fn sample_points() -> Vec<MapPoint> {
    [
        ("1", "上海静安寺店", 31.223, 121.445),
        ("2", "上海陆家嘴店", 31.240, 121.513),
        ("3", "杭州西湖店", 30.249, 120.155),
        ("4", "深圳南山店", 22.533, 113.930),
    ]
    .into_iter()
    .map(|(id, name, lat, lng)| MapPoint {
        id: id.to_string(),
        name: name.to_string(),
        lat,
        lng,
    })
    .collect()
}

/// In-memory host for tests and local previews: one store table with a
/// deliberately messy location column.
#[derive(Debug, Clone)]
pub struct SampleHost {
    state: DashboardState,
    saved: Option<JsonValue>,
    /// Dashboard-provided payloads, when simulating the aggregate paths.
    pub dashboard_data: Option<JsonValue>,
    pub preview: Option<JsonValue>,
}

pub const SAMPLE_TABLE_ID: &str = "tblSampleStores";

impl SampleHost {
    pub fn new(state: DashboardState) -> Self {
        Self {
            state,
            saved: None,
            dashboard_data: None,
            preview: None,
        }
    }

    pub fn with_saved_config(mut self, blob: JsonValue) -> Self {
        self.saved = Some(blob);
        self
    }

    pub fn set_state(&mut self, state: DashboardState) {
        self.state = state;
    }

    /// What the widget last persisted, if anything.
    pub fn saved_config(&self) -> Option<&JsonValue> {
        self.saved.as_ref()
    }

    fn sample_records() -> Vec<TableRecord> {
        serde_json::from_value(serde_json::json!([
            {"recordId": "rec1", "fields": {"fldName": "上海静安寺店", "fldLocation": "31.223,121.445", "fldStatus": "open"}},
            {"recordId": "rec2", "fields": {"fldName": "上海陆家嘴店", "fldLocation": {"latitude": 31.240, "longitude": 121.513}, "fldStatus": "open"}},
            {"recordId": "rec3", "fields": {"fldName": "杭州西湖店", "fldLocation": "30.249,120.155", "fldStatus": "open"}},
            {"recordId": "rec4", "fields": {"fldName": "深圳南山店", "fldLocation": "22.533,113.930", "fldStatus": "closed"}},
            {"recordId": "rec5", "fields": {"fldName": "数据待补店", "fldLocation": "待定", "fldStatus": "open"}},
        ]))
        .expect("sample records are well formed")
    }
}

impl Default for SampleHost {
    fn default() -> Self {
        Self::new(DashboardState::Unknown)
    }
}

impl TableSource for SampleHost {
    fn table_meta(&self) -> Result<Vec<TableMeta>, DashboardError> {
        Ok(vec![TableMeta {
            id: SAMPLE_TABLE_ID.to_string(),
            name: "门店表".to_string(),
        }])
    }

    fn field_meta(&self, table_id: &str) -> Result<Vec<FieldMeta>, DashboardError> {
        if table_id != SAMPLE_TABLE_ID {
            return Err(DashboardError::Host(format!("unknown table `{table_id}`")));
        }
        Ok(vec![
            FieldMeta {
                id: "fldName".to_string(),
                name: "店名".to_string(),
                field_type: Some("text".to_string()),
            },
            FieldMeta {
                id: "fldLocation".to_string(),
                name: "经纬度".to_string(),
                field_type: Some("text".to_string()),
            },
            FieldMeta {
                id: "fldStatus".to_string(),
                name: "状态".to_string(),
                field_type: Some("singleSelect".to_string()),
            },
        ])
    }

    fn records(&self, table_id: &str) -> Result<Vec<TableRecord>, DashboardError> {
        if table_id != SAMPLE_TABLE_ID {
            return Err(DashboardError::Host(format!("unknown table `{table_id}`")));
        }
        Ok(Self::sample_records())
    }
}

impl DashboardBridge for SampleHost {
    fn state(&self) -> DashboardState {
        self.state
    }

    fn config(&self) -> Result<Option<JsonValue>, DashboardError> {
        Ok(self.saved.clone())
    }

    fn save_config(&mut self, blob: &JsonValue) -> Result<(), DashboardError> {
        self.saved = Some(blob.clone());
        Ok(())
    }

    fn data(&self) -> Result<Option<JsonValue>, DashboardError> {
        Ok(self.dashboard_data.clone())
    }

    fn preview_data(&self, _conditions: &JsonValue) -> Result<Option<JsonValue>, DashboardError> {
        Ok(self.preview.clone())
    }
}
