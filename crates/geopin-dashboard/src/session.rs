//! The widget session: host handles in one place, fetch/normalize cycles,
//! config persistence.
//!
//! The session owns its host handle explicitly; there are no module-level
//! SDK or timer references anywhere in the workspace. Timers themselves
//! stay with the enclosing shell; the session only answers "is a poll due".

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use geopin_common::GeoPoint;
use geopin_core::{ExclusionRule, FieldBinding, MapResult, RecordBatch, normalize};

use crate::config::{
    DEFAULT_CENTER, WidgetConfig, derive_data_conditions, encode_exclusion,
    normalize_data_conditions, serialize_center,
};
use crate::error::DashboardError;
use crate::host::{DashboardBridge, FieldMeta, TableMeta, TableSource, sample_points};
use crate::state::DashboardState;

/// Where the points of a refresh came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSource {
    /// Dashboard preview data (Create/Config).
    Preview,
    /// Formal dashboard data (View/FullScreen).
    Dashboard,
    /// Direct table read through the Bitable accessor.
    Table,
    /// Built-in sample points; every other path came up empty.
    Sample,
}

/// One refresh outcome: the normalized result plus its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchOutcome {
    pub source: DataSource,
    pub result: MapResult,
}

/// Default poll cadence while a display state is active.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Stateful shell around the pure pipeline.
pub struct WidgetSession<H> {
    host: H,
    state: DashboardState,
    config: WidgetConfig,
    table_id: String,
    dirty: bool,
    poll_interval: Duration,
    last_refresh: Option<DateTime<Utc>>,
    last_outcome: Option<FetchOutcome>,
}

impl<H: TableSource + DashboardBridge> WidgetSession<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            state: DashboardState::Unknown,
            config: WidgetConfig::default(),
            table_id: String::new(),
            dirty: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            last_refresh: None,
            last_outcome: None,
        }
    }

    /// Adopt the host's current state and saved configuration.
    ///
    /// Outside `Create` the saved selection wins; whatever is still unset
    /// afterwards defaults to the first table and its first two fields. A
    /// host that cannot answer is logged and tolerated; the widget can
    /// always fall back to sample data later.
    pub fn bootstrap(&mut self) {
        self.state = self.host.state();
        info!(state = %self.state, "dashboard bridge ready");

        if self.state != DashboardState::Create {
            match self.host.config() {
                Ok(Some(blob)) => {
                    self.config = WidgetConfig::decode(&blob);
                    if let Some(dc) = self
                        .config
                        .data_conditions
                        .as_ref()
                        .and_then(normalize_data_conditions)
                    {
                        if let Some(table_id) = dc.table_id {
                            self.table_id = table_id;
                        }
                    }
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "saved config unavailable"),
            }
        }

        if self.table_id.is_empty() {
            match self.host.table_meta() {
                Ok(tables) => {
                    if let Some(first) = tables.first() {
                        self.table_id = first.id.clone();
                    }
                }
                Err(err) => warn!(error = %err, "table metadata unavailable"),
            }
        }
        self.adopt_default_fields();
    }

    /// Fetch rows from the preferred source for the current state and run
    /// them through the normalization pipeline.
    ///
    /// Preference order mirrors the host contract: preview data while
    /// configuring, formal dashboard data while displaying, then a direct
    /// table read, then the built-in sample points. Host failures on the
    /// table path degrade to sample data rather than aborting.
    pub fn refresh(&mut self) -> FetchOutcome {
        let outcome = self.fetch_outcome();
        self.last_refresh = Some(Utc::now());
        debug!(
            source = ?outcome.source,
            total = outcome.result.total,
            points = outcome.result.points.len(),
            "refresh complete"
        );
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    fn fetch_outcome(&self) -> FetchOutcome {
        let binding = self.binding();
        let rule = self.exclusion_rule();

        if self.state.is_configuring() {
            let conditions = derive_data_conditions(Some(&self.config), &self.table_id)
                .unwrap_or(JsonValue::Null);
            match self.host.preview_data(&conditions) {
                Ok(Some(data)) => {
                    let batch = RecordBatch::from_dashboard_data(&data);
                    if !batch.is_empty() {
                        return FetchOutcome {
                            source: DataSource::Preview,
                            result: normalize(&batch, &binding, rule.as_ref()),
                        };
                    }
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "preview data unavailable"),
            }
        }

        if self.state.is_display() {
            match self.host.data() {
                Ok(Some(data)) => {
                    let batch = RecordBatch::from_dashboard_data(&data);
                    if !batch.is_empty() {
                        return FetchOutcome {
                            source: DataSource::Dashboard,
                            result: normalize(&batch, &binding, rule.as_ref()),
                        };
                    }
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "dashboard data unavailable"),
            }
        }

        if self.ready_to_query() {
            match self.host.records(&self.table_id) {
                Ok(records) => {
                    let batch = RecordBatch::Table(records);
                    return FetchOutcome {
                        source: DataSource::Table,
                        result: normalize(&batch, &binding, rule.as_ref()),
                    };
                }
                Err(err) => warn!(error = %err, "table read failed, using sample data"),
            }
        }

        let points = sample_points();
        FetchOutcome {
            source: DataSource::Sample,
            result: MapResult {
                total: points.len(),
                points,
                ..MapResult::default()
            },
        }
    }

    /// Whether a direct table read could run: table and both fields chosen.
    pub fn ready_to_query(&self) -> bool {
        !self.table_id.is_empty() && self.config.custom_config.binding().is_some()
    }

    /// Change the active table; field selection resets and defaults are
    /// re-adopted from the new table.
    pub fn select_table(&mut self, table_id: &str) {
        self.table_id = table_id.to_string();
        self.config.custom_config.name_field_id.clear();
        self.config.custom_config.location_field_id.clear();
        self.dirty = true;
        self.adopt_default_fields();
    }

    pub fn select_name_field(&mut self, field_id: &str) {
        self.config.custom_config.name_field_id = field_id.to_string();
        self.dirty = true;
    }

    pub fn select_location_field(&mut self, field_id: &str) {
        self.config.custom_config.location_field_id = field_id.to_string();
        self.dirty = true;
    }

    /// Install or clear the exclusion rule. The rule is normalized on the
    /// way in; an invalid one is stored as nothing.
    pub fn set_exclusion(&mut self, rule: Option<ExclusionRule>) {
        self.config.custom_config.exclusion = rule.as_ref().and_then(encode_exclusion);
        self.dirty = true;
    }

    pub fn set_default_center(&mut self, center: GeoPoint) {
        self.config.custom_config.default_center = Some(serialize_center(center));
        self.dirty = true;
    }

    /// Current map center: saved config, else the built-in default.
    pub fn map_center(&self) -> GeoPoint {
        self.config.custom_config.center().unwrap_or(DEFAULT_CENTER)
    }

    /// Persist the current selection through the host.
    pub fn save_config(&mut self) -> Result<(), DashboardError> {
        let blob = serde_json::json!({
            "dataConditions": derive_data_conditions(Some(&self.config), &self.table_id),
            "customConfig": self.config.custom_config,
        });
        self.host.save_config(&blob)?;
        self.dirty = false;
        info!("widget config saved");
        Ok(())
    }

    /// Host state transition. Entering a display state with unsaved
    /// selection changes triggers an auto-save.
    pub fn enter_state(&mut self, state: DashboardState) -> Result<(), DashboardError> {
        let previous = self.state;
        self.state = state;
        if previous != state {
            info!(from = %previous, to = %state, "dashboard state changed");
        }
        if state.is_display() && self.dirty {
            self.save_config()?;
        }
        Ok(())
    }

    /// Whether the enclosing shell should refresh now. True only in
    /// display states, on the configured cadence; the timer itself lives
    /// outside the session.
    pub fn poll_due(&self, now: DateTime<Utc>) -> bool {
        if !self.state.is_display() {
            return false;
        }
        match self.last_refresh {
            None => true,
            Some(last) => now
                .signed_duration_since(last)
                .to_std()
                .map_or(true, |elapsed| elapsed >= self.poll_interval),
        }
    }

    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.poll_interval = interval;
    }

    /// Selector options for the table picker.
    pub fn table_options(&self) -> Result<Vec<TableMeta>, DashboardError> {
        self.host.table_meta()
    }

    /// Selector options for the field pickers of the active table.
    pub fn field_options(&self) -> Result<Vec<FieldMeta>, DashboardError> {
        if self.table_id.is_empty() {
            return Err(DashboardError::MissingSelection("table"));
        }
        self.host.field_meta(&self.table_id)
    }

    pub fn state(&self) -> DashboardState {
        self.state
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn last_outcome(&self) -> Option<&FetchOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    fn binding(&self) -> FieldBinding {
        self.config.custom_config.binding().unwrap_or_default()
    }

    fn exclusion_rule(&self) -> Option<ExclusionRule> {
        self.config.custom_config.exclusion_rule()
    }

    /// Fill whichever field selections are still empty with the table's
    /// first two fields, the way the selector form seeds itself. A host
    /// that cannot list fields is logged and left alone.
    fn adopt_default_fields(&mut self) {
        if self.table_id.is_empty() {
            return;
        }
        let fields = match self.host.field_meta(&self.table_id) {
            Ok(fields) => fields,
            Err(err) => {
                warn!(error = %err, "field metadata unavailable");
                return;
            }
        };
        let custom = &mut self.config.custom_config;
        if custom.name_field_id.is_empty() {
            if let Some(first) = fields.first() {
                custom.name_field_id = first.id.clone();
            }
        }
        if custom.location_field_id.is_empty() {
            if let Some(second) = fields.get(1) {
                custom.location_field_id = second.id.clone();
            }
        }
    }
}
