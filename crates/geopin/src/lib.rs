//! Meta crate that re-exports the geopin building blocks with sensible
//! defaults. Downstream users can depend on this crate and opt into
//! specific layers via feature flags while keeping access to the underlying
//! crates when deeper integration is required.

#[cfg(feature = "common")]
pub use geopin_common as common;

#[cfg(feature = "pipeline")]
pub use geopin_core as pipeline;

#[cfg(feature = "dashboard")]
pub use geopin_dashboard as dashboard;

#[cfg(feature = "common")]
pub use geopin_common::{CellValue, GeoPoint};

#[cfg(feature = "pipeline")]
pub use geopin_core::{
    ExcludeOperator, ExclusionRule, FieldBinding, MapPoint, MapResult, RecordBatch,
    TableRecord, cell_text, normalize, parse_location, should_exclude,
};

#[cfg(feature = "dashboard")]
pub use geopin_dashboard::{
    DashboardBridge, DashboardState, SampleHost, TableSource, WidgetConfig, WidgetSession,
};
