//! Dashboard runtime for the geopin widget.
//!
//! This crate links the pure normalization pipeline of `geopin-core` to a
//! concrete dashboard host: it decodes and persists the widget
//! configuration, types the host's lifecycle states, declares the narrow
//! contracts the host must satisfy, and drives fetch/normalize cycles
//! through a [`WidgetSession`]. Nothing here talks to a network; the host
//! traits are the boundary, and the built-in [`SampleHost`] stands in for
//! them in tests and demos.

pub mod config;
pub mod error;
pub mod host;
pub mod session;
pub mod state;

pub use config::{
    CustomConfig, DEFAULT_CENTER, DataCondition, WidgetConfig, config_schema,
    decode_exclusion, derive_data_conditions, encode_exclusion, normalize_data_conditions,
    parse_center, serialize_center,
};
pub use error::DashboardError;
pub use host::{
    DashboardBridge, FieldMeta, SAMPLE_TABLE_ID, SampleHost, TableMeta, TableSource,
    sample_points,
};
pub use session::{DEFAULT_POLL_INTERVAL, DataSource, FetchOutcome, WidgetSession};
pub use state::DashboardState;
