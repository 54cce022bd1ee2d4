//! Runtime error surface of the dashboard shell.

use thiserror::Error;

/// Failures crossing the host boundary.
///
/// The normalization core never produces these: parse failures surface as
/// diagnostics inside a `MapResult`, and malformed saved config normalizes
/// to absence. What remains is the host itself misbehaving.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The host bridge reported a failure (SDK missing, permissions,
    /// transport).
    #[error("host bridge failure: {0}")]
    Host(String),

    /// A blob could not be serialized for the host.
    #[error("config serialization failed")]
    ConfigEncode(#[from] serde_json::Error),

    /// An operation needs a selection that has not been made yet.
    #[error("missing selection: {0}")]
    MissingSelection(&'static str),
}
