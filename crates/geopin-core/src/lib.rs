//! Record-to-point normalization pipeline.
//!
//! The host hands back weakly-typed rows (live table records, a 2-D
//! dashboard aggregate, or loosely shaped objects); this crate turns one
//! batch of them into a clean list of map points plus diagnostic counts.
//! Four concerns, one module each:
//!
//! - [`parse`]: one raw cell to a `(lat, lng)` pair, or nothing
//! - [`text`]: one raw cell to a display string, never failing
//! - [`exclude`]: user-configured per-field drop rules
//! - [`normalize`]: batch orchestration producing a [`MapResult`]
//!
//! Every function here is a synchronous pure transform: no host handles, no
//! shared state, no error type. Both failure shapes, an unparseable
//! coordinate and a malformed rule, are expressed as absence.

pub mod exclude;
pub mod normalize;
pub mod parse;
pub mod text;

pub use exclude::{ExcludeOperator, ExclusionRule, should_exclude};
pub use normalize::{
    FieldBinding, MapPoint, MapResult, RecordBatch, TableRecord, UNNAMED_LABEL, normalize,
};
pub use parse::parse_location;
pub use text::cell_text;
