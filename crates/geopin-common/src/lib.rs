//! Shared data model for the geopin widget crates.
//!
//! `geopin-common` holds the two types every other crate speaks:
//! [`CellValue`], a closed union over the raw cell shapes a Bitable host can
//! hand back, and [`GeoPoint`], the finite `(lat, lng)` pair that ends up on
//! the map.

pub mod coord;
pub mod value;

pub use coord::*;
pub use value::*;
