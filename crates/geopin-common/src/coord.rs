//! Geographic coordinate shared across the pipeline and the dashboard
//! runtime.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A `(lat, lng)` pair as rendered on the map.
///
/// Both components must be finite; use [`GeoPoint::checked`] when the inputs
/// come from untrusted cells. Nothing here clamps to ±90/±180; out-of-range
/// magnitudes are exactly what the textual parser's axis-order heuristic
/// keys on, so they survive untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Construct a point, rejecting non-finite components.
    pub fn checked(lat: f64, lng: f64) -> Option<Self> {
        (lat.is_finite() && lng.is_finite()).then_some(Self { lat, lng })
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_rejects_non_finite() {
        assert!(GeoPoint::checked(31.2, 121.5).is_some());
        assert!(GeoPoint::checked(f64::NAN, 121.5).is_none());
        assert!(GeoPoint::checked(31.2, f64::INFINITY).is_none());
    }

    #[test]
    fn out_of_range_is_still_a_point() {
        let p = GeoPoint::checked(121.5, 31.2).expect("no range clamp");
        assert_eq!(p.lat, 121.5);
    }

    #[test]
    fn serde_round_trip() {
        let p = GeoPoint::new(31.2, 121.5);
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json, serde_json::json!({"lat": 31.2, "lng": 121.5}));
        let back: GeoPoint = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
