//! Tolerant coordinate parsing.
//!
//! Location cells arrive in every shape the platform can produce: a plain
//! `"31.2,121.5"` string, a rich-text fragment array wrapping that string, a
//! location object with `latitude`/`longitude` fields, or a `{text|value}`
//! wrapper around any of the above. [`parse_location`] dispatches
//! most-specific-first and recurses through the wrappers; anything it cannot
//! read yields `None`, never an error.

use geopin_common::{CellValue, GeoPoint};
use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;

/// Token separators accepted in textual coordinates: ASCII comma, fullwidth
/// comma, or any whitespace run.
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,，]|\s+").expect("separator regex must compile"));

/// Parse one raw cell into a coordinate.
///
/// Returns `None` for absent or unparseable input. The two-number textual
/// case goes through the axis-order heuristic; object-shaped coordinates are
/// taken verbatim.
pub fn parse_location(raw: &CellValue) -> Option<GeoPoint> {
    match raw {
        CellValue::Empty | CellValue::Number(_) | CellValue::Bool(_) => None,
        CellValue::Text(s) => parse_pair_text(s),
        // Rich-text fragment unwrapping: only the first fragment counts.
        CellValue::Seq(items) => items.first().and_then(parse_location),
        CellValue::Location(point) => Some(*point),
        CellValue::Object(_) => match raw.wrapped_str() {
            // A wrapped string beats numeric fields on the same object.
            Some(s) => parse_pair_text(s),
            None => {
                let (lat, lng) = raw.geo_pair()?;
                GeoPoint::checked(lat, lng)
            }
        },
    }
}

fn parse_pair_text(s: &str) -> Option<GeoPoint> {
    let mut nums: SmallVec<[f64; 4]> = SmallVec::new();
    for token in SEPARATORS.split(s) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        // Every token must be a finite number, not just the two we use.
        nums.push(token.parse::<f64>().ok().filter(|n| n.is_finite())?);
    }
    if nums.len() < 2 {
        return None;
    }
    Some(normalize_axis_order(nums[0], nums[1]))
}

/// Axis-order heuristic for the two-number textual case.
///
/// A magnitude above 90 cannot be a latitude, so when exactly one side
/// exceeds it that side becomes the longitude. When neither or both do, the
/// given `(lat, lng)` order stands: a genuinely swapped in-range pair is
/// indistinguishable and is deliberately left alone.
fn normalize_axis_order(a: f64, b: f64) -> GeoPoint {
    let a_is_lng = a.abs() > 90.0;
    let b_is_lng = b.abs() > 90.0;
    if a_is_lng && !b_is_lng {
        GeoPoint::new(b, a)
    } else {
        GeoPoint::new(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: serde_json::Value) -> Option<GeoPoint> {
        parse_location(&CellValue::from(v))
    }

    #[test]
    fn in_range_pair_keeps_order() {
        assert_eq!(parse(json!("31.2,121.5")), Some(GeoPoint::new(31.2, 121.5)));
    }

    #[test]
    fn first_token_above_ninety_swaps_axes() {
        assert_eq!(parse(json!("121.5,31.2")), Some(GeoPoint::new(31.2, 121.5)));
    }

    #[test]
    fn both_above_ninety_keeps_order() {
        assert_eq!(
            parse(json!("121.5,150.0")),
            Some(GeoPoint::new(121.5, 150.0))
        );
    }

    #[test]
    fn fullwidth_comma_and_whitespace_separate() {
        assert_eq!(parse(json!("31.2，121.5")), Some(GeoPoint::new(31.2, 121.5)));
        assert_eq!(
            parse(json!("  31.2   121.5 ")),
            Some(GeoPoint::new(31.2, 121.5))
        );
    }

    #[test]
    fn extra_numeric_tokens_are_ignored() {
        assert_eq!(
            parse(json!("31.2, 121.5, 8.0")),
            Some(GeoPoint::new(31.2, 121.5))
        );
    }

    #[test]
    fn any_non_numeric_token_fails_the_string() {
        assert_eq!(parse(json!("not,numbers")), None);
        assert_eq!(parse(json!("31.2,121.5,x")), None);
    }

    #[test]
    fn one_token_is_not_enough() {
        assert_eq!(parse(json!("31.2")), None);
        assert_eq!(parse(json!("")), None);
    }

    #[test]
    fn non_finite_tokens_fail() {
        assert_eq!(parse(json!("NaN,121.5")), None);
        assert_eq!(parse(json!("inf,121.5")), None);
    }

    #[test]
    fn absent_and_scalar_shapes_fail() {
        assert_eq!(parse(json!(null)), None);
        assert_eq!(parse(json!(31.2)), None);
        assert_eq!(parse(json!(true)), None);
    }

    #[test]
    fn location_object_is_taken_verbatim() {
        assert_eq!(
            parse(json!({"latitude": 31.2, "longitude": 121.5})),
            Some(GeoPoint::new(31.2, 121.5))
        );
        // No axis-order normalization for the object case.
        assert_eq!(
            parse(json!({"lat": 121.5, "lng": 31.2})),
            Some(GeoPoint::new(121.5, 31.2))
        );
    }

    #[test]
    fn fragment_array_unwraps_first_element() {
        assert_eq!(
            parse(json!([{"text": "31.2,121.5"}, {"text": "ignored"}])),
            Some(GeoPoint::new(31.2, 121.5))
        );
        assert_eq!(parse(json!(["31.2,121.5"])), Some(GeoPoint::new(31.2, 121.5)));
        assert_eq!(parse(json!([])), None);
    }

    #[test]
    fn wrapped_string_beats_numeric_fields() {
        assert_eq!(
            parse(json!({"text": "31.2,121.5", "lat": 1.0, "lng": 2.0})),
            Some(GeoPoint::new(31.2, 121.5))
        );
        assert_eq!(
            parse(json!({"value": "31.2,121.5"})),
            Some(GeoPoint::new(31.2, 121.5))
        );
    }

    #[test]
    fn unreadable_objects_fail() {
        assert_eq!(parse(json!({"address": "somewhere"})), None);
        assert_eq!(parse(json!({"latitude": "31.2", "longitude": "121.5"})), None);
    }
}
