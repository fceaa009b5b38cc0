//! Cell coercion helpers.

use game_viz_dataset_models::LatLng;

/// Parses a numeric cell. Returns `None` for blank, unparseable, or
/// non-finite values.
#[must_use]
pub fn parse_measure(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a coordinate pair from latitude/longitude cells. Returns `None`
/// unless both parse and fall in range.
#[must_use]
pub fn parse_position(lat: Option<&str>, lng: Option<&str>) -> Option<LatLng> {
    let latitude = parse_measure(lat?)?;
    let longitude = parse_measure(lng?)?;
    LatLng::new(latitude, longitude)
}
