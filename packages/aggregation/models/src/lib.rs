#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation result types.
//!
//! Everything here is chart- or layer-ready: the rendering side receives
//! these structures as JSON and draws them without further computation.

use game_viz_dataset_models::{LatLng, RecordId};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One equal-width histogram bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    /// Inclusive lower bound.
    pub lower: f64,
    /// Upper bound; exclusive except for the last bin.
    pub upper: f64,
    /// Number of values in the bin.
    pub count: u64,
    /// Axis label, e.g. `"6.0-8.0"`.
    pub label: String,
}

/// Domain a histogram spans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistogramDomain {
    /// A fixed `[min, max]` domain; values outside it are excluded.
    Fixed {
        /// Lower edge.
        min: f64,
        /// Upper edge.
        max: f64,
    },
    /// The observed `[min, max]` of the defined values.
    Observed,
}

impl HistogramDomain {
    /// The fixed bounds, or `None` for an observed domain.
    #[must_use]
    pub const fn fixed_bounds(self) -> Option<(f64, f64)> {
        match self {
            Self::Fixed { min, max } => Some((min, max)),
            Self::Observed => None,
        }
    }
}

/// Count and share of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    /// Category label.
    pub category: String,
    /// Number of records with this category.
    pub count: u64,
    /// `100 * count / total categorized records`.
    pub percentage: f64,
}

/// A closed numeric range `[min, max]` used to bucket records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketRange {
    /// Display label, e.g. `"25.0-75.0"`.
    pub label: String,
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
}

impl BucketRange {
    /// Creates a range labelled `"{min:.1}-{max:.1}"`.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            label: format!("{min:.1}-{max:.1}"),
            min,
            max,
        }
    }

    /// Whether `value` lies in `[min, max]`.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// How a value on a shared boundary of two ranges is assigned.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BoundaryPolicy {
    /// A value belongs only to the first listed range containing it.
    #[default]
    FirstMatch,
    /// A value belongs to every range containing it.
    Inclusive,
}

/// Ordered bucket ranges over one numeric field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSpec {
    /// Field the ranges apply to (e.g. `fastest_speed_down`).
    pub field: String,
    /// Ranges in display order.
    pub ranges: Vec<BucketRange>,
    /// Assignment of values that fall in more than one range.
    #[serde(default)]
    pub policy: BoundaryPolicy,
}

/// Mean of a value field for one (bucket, category) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedMean {
    /// Bucket label.
    pub bucket: String,
    /// Category label.
    pub category: String,
    /// Mean value; `0.0` when the pair has no defined values.
    pub mean: f64,
    /// Number of records contributing to the mean.
    pub count: u64,
}

/// One stacked-bar row: a bucket with a value per known category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedMeanRow {
    /// Bucket label.
    pub bucket: String,
    /// `(category, mean)` in known-category order.
    pub values: Vec<(String, f64)>,
}

/// One scatter point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterPoint {
    /// Source record.
    pub record_id: RecordId,
    /// X value.
    pub x: f64,
    /// Y value.
    pub y: f64,
}

/// A named scatter series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterSeries {
    /// Series label (e.g. the record `Type`).
    pub name: String,
    /// Points in record order.
    pub points: Vec<ScatterPoint>,
}

/// A positioned, weighted point handed to a spatial aggregation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint {
    /// Source record.
    pub record_id: RecordId,
    /// Position.
    pub position: LatLng,
    /// Layer weight (missing values default to `0.0`).
    pub weight: f64,
}

/// Mean of one tooltip field across a cell's members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMean {
    /// Field name.
    pub field: String,
    /// Mean over members with a defined value.
    pub mean: Option<f64>,
}

/// One hexagon of a hexagon aggregation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HexagonCell {
    /// H3 cell index in its canonical hex string form.
    pub cell_id: String,
    /// Cell centroid.
    pub centroid: LatLng,
    /// Number of member records.
    pub count: u64,
    /// Sum of the elevation weight over members.
    pub elevation: f64,
    /// Mean of the color field over members with a defined value.
    pub color_value: Option<f64>,
    /// Tooltip means.
    pub tooltip: Vec<FieldMean>,
    /// Member records.
    pub record_ids: Vec<RecordId>,
}

/// One cell of a screen-grid aggregation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    /// Cell id, `"{column}:{row}"`.
    pub cell_id: String,
    /// Cell column in world pixel space at the layer zoom.
    pub column: i64,
    /// Cell row in world pixel space at the layer zoom.
    pub row: i64,
    /// Number of member records.
    pub count: u64,
    /// Sum of the weight over members.
    pub weight: f64,
    /// Member records.
    pub record_ids: Vec<RecordId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_range_label_and_bounds() {
        let range = BucketRange::new(0.768, 5.0);
        assert_eq!(range.label, "0.8-5.0");
        assert!(range.contains(0.768));
        assert!(range.contains(5.0));
        assert!(!range.contains(5.5));
    }

    #[test]
    fn boundary_policy_parses_from_snake_case() {
        assert_eq!(
            "inclusive".parse::<BoundaryPolicy>().unwrap(),
            BoundaryPolicy::Inclusive
        );
        assert_eq!(BoundaryPolicy::default().to_string(), "first_match");
    }

    #[test]
    fn histogram_domain_deserializes() {
        let domain: HistogramDomain =
            serde_json::from_value(serde_json::json!({"type": "fixed", "min": 0.0, "max": 20.0}))
                .unwrap();
        assert_eq!(domain, HistogramDomain::Fixed { min: 0.0, max: 20.0 });
    }
}
