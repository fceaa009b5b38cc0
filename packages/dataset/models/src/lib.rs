#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset record types shared by the loader, the aggregation engine, and
//! the dashboard state machine.
//!
//! A [`Record`] is one parsed CSV row. Numeric cells that are missing or fail
//! to parse are kept as `None` so that each aggregation can exclude them for
//! the field it keys on, instead of silently treating them as zero.

mod filter;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub use filter::FilterState;

/// Zero-based row index of a record within its dataset.
pub type RecordId = usize;

/// A WGS84 coordinate pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLng {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl LatLng {
    /// Creates a coordinate, returning `None` unless both components are
    /// finite and within the valid latitude/longitude ranges.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }
}

/// One geographic sample after parsing and coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Row index within the dataset.
    pub id: RecordId,
    /// Text attributes keyed by column name (state, county, category...).
    pub text: BTreeMap<String, String>,
    /// Numeric measures keyed by column name. `None` marks a missing or
    /// non-numeric cell.
    pub numeric: BTreeMap<String, Option<f64>>,
    /// Geographic position, present only when both coordinates parsed.
    pub position: Option<LatLng>,
}

impl Record {
    /// Creates an empty record with the given id.
    #[must_use]
    pub const fn new(id: RecordId) -> Self {
        Self {
            id,
            text: BTreeMap::new(),
            numeric: BTreeMap::new(),
            position: None,
        }
    }

    /// Builder-style setter for a text attribute.
    #[must_use]
    pub fn with_text(mut self, column: &str, value: &str) -> Self {
        self.text.insert(column.to_owned(), value.to_owned());
        self
    }

    /// Builder-style setter for a numeric measure.
    #[must_use]
    pub fn with_measure(mut self, column: &str, value: Option<f64>) -> Self {
        self.numeric.insert(column.to_owned(), value);
        self
    }

    /// Builder-style setter for the position.
    #[must_use]
    pub const fn with_position(mut self, position: Option<LatLng>) -> Self {
        self.position = position;
        self
    }

    /// Returns the text attribute for `column`, treating blank cells as
    /// undefined.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<&str> {
        self.text
            .get(column)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Returns the numeric measure for `column` if it is defined.
    #[must_use]
    pub fn measure(&self, column: &str) -> Option<f64> {
        self.numeric.get(column).copied().flatten()
    }

    /// Returns the measure for `column`, defaulting to `0.0` when missing.
    ///
    /// Only map-layer weights use this; aggregations that key on a field
    /// use [`Self::measure`] and skip missing values.
    #[must_use]
    pub fn weight(&self, column: &str) -> f64 {
        self.measure(column).unwrap_or(0.0)
    }
}

/// Declares which CSV columns a view reads and how they are coerced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ColumnSchema {
    /// Columns kept verbatim as text.
    #[serde(default)]
    pub text: Vec<String>,
    /// Columns parsed as `f64`.
    #[serde(default)]
    pub numeric: Vec<String>,
    /// Latitude column, if the dataset is positioned.
    pub latitude: Option<String>,
    /// Longitude column, if the dataset is positioned.
    pub longitude: Option<String>,
}

impl ColumnSchema {
    /// All column names this schema requires in the header row.
    #[must_use]
    pub fn required_columns(&self) -> Vec<&str> {
        self.text
            .iter()
            .chain(self.numeric.iter())
            .chain(self.latitude.iter())
            .chain(self.longitude.iter())
            .map(String::as_str)
            .collect()
    }
}

/// A fully loaded dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Header row as it appeared in the source (trimmed).
    pub headers: Vec<String>,
    /// Records in source order; `records[i].id == i`.
    pub records: Vec<Record>,
    /// Count of cells per numeric column that failed to parse.
    pub malformed: BTreeMap<String, u64>,
    /// Rows containing bytes that are not valid UTF-8. Those rows are kept
    /// with the invalid bytes replaced.
    pub malformed_rows: u64,
}

impl Dataset {
    /// Creates a dataset from records, reassigning ids to match positions.
    #[must_use]
    pub fn from_records(mut records: Vec<Record>) -> Self {
        for (i, record) in records.iter_mut().enumerate() {
            record.id = i;
        }
        Self {
            headers: Vec::new(),
            records,
            malformed: BTreeMap::new(),
            malformed_rows: 0,
        }
    }

    /// Number of records.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a record by id.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id)
    }

    /// Distinct defined values of a text column, in first-encountered order.
    #[must_use]
    pub fn distinct_text(&self, column: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for value in self.records.iter().filter_map(|r| r.text(column)) {
            if seen.insert(value) {
                out.push(value.to_owned());
            }
        }
        out
    }

    /// Distinct defined values of a text column, sorted.
    #[must_use]
    pub fn sorted_distinct_text(&self, column: &str) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.text(column))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            Record::new(0)
                .with_text("State_Name", "Texas")
                .with_measure("Mean", Some(52_000.0)),
            Record::new(0)
                .with_text("State_Name", "Alabama")
                .with_measure("Mean", None),
            Record::new(0)
                .with_text("State_Name", "Texas")
                .with_text("Type", ""),
        ])
    }

    #[test]
    fn from_records_reassigns_ids() {
        let ds = sample();
        let ids: Vec<_> = ds.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn distinct_text_keeps_first_seen_order() {
        assert_eq!(sample().distinct_text("State_Name"), vec!["Texas", "Alabama"]);
        assert_eq!(
            sample().sorted_distinct_text("State_Name"),
            vec!["Alabama", "Texas"]
        );
    }

    #[test]
    fn blank_text_is_undefined() {
        let ds = sample();
        assert_eq!(ds.records[2].text("Type"), None);
        assert!(ds.distinct_text("Type").is_empty());
    }

    #[test]
    fn missing_measure_is_none_but_weight_defaults_to_zero() {
        let ds = sample();
        assert_eq!(ds.records[1].measure("Mean"), None);
        assert!(ds.records[1].weight("Mean").abs() < f64::EPSILON);
        assert_eq!(ds.records[2].measure("Mean"), None);
    }

    #[test]
    fn latlng_rejects_out_of_range() {
        assert!(LatLng::new(91.0, 0.0).is_none());
        assert!(LatLng::new(f64::NAN, 0.0).is_none());
        assert!(LatLng::new(34.05, -118.24).is_some());
    }

    #[test]
    fn column_schema_deserializes() {
        let schema: ColumnSchema = serde_json::from_value(serde_json::json!({
            "text": ["County"],
            "numeric": ["Weekly_Avg_Exercise_Hours"],
            "latitude": "Lat",
            "longitude": "Lon"
        }))
        .unwrap();
        assert_eq!(
            schema.required_columns(),
            vec!["County", "Weekly_Avg_Exercise_Hours", "Lat", "Lon"]
        );
    }
}
