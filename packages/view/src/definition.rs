//! Config-driven view definition.
//!
//! [`ViewDefinition`] captures everything unique about a dashboard page in a
//! serializable config struct. The dashboard runs one generic pipeline over
//! it, so the national, state, and city pages differ only in configuration.

use game_viz_aggregation_models::{BucketSpec, HistogramDomain};
use game_viz_dataset_models::{ColumnSchema, FilterState};
use game_viz_viewport::ViewportSettings;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::ViewError;

// ── Top-level view definition ────────────────────────────────────────────

/// A complete dashboard page definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewDefinition {
    /// Unique identifier (e.g., `"national"`).
    pub id: String,
    /// Page title.
    pub title: String,
    /// Scope label used when no filter is active (e.g., `"United States"`).
    pub all_label: String,
    /// Dataset location, relative to the data root unless absolute.
    pub resource: String,
    /// Whether the dataset is gzip-compressed.
    #[serde(default)]
    pub gzip: bool,
    /// Field delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Text column the region dropdown filters on, if the page has one.
    pub region_column: Option<String>,
    /// Columns read from the dataset.
    pub columns: ColumnSchema,
    /// Camera presets.
    pub viewport: ViewportSettings,
    /// Map aggregation layer.
    pub layer: LayerConfig,
    /// Charts in display order.
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
    /// Year slider bounds.
    #[serde(default)]
    pub year: YearSlider,
}

const fn default_delimiter() -> char {
    ','
}

impl ViewDefinition {
    /// The delimiter as the single byte the CSV reader expects.
    ///
    /// Always succeeds for a definition that passed [`Self::validate`].
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b',')
    }

    /// Checks that every field the layer and charts read is declared in
    /// [`Self::columns`] with the right kind.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ViewError> {
        let invalid = |reason: String| ViewError::Invalid {
            view: self.id.clone(),
            reason,
        };
        let numeric = |field: &str| -> Result<(), ViewError> {
            if self.columns.numeric.iter().any(|c| c == field) {
                Ok(())
            } else {
                Err(invalid(format!("'{field}' is not a numeric column")))
            }
        };
        let text = |field: &str| -> Result<(), ViewError> {
            if self.columns.text.iter().any(|c| c == field) {
                Ok(())
            } else {
                Err(invalid(format!("'{field}' is not a text column")))
            }
        };

        if self.id.is_empty() {
            return Err(invalid("id is empty".to_string()));
        }
        if !self.delimiter.is_ascii() {
            return Err(invalid(format!(
                "delimiter '{}' is not ASCII",
                self.delimiter
            )));
        }
        if let Some(region) = &self.region_column {
            text(region)?;
        }
        if self.columns.latitude.is_none() || self.columns.longitude.is_none() {
            return Err(invalid(
                "map layers need latitude and longitude columns".to_string(),
            ));
        }
        if !self.year.is_valid() {
            return Err(invalid(format!(
                "year slider {}..={} does not contain {}",
                self.year.min, self.year.max, self.year.default
            )));
        }

        match &self.layer {
            LayerConfig::Hexagon(hex) => {
                for style in std::iter::once(&hex.unfiltered).chain(hex.filtered.as_ref()) {
                    if !(style.radius_m.is_finite() && style.radius_m > 0.0) {
                        return Err(invalid(format!(
                            "hexagon radius {} must be positive",
                            style.radius_m
                        )));
                    }
                }
                for field in hex
                    .elevation_field
                    .iter()
                    .chain(hex.color_field.iter())
                    .chain(hex.tooltip_fields.iter())
                {
                    numeric(field)?;
                }
            }
            LayerConfig::ScreenGrid(grid) => {
                if !(grid.cell_size_pixels.is_finite() && grid.cell_size_pixels > 0.0) {
                    return Err(invalid(format!(
                        "cell size {} must be positive",
                        grid.cell_size_pixels
                    )));
                }
                if let Some(field) = &grid.weight_field {
                    numeric(field)?;
                }
            }
        }

        let mut chart_ids: Vec<&str> = Vec::with_capacity(self.charts.len());
        for chart in &self.charts {
            if chart_ids.contains(&chart.id()) {
                return Err(invalid(format!("duplicate chart id '{}'", chart.id())));
            }
            chart_ids.push(chart.id());

            match chart {
                ChartConfig::Histogram { field, bins, .. } => {
                    numeric(field)?;
                    if *bins == 0 {
                        return Err(invalid(format!("histogram on '{field}' has zero bins")));
                    }
                }
                ChartConfig::Scatter {
                    x_field,
                    y_field,
                    series_field,
                    ..
                } => {
                    numeric(x_field)?;
                    numeric(y_field)?;
                    if let Some(series) = series_field {
                        text(series)?;
                    }
                }
                ChartConfig::CategoryShares { field, .. } => text(field)?,
                ChartConfig::GroupedMean {
                    buckets,
                    value_field,
                    category_field,
                    ..
                } => {
                    numeric(&buckets.field)?;
                    numeric(value_field)?;
                    text(category_field)?;
                    if buckets.ranges.iter().any(|r| r.min > r.max) {
                        return Err(invalid(format!(
                            "inverted bucket range on '{}'",
                            buckets.field
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

// ── Map layer ────────────────────────────────────────────────────────────

/// Which records a map layer draws.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MapScope {
    /// Only the records in the active filter scope.
    #[default]
    InScope,
    /// The whole dataset regardless of the filter (cell selection pages,
    /// where the grid stays put while the charts follow the click).
    All,
}

/// Map aggregation layer configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerConfig {
    /// Hexagon binning with elevation and color.
    Hexagon(HexagonLayerConfig),
    /// Fixed-pixel square grid.
    ScreenGrid(ScreenGridLayerConfig),
}

impl LayerConfig {
    /// Which records the layer draws.
    #[must_use]
    pub const fn map_scope(&self) -> MapScope {
        match self {
            Self::Hexagon(hex) => hex.map_scope,
            Self::ScreenGrid(grid) => grid.map_scope,
        }
    }
}

/// Radius and elevation scale of a hexagon layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HexagonStyle {
    /// Hexagon radius in meters.
    #[serde(alias = "radius_m")]
    pub radius_m: f64,
    /// Elevation multiplier applied by the renderer.
    #[serde(alias = "elevation_scale")]
    pub elevation_scale: f64,
}

/// Hexagon layer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HexagonLayerConfig {
    /// Style used for the unfiltered scope.
    pub unfiltered: HexagonStyle,
    /// Style used while a filter is active; defaults to `unfiltered`.
    pub filtered: Option<HexagonStyle>,
    /// Field summed into each hexagon's elevation.
    pub elevation_field: Option<String>,
    /// Field averaged into each hexagon's color.
    pub color_field: Option<String>,
    /// Fields averaged into each hexagon's tooltip.
    #[serde(default)]
    pub tooltip_fields: Vec<String>,
    /// Which records are drawn.
    #[serde(default)]
    pub map_scope: MapScope,
}

impl HexagonLayerConfig {
    /// The style for `filter`.
    #[must_use]
    pub fn style_for(&self, filter: &FilterState) -> HexagonStyle {
        if filter.is_all() {
            self.unfiltered
        } else {
            self.filtered.unwrap_or(self.unfiltered)
        }
    }
}

/// Screen-grid layer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScreenGridLayerConfig {
    /// Cell edge length in screen pixels.
    pub cell_size_pixels: f64,
    /// Field summed into each cell's weight.
    pub weight_field: Option<String>,
    /// Zoom at which cells are computed; defaults to the view's default zoom
    /// so that cell ids stay stable while the camera moves.
    pub zoom: Option<f64>,
    /// Which records are drawn.
    #[serde(default)]
    pub map_scope: MapScope,
}

// ── Charts ───────────────────────────────────────────────────────────────

/// One chart on a page.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartConfig {
    /// Equal-width histogram of one numeric field.
    Histogram {
        /// Chart id, unique within the view.
        id: String,
        /// Title prefix; the scope label is appended.
        title: String,
        /// Field to bin.
        field: String,
        /// Number of bins.
        bins: usize,
        /// Domain the bins span.
        #[serde(default = "observed_domain")]
        domain: HistogramDomain,
    },
    /// Scatter plot of two numeric fields.
    Scatter {
        /// Chart id, unique within the view.
        id: String,
        /// Chart title.
        title: String,
        /// X-axis field.
        x_field: String,
        /// Y-axis field.
        y_field: String,
        /// Text field splitting points into series.
        series_field: Option<String>,
        /// Hide the chart while the scope is unfiltered.
        #[serde(default)]
        only_when_filtered: bool,
    },
    /// Pie chart of category shares.
    CategoryShares {
        /// Chart id, unique within the view.
        id: String,
        /// Chart title.
        title: String,
        /// Category field.
        field: String,
    },
    /// Stacked bars of per-bucket, per-category means.
    GroupedMean {
        /// Chart id, unique within the view.
        id: String,
        /// Chart title.
        title: String,
        /// Bucket ranges over a numeric field.
        buckets: BucketSpec,
        /// Field averaged in each bucket/category pair.
        value_field: String,
        /// Category field; known categories are its sorted distinct values
        /// over the whole dataset.
        category_field: String,
    },
}

const fn observed_domain() -> HistogramDomain {
    HistogramDomain::Observed
}

impl ChartConfig {
    /// Chart id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Histogram { id, .. }
            | Self::Scatter { id, .. }
            | Self::CategoryShares { id, .. }
            | Self::GroupedMean { id, .. } => id,
        }
    }

    /// Chart title.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Histogram { title, .. }
            | Self::Scatter { title, .. }
            | Self::CategoryShares { title, .. }
            | Self::GroupedMean { title, .. } => title,
        }
    }
}

// ── Year slider ──────────────────────────────────────────────────────────

/// Bounds of the year slider. The year is display-only and never affects
/// aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSlider {
    /// First selectable year.
    pub min: i32,
    /// Last selectable year.
    pub max: i32,
    /// Initial year.
    pub default: i32,
}

impl Default for YearSlider {
    fn default() -> Self {
        Self {
            min: 2000,
            max: 2024,
            default: 2024,
        }
    }
}

impl YearSlider {
    /// Clamps `year` into the slider range.
    #[must_use]
    pub fn clamp(&self, year: i32) -> i32 {
        year.clamp(self.min, self.max)
    }

    const fn is_valid(&self) -> bool {
        self.min <= self.default && self.default <= self.max
    }
}

/// Parses and validates a view definition from a TOML string.
///
/// # Errors
///
/// Returns [`ViewError`] if the TOML is malformed or the definition is
/// inconsistent.
pub fn parse_view_toml(toml_str: &str) -> Result<ViewDefinition, ViewError> {
    let view: ViewDefinition = toml::de::from_str(toml_str)?;
    view.validate()?;
    Ok(view)
}

#[cfg(test)]
mod tests {
    use game_viz_viewport::CenterStrategy;

    use super::*;

    const MINIMAL: &str = r#"
id = "test"
title = "Test"
all_label = "Everywhere"
resource = "test.csv"
region_column = "Region"

[columns]
text = ["Region", "Kind"]
numeric = ["Hours", "Speed"]
latitude = "Lat"
longitude = "Lon"

[viewport]
focus_zoom = 8.0
transition_duration_ms = 500

[viewport.default]
latitude = 37.0
longitude = -120.0
zoom = 5.5

[layer]
type = "hexagon"
elevation_field = "Hours"
unfiltered = { radius_m = 5000.0, elevation_scale = 100.0 }

[[charts]]
type = "histogram"
id = "hours"
title = "Hours"
field = "Hours"
bins = 10
"#;

    #[test]
    fn parses_minimal_view_with_defaults() {
        let view = parse_view_toml(MINIMAL).unwrap();
        assert_eq!(view.id, "test");
        assert!(!view.gzip);
        assert_eq!(view.delimiter_byte(), b',');
        assert_eq!(view.year, YearSlider::default());
        assert_eq!(view.viewport.center, CenterStrategy::Mean);
        assert_eq!(view.layer.map_scope(), MapScope::InScope);
        match &view.charts[0] {
            ChartConfig::Histogram { domain, .. } => {
                assert_eq!(*domain, HistogramDomain::Observed);
            }
            other => panic!("unexpected chart {other:?}"),
        }
    }

    #[test]
    fn filtered_style_falls_back_to_unfiltered() {
        let view = parse_view_toml(MINIMAL).unwrap();
        let LayerConfig::Hexagon(hex) = &view.layer else {
            panic!("expected hexagon layer");
        };
        let region = FilterState::Region {
            name: "x".to_string(),
        };
        assert_eq!(hex.style_for(&region), hex.unfiltered);
    }

    #[test]
    fn rejects_undeclared_chart_field() {
        let bad = MINIMAL.replace("field = \"Hours\"", "field = \"Nope\"");
        let err = parse_view_toml(&bad).unwrap_err();
        assert!(err.to_string().contains("'Nope' is not a numeric column"));
    }

    #[test]
    fn rejects_region_column_that_is_not_text() {
        let bad = MINIMAL.replace("region_column = \"Region\"", "region_column = \"Hours\"");
        assert!(matches!(
            parse_view_toml(&bad),
            Err(ViewError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_zero_bins() {
        let bad = MINIMAL.replace("bins = 10", "bins = 0");
        assert!(parse_view_toml(&bad).is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            parse_view_toml("id = "),
            Err(ViewError::Toml(_))
        ));
    }

    #[test]
    fn year_slider_clamps() {
        let slider = YearSlider::default();
        assert_eq!(slider.clamp(1990), 2000);
        assert_eq!(slider.clamp(2030), 2024);
        assert_eq!(slider.clamp(2010), 2010);
    }
}
