//! Derived view state.
//!
//! A [`Snapshot`] is everything the rendering side needs for one view: map
//! layer, charts, camera, and the selection that produced them. It is
//! recomputed from scratch by [`compute_snapshot`] after every transition
//! and replaces the previous one as a unit.

use game_viz_aggregation::{
    HexagonSettings, category_shares, grouped_mean, grouped_mean_rows, hexagon_cells, histogram,
    map_points, scatter_series, screen_grid_cells,
};
use game_viz_aggregation_models::{
    CategoryShare, GridCell, GroupedMean, GroupedMeanRow, HexagonCell, HistogramBin, MapPoint,
    ScatterSeries,
};
use game_viz_dataset_models::{Dataset, FilterState, Record, RecordId};
use game_viz_view::{ChartConfig, HexagonStyle, LayerConfig, MapScope, ViewDefinition};
use game_viz_viewport::{ViewportState, derive_viewport};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Dataset load state of a view.
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
pub enum LoadStatus {
    /// The dataset has not arrived yet.
    #[default]
    Loading,
    /// The dataset is loaded.
    Ready,
    /// The load failed; see [`Snapshot::error`].
    Failed,
}

/// Map layer data for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum LayerData {
    /// Hexagon layer.
    Hexagon {
        /// Radius and elevation scale for the current scope.
        style: HexagonStyle,
        /// Aggregated hexagons.
        cells: Vec<HexagonCell>,
    },
    /// Screen-grid layer.
    ScreenGrid {
        /// Cell edge length in pixels.
        cell_size_pixels: f64,
        /// Zoom the cells were computed at.
        zoom: f64,
        /// Aggregated cells.
        cells: Vec<GridCell>,
    },
}

impl LayerData {
    /// Member record ids of the cell with id `cell_id`.
    #[must_use]
    pub fn cell_members(&self, cell_id: &str) -> Option<&[RecordId]> {
        match self {
            Self::Hexagon { cells, .. } => cells
                .iter()
                .find(|c| c.cell_id == cell_id)
                .map(|c| c.record_ids.as_slice()),
            Self::ScreenGrid { cells, .. } => cells
                .iter()
                .find(|c| c.cell_id == cell_id)
                .map(|c| c.record_ids.as_slice()),
        }
    }
}

/// Data for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ChartData {
    /// Histogram bars.
    Histogram {
        /// Chart id.
        id: String,
        /// Title including the scope label.
        title: String,
        /// Bins in ascending order.
        bins: Vec<HistogramBin>,
    },
    /// Scatter series.
    Scatter {
        /// Chart id.
        id: String,
        /// Chart title.
        title: String,
        /// Whether the chart is shown for the current scope.
        visible: bool,
        /// Series; empty while hidden.
        series: Vec<ScatterSeries>,
    },
    /// Pie slices.
    CategoryShares {
        /// Chart id.
        id: String,
        /// Chart title.
        title: String,
        /// Slices by descending share.
        shares: Vec<CategoryShare>,
    },
    /// Stacked bars.
    GroupedMean {
        /// Chart id.
        id: String,
        /// Chart title.
        title: String,
        /// Stack order.
        categories: Vec<String>,
        /// One row per bucket.
        rows: Vec<GroupedMeanRow>,
        /// Flat bucket-major entries with their sample counts.
        entries: Vec<GroupedMean>,
    },
}

impl ChartData {
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
}

/// The complete derived state of one view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// View id.
    pub view_id: String,
    /// View title.
    pub title: String,
    /// Transition counter; strictly increases with every applied change.
    pub sequence: u64,
    /// Dataset load state.
    pub status: LoadStatus,
    /// Load error message when `status` is `failed`.
    pub error: Option<String>,
    /// Active filter.
    pub filter: FilterState,
    /// Human-readable scope label.
    pub filter_label: String,
    /// Year slider value.
    pub year: i32,
    /// Total records in the dataset.
    pub record_count: usize,
    /// Records in the active scope.
    pub in_scope_count: usize,
    /// Map camera.
    pub viewport: ViewportState,
    /// Positioned, weighted points drawn by the map layer.
    pub points: Vec<MapPoint>,
    /// Aggregated map layer.
    pub layer: LayerData,
    /// Charts in display order.
    pub charts: Vec<ChartData>,
}

impl Snapshot {
    /// Chart with the given id.
    #[must_use]
    pub fn chart(&self, id: &str) -> Option<&ChartData> {
        self.charts.iter().find(|c| c.id() == id)
    }
}

/// Selection inputs a snapshot is derived from.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    /// Active filter.
    pub filter: &'a FilterState,
    /// Year slider value.
    pub year: i32,
    /// Transition counter stamped on the snapshot.
    pub sequence: u64,
}

/// Derives a ready snapshot for `selection` over `dataset`.
#[must_use]
pub fn compute_snapshot(
    view: &ViewDefinition,
    dataset: &Dataset,
    selection: Selection<'_>,
) -> Snapshot {
    let filter = selection.filter;
    let in_scope = filter.scope(dataset, view.region_column.as_deref());
    let map_records: Vec<&Record> = match view.layer.map_scope() {
        MapScope::InScope => in_scope.clone(),
        MapScope::All => dataset.records.iter().collect(),
    };

    let (points, layer) = layer_data(view, filter, &map_records);
    let label = filter.label(&view.all_label, dataset);
    let charts = view
        .charts
        .iter()
        .map(|chart| chart_data(chart, dataset, filter, &label, &in_scope))
        .collect();

    Snapshot {
        view_id: view.id.clone(),
        title: view.title.clone(),
        sequence: selection.sequence,
        status: LoadStatus::Ready,
        error: None,
        filter: filter.clone(),
        filter_label: label,
        year: selection.year,
        record_count: dataset.len(),
        in_scope_count: in_scope.len(),
        viewport: derive_viewport(filter, &in_scope, &view.viewport),
        points,
        layer,
        charts,
    }
}

/// Snapshot for a view whose dataset is not available: every aggregate is
/// empty and the camera is the default one.
#[must_use]
pub fn empty_snapshot(
    view: &ViewDefinition,
    selection: Selection<'_>,
    status: LoadStatus,
    error: Option<String>,
) -> Snapshot {
    Snapshot {
        status,
        error,
        ..compute_snapshot(view, &Dataset::default(), selection)
    }
}

fn layer_data(
    view: &ViewDefinition,
    filter: &FilterState,
    records: &[&Record],
) -> (Vec<MapPoint>, LayerData) {
    match &view.layer {
        LayerConfig::Hexagon(hex) => {
            let style = hex.style_for(filter);
            let settings = HexagonSettings {
                radius_m: style.radius_m,
                elevation_field: hex.elevation_field.as_deref(),
                color_field: hex.color_field.as_deref(),
                tooltip_fields: &hex.tooltip_fields,
            };
            (
                map_points(records.iter().copied(), hex.elevation_field.as_deref()),
                LayerData::Hexagon {
                    style,
                    cells: hexagon_cells(records.iter().copied(), &settings),
                },
            )
        }
        LayerConfig::ScreenGrid(grid) => {
            let zoom = grid.zoom.unwrap_or(view.viewport.default.zoom);
            let weight = grid.weight_field.as_deref();
            (
                map_points(records.iter().copied(), weight),
                LayerData::ScreenGrid {
                    cell_size_pixels: grid.cell_size_pixels,
                    zoom,
                    cells: screen_grid_cells(
                        records.iter().copied(),
                        zoom,
                        grid.cell_size_pixels,
                        weight,
                    ),
                },
            )
        }
    }
}

fn chart_data(
    chart: &ChartConfig,
    dataset: &Dataset,
    filter: &FilterState,
    label: &str,
    in_scope: &[&Record],
) -> ChartData {
    let records = || in_scope.iter().copied();
    match chart {
        ChartConfig::Histogram {
            id,
            title,
            field,
            bins,
            domain,
        } => ChartData::Histogram {
            id: id.clone(),
            title: format!("{title} - {label}"),
            bins: histogram(records(), field, *bins, domain.fixed_bounds()),
        },
        ChartConfig::Scatter {
            id,
            title,
            x_field,
            y_field,
            series_field,
            only_when_filtered,
        } => {
            let visible = !*only_when_filtered || !filter.is_all();
            ChartData::Scatter {
                id: id.clone(),
                title: title.clone(),
                visible,
                series: if visible {
                    scatter_series(records(), x_field, y_field, series_field.as_deref())
                } else {
                    Vec::new()
                },
            }
        }
        ChartConfig::CategoryShares { id, title, field } => ChartData::CategoryShares {
            id: id.clone(),
            title: title.clone(),
            shares: category_shares(records(), field),
        },
        ChartConfig::GroupedMean {
            id,
            title,
            buckets,
            value_field,
            category_field,
        } => {
            let categories = dataset.sorted_distinct_text(category_field);
            let entries = grouped_mean(records(), buckets, value_field, category_field, &categories);
            ChartData::GroupedMean {
                id: id.clone(),
                title: title.clone(),
                rows: grouped_mean_rows(&entries, buckets, &categories),
                categories,
                entries,
            }
        }
    }
}
