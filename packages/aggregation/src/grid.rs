//! Screen-grid aggregation layer.
//!
//! Points are projected to Web-Mercator world pixels at the layer zoom
//! (512-pixel world at zoom 0) and bucketed into square cells of
//! `cell_size_pixels`. Because cells are in world space rather than relative
//! to the current pan offset, a cell id stays stable while the camera pans.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use game_viz_aggregation_models::GridCell;
use game_viz_dataset_models::{LatLng, Record};

/// Web-Mercator world size in pixels at zoom 0.
pub const WORLD_SIZE_PX: f64 = 512.0;

/// Latitude limit of the Web-Mercator projection.
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Projects a coordinate to world pixels at `zoom`.
#[must_use]
pub fn project(position: LatLng, zoom: f64) -> (f64, f64) {
    let scale = WORLD_SIZE_PX * zoom.exp2();
    let x = (position.longitude + 180.0) / 360.0;
    let lat_rad = position
        .latitude
        .clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT)
        .to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
    (x * scale, y * scale)
}

/// Bins positioned records into screen-grid cells at `zoom`.
///
/// Each cell's weight is the sum of `weight_field` over its members (missing
/// values count as 0). Cells are ordered by descending weight, ties by
/// `(column, row)`. A non-positive or non-finite cell size yields no cells.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn screen_grid_cells<'a, I>(
    records: I,
    zoom: f64,
    cell_size_pixels: f64,
    weight_field: Option<&str>,
) -> Vec<GridCell>
where
    I: IntoIterator<Item = &'a Record>,
{
    if !cell_size_pixels.is_finite() || cell_size_pixels <= 0.0 || !zoom.is_finite() {
        return Vec::new();
    }

    let mut cells: BTreeMap<(i64, i64), GridCell> = BTreeMap::new();

    for record in records {
        let Some(position) = record.position else {
            continue;
        };
        let (px, py) = project(position, zoom);
        let column = (px / cell_size_pixels).floor() as i64;
        let row = (py / cell_size_pixels).floor() as i64;

        let cell = cells.entry((column, row)).or_insert_with(|| GridCell {
            cell_id: format!("{column}:{row}"),
            column,
            row,
            count: 0,
            weight: 0.0,
            record_ids: Vec::new(),
        });
        cell.count += 1;
        cell.weight += weight_field.map_or(0.0, |f| record.weight(f));
        cell.record_ids.push(record.id);
    }

    let mut out: Vec<GridCell> = cells.into_values().collect();
    out.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    out
}
