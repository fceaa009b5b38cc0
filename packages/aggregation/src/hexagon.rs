//! Hexagon aggregation layer backed by H3 cells.
//!
//! The layer is configured with a hexagon radius in meters. Points are binned
//! at the H3 resolution whose average edge length is closest to that radius
//! (for a regular hexagon, edge length equals circumradius).

use std::collections::BTreeMap;

use game_viz_aggregation_models::HexagonCell;
use game_viz_dataset_models::{LatLng, Record};
use h3o::{CellIndex, Resolution};

use crate::{field_means, mean};

/// Hexagon layer configuration.
#[derive(Debug, Clone, Copy)]
pub struct HexagonSettings<'a> {
    /// Hexagon radius in meters.
    pub radius_m: f64,
    /// Field summed into each cell's elevation; missing values count as 0.
    pub elevation_field: Option<&'a str>,
    /// Field averaged into each cell's color value.
    pub color_field: Option<&'a str>,
    /// Fields averaged into each cell's tooltip.
    pub tooltip_fields: &'a [String],
}

/// Picks the H3 resolution whose average hexagon edge is closest to
/// `radius_m`.
#[must_use]
pub fn resolution_for_radius(radius_m: f64) -> Resolution {
    (0_u8..=15)
        .filter_map(|r| Resolution::try_from(r).ok())
        .min_by(|a, b| {
            (a.edge_length_m() - radius_m)
                .abs()
                .total_cmp(&(b.edge_length_m() - radius_m).abs())
        })
        .unwrap_or(Resolution::Five)
}

/// Bins positioned records into H3 cells.
///
/// Cells are ordered by descending member count, ties by cell index. Every
/// positioned record belongs to exactly one cell.
#[must_use]
pub fn hexagon_cells<'a, I>(records: I, settings: &HexagonSettings<'_>) -> Vec<HexagonCell>
where
    I: IntoIterator<Item = &'a Record>,
{
    let resolution = resolution_for_radius(settings.radius_m);
    let mut cells: BTreeMap<u64, (CellIndex, Vec<&Record>)> = BTreeMap::new();

    for record in records {
        let Some(position) = record.position else {
            continue;
        };
        let Ok(coord) = h3o::LatLng::new(position.latitude, position.longitude) else {
            continue;
        };
        let cell = coord.to_cell(resolution);
        cells
            .entry(u64::from(cell))
            .or_insert_with(|| (cell, Vec::new()))
            .1
            .push(record);
    }

    log::debug!(
        "Binned into {} hexagons at resolution {}",
        cells.len(),
        u8::from(resolution)
    );

    let mut out: Vec<HexagonCell> = cells
        .into_values()
        .map(|(cell, members)| {
            let centroid = h3o::LatLng::from(cell);
            HexagonCell {
                cell_id: cell.to_string(),
                centroid: LatLng {
                    latitude: centroid.lat(),
                    longitude: centroid.lng(),
                },
                count: members.len() as u64,
                elevation: settings
                    .elevation_field
                    .map_or(0.0, |f| members.iter().map(|r| r.weight(f)).sum()),
                color_value: settings
                    .color_field
                    .and_then(|f| mean(members.iter().copied(), f)),
                tooltip: field_means(&members, settings.tooltip_fields),
                record_ids: members.iter().map(|r| r.id).collect(),
            }
        })
        .collect();

    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}
