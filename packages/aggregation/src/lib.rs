#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation engine for the game play dashboard.
//!
//! Every function is pure: it takes the records currently in scope and
//! returns chart- or layer-ready structures, with no state shared between
//! calls. Records whose keyed field is missing are excluded from that
//! aggregation only.
//!
//! Chart aggregations live in [`histogram`], [`shares`], [`grouped`], and
//! [`scatter`]; spatial layers in [`hexagon`] (H3 binning) and [`grid`]
//! (Web-Mercator screen grid).

pub mod grid;
pub mod grouped;
pub mod hexagon;
pub mod histogram;
pub mod scatter;
pub mod shares;

use game_viz_aggregation_models::{FieldMean, MapPoint};
use game_viz_dataset_models::Record;

pub use grid::screen_grid_cells;
pub use grouped::{grouped_mean, grouped_mean_rows};
pub use hexagon::{HexagonSettings, hexagon_cells};
pub use histogram::histogram;
pub use scatter::scatter_series;
pub use shares::category_shares;

/// Mean of `field` over records where it is defined.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean<'a, I>(records: I, field: &str) -> Option<f64>
where
    I: IntoIterator<Item = &'a Record>,
{
    let (sum, count) = records
        .into_iter()
        .filter_map(|r| r.measure(field))
        .fold((0.0, 0_u64), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Means of several fields, in the order given.
#[must_use]
pub fn field_means(records: &[&Record], fields: &[String]) -> Vec<FieldMean> {
    fields
        .iter()
        .map(|field| FieldMean {
            field: field.clone(),
            mean: mean(records.iter().copied(), field),
        })
        .collect()
}

/// Positioned, weighted points for a spatial layer. Records without a
/// position are skipped; a missing weight defaults to `0.0`.
#[must_use]
pub fn map_points<'a, I>(records: I, weight_field: Option<&str>) -> Vec<MapPoint>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter_map(|r| {
            Some(MapPoint {
                record_id: r.id,
                position: r.position?,
                weight: weight_field.map_or(0.0, |f| r.weight(f)),
            })
        })
        .collect()
}
