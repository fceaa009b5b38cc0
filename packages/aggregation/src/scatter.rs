//! Scatter plot series.

use game_viz_aggregation_models::{ScatterPoint, ScatterSeries};
use game_viz_dataset_models::Record;

/// Series name used when no series column is configured or a record has no
/// value for it.
pub const DEFAULT_SERIES: &str = "Data";

/// Builds scatter series of `(x_field, y_field)`, one per distinct value of
/// `series_field` in first-encountered order.
///
/// Records missing either coordinate are dropped.
#[must_use]
pub fn scatter_series<'a, I>(
    records: I,
    x_field: &str,
    y_field: &str,
    series_field: Option<&str>,
) -> Vec<ScatterSeries>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut series: Vec<ScatterSeries> = Vec::new();

    for record in records {
        let (Some(x), Some(y)) = (record.measure(x_field), record.measure(y_field)) else {
            continue;
        };
        let name = series_field
            .and_then(|f| record.text(f))
            .unwrap_or(DEFAULT_SERIES);

        let point = ScatterPoint {
            record_id: record.id,
            x,
            y,
        };

        if let Some(existing) = series.iter_mut().find(|s| s.name == name) {
            existing.points.push(point);
        } else {
            series.push(ScatterSeries {
                name: name.to_owned(),
                points: vec![point],
            });
        }
    }

    series
}
