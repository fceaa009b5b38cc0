//! View registry: loads all view definitions from embedded TOML configs.
//!
//! Each `.toml` file in `packages/view/views/` is baked into the binary at
//! compile time via [`include_str!`]. Adding a dashboard page means adding a
//! TOML file and listing it below.

use crate::definition::{ViewDefinition, parse_view_toml};

/// TOML configs embedded at compile time, in navigation order.
const VIEW_TOMLS: &[(&str, &str)] = &[
    ("national", include_str!("../views/national.toml")),
    ("california", include_str!("../views/california.toml")),
    ("los_angeles", include_str!("../views/los_angeles.toml")),
];

/// Total number of configured views (used in tests).
#[cfg(test)]
const EXPECTED_VIEW_COUNT: usize = 3;

/// Returns all configured view definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_views() -> Vec<ViewDefinition> {
    VIEW_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_view_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a single view by id.
#[must_use]
pub fn view_by_id(id: &str) -> Option<ViewDefinition> {
    all_views().into_iter().find(|v| v.id == id)
}

#[cfg(test)]
mod tests {
    use game_viz_aggregation_models::{BoundaryPolicy, HistogramDomain};
    use game_viz_viewport::CenterStrategy;

    use super::*;
    use crate::{ChartConfig, LayerConfig, MapScope};

    #[test]
    fn loads_all_views() {
        assert_eq!(all_views().len(), EXPECTED_VIEW_COUNT);
    }

    #[test]
    fn view_ids_are_unique_and_match_file_names() {
        let views = all_views();
        let mut ids: Vec<&str> = views.iter().map(|v| v.id.as_str()).collect();
        for ((name, _), id) in VIEW_TOMLS.iter().zip(&ids) {
            assert_eq!(name, id);
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), EXPECTED_VIEW_COUNT);
    }

    #[test]
    fn all_views_have_required_fields() {
        for view in &all_views() {
            assert!(!view.title.is_empty(), "{}: title is empty", view.id);
            assert!(!view.all_label.is_empty(), "{}: all_label is empty", view.id);
            assert!(!view.resource.is_empty(), "{}: resource is empty", view.id);
            assert!(!view.charts.is_empty(), "{}: no charts", view.id);
        }
    }

    #[test]
    fn national_view_matches_dashboard_presets() {
        let view = view_by_id("national").unwrap();
        assert_eq!(view.region_column.as_deref(), Some("State_Name"));
        assert_eq!(view.viewport.center, CenterStrategy::FirstMatch);
        assert_eq!(view.viewport.default.min_zoom, Some(2.0));
        assert_eq!(view.viewport.default.max_zoom, Some(12.0));

        let LayerConfig::Hexagon(hex) = &view.layer else {
            panic!("national view should use a hexagon layer");
        };
        assert!((hex.unfiltered.radius_m - 20_000.0).abs() < f64::EPSILON);
        assert!((hex.filtered.unwrap().elevation_scale - 300.0).abs() < f64::EPSILON);

        assert!(view.charts.iter().any(|c| matches!(
            c,
            ChartConfig::Histogram {
                bins: 10,
                domain: HistogramDomain::Fixed { .. },
                ..
            }
        )));
        assert!(view.charts.iter().any(|c| matches!(
            c,
            ChartConfig::Scatter {
                only_when_filtered: true,
                ..
            }
        )));
    }

    #[test]
    fn los_angeles_view_uses_speed_buckets() {
        let view = view_by_id("los_angeles").unwrap();
        assert!(view.region_column.is_none());
        assert_eq!(view.layer.map_scope(), MapScope::All);

        let buckets = view
            .charts
            .iter()
            .find_map(|c| match c {
                ChartConfig::GroupedMean { buckets, .. } => Some(buckets),
                _ => None,
            })
            .unwrap();
        assert_eq!(buckets.policy, BoundaryPolicy::FirstMatch);
        let labels: Vec<&str> = buckets.ranges.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "0.768-5.0",
                "6.0-10.0",
                "12.0-24.0",
                "25.0-75.0",
                "100.0-300.0"
            ]
        );
    }

    #[test]
    fn unknown_view_is_none() {
        assert!(view_by_id("atlantis").is_none());
    }
}
