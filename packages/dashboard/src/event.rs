//! User interaction events.

use game_viz_dataset_models::RecordId;
use serde::{Deserialize, Serialize};

/// Label the region dropdown uses for the unfiltered scope.
pub const ALL_REGIONS: &str = "All";

/// A user interaction that replaces part of a view's selection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum DashboardEvent {
    /// A region picked from the dropdown. [`ALL_REGIONS`] clears the filter.
    SelectRegion {
        /// Region label.
        name: String,
    },
    /// Clear every filter.
    SelectAll,
    /// A clicked cell, given as its member record ids.
    SelectCell {
        /// Member record ids.
        record_ids: Vec<RecordId>,
    },
    /// A clicked cell, given by the id it has in the current map layer.
    SelectCellById {
        /// Hexagon or grid cell id.
        cell_id: String,
    },
    /// Year slider moved. Display-only.
    SetYear {
        /// Selected year; clamped to the slider range.
        year: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_events() {
        let event: DashboardEvent =
            serde_json::from_value(serde_json::json!({"type": "select_region", "name": "Texas"}))
                .unwrap();
        assert_eq!(
            event,
            DashboardEvent::SelectRegion {
                name: "Texas".to_string()
            }
        );

        let event: DashboardEvent =
            serde_json::from_value(serde_json::json!({"type": "select_cell", "recordIds": [3, 1]}))
                .unwrap();
        assert_eq!(
            event,
            DashboardEvent::SelectCell {
                record_ids: vec![3, 1]
            }
        );

        let event: DashboardEvent =
            serde_json::from_value(serde_json::json!({"type": "select_all"})).unwrap();
        assert_eq!(event, DashboardEvent::SelectAll);
    }

    #[test]
    fn rejects_unknown_event_type() {
        assert!(
            serde_json::from_value::<DashboardEvent>(serde_json::json!({"type": "zoom"})).is_err()
        );
    }
}
