//! The active record scope of a dashboard view.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Dataset, Record, RecordId};

/// Which records currently participate in aggregation and viewport
/// derivation.
///
/// Always replaced wholesale on a selection, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "scope",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum FilterState {
    /// Every record in the dataset.
    #[default]
    All,
    /// Records whose region column equals `name`.
    Region {
        /// Region label as it appears in the dataset.
        name: String,
    },
    /// Records belonging to a clicked spatial cell.
    Cell {
        /// Ids of the member records.
        record_ids: Vec<RecordId>,
    },
}

impl FilterState {
    /// Whether this is the unfiltered scope.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Resolves the records in scope.
    ///
    /// A region filter on a view without a region column selects nothing.
    /// Cell ids that do not exist in `dataset` are ignored and duplicates are
    /// collapsed, keeping the first occurrence.
    #[must_use]
    pub fn scope<'a>(&self, dataset: &'a Dataset, region_column: Option<&str>) -> Vec<&'a Record> {
        match self {
            Self::All => dataset.records.iter().collect(),
            Self::Region { name } => region_column.map_or_else(Vec::new, |column| {
                dataset
                    .records
                    .iter()
                    .filter(|r| r.text(column) == Some(name.as_str()))
                    .collect()
            }),
            Self::Cell { record_ids } => {
                let mut seen = BTreeSet::new();
                record_ids
                    .iter()
                    .filter(|id| seen.insert(**id))
                    .filter_map(|id| dataset.get(*id))
                    .collect()
            }
        }
    }

    /// Human-readable scope label used in chart titles.
    ///
    /// A cell label counts the records the cell resolves to in `dataset`,
    /// so it always agrees with [`Self::scope`].
    #[must_use]
    pub fn label(&self, all_label: &str, dataset: &Dataset) -> String {
        match self {
            Self::All => all_label.to_owned(),
            Self::Region { name } => name.clone(),
            Self::Cell { .. } => {
                format!("Selected cell ({} areas)", self.scope(dataset, None).len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            Record::new(0).with_text("County", "Alameda"),
            Record::new(0).with_text("County", "Fresno"),
            Record::new(0).with_text("County", "Alameda"),
        ])
    }

    #[test]
    fn all_scope_is_every_record() {
        let ds = dataset();
        assert_eq!(FilterState::All.scope(&ds, Some("County")).len(), 3);
    }

    #[test]
    fn region_scope_matches_column() {
        let ds = dataset();
        let filter = FilterState::Region {
            name: "Alameda".to_string(),
        };
        let ids: Vec<_> = filter.scope(&ds, Some("County")).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert!(filter.scope(&ds, None).is_empty());
    }

    #[test]
    fn unknown_region_is_empty() {
        let ds = dataset();
        let filter = FilterState::Region {
            name: "Nowhere".to_string(),
        };
        assert!(filter.scope(&ds, Some("County")).is_empty());
    }

    #[test]
    fn cell_scope_ignores_bad_and_duplicate_ids() {
        let ds = dataset();
        let filter = FilterState::Cell {
            record_ids: vec![2, 99, 2, 0],
        };
        let ids: Vec<_> = filter.scope(&ds, None).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 0]);
    }

    #[test]
    fn cell_label_counts_resolved_records() {
        let ds = dataset();
        let filter = FilterState::Cell {
            record_ids: vec![2, 99, 2, 0],
        };
        assert_eq!(filter.label("California", &ds), "Selected cell (2 areas)");
        assert_eq!(FilterState::All.label("California", &ds), "California");
    }

    #[test]
    fn serializes_with_scope_tag() {
        let json = serde_json::to_value(FilterState::Cell {
            record_ids: vec![1],
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"scope": "cell", "recordIds": [1]}));
    }
}
