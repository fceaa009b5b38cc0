//! Categorical counts with percentage shares (pie chart data).

use std::collections::BTreeMap;

use game_viz_aggregation_models::CategoryShare;
use game_viz_dataset_models::Record;

/// Counts records per distinct defined value of `category_field`.
///
/// Percentages are relative to the records that have a category; blank or
/// absent categories are not counted at all. Output is ordered by descending
/// share, ties broken by the order categories were first encountered.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn category_shares<'a, I>(records: I, category_field: &str) -> Vec<CategoryShare>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut first_seen: Vec<&str> = Vec::new();
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();

    for category in records.into_iter().filter_map(|r| r.text(category_field)) {
        let count = counts.entry(category).or_insert_with(|| {
            first_seen.push(category);
            0
        });
        *count += 1;
    }

    let total: u64 = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<CategoryShare> = first_seen
        .into_iter()
        .map(|category| {
            let count = counts[category];
            CategoryShare {
                category: category.to_owned(),
                count,
                percentage: 100.0 * count as f64 / total as f64,
            }
        })
        .collect();

    // Stable: equal counts keep first-encountered order.
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}
