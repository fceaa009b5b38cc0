//! Grouped means keyed by (range bucket, category), for stacked bars.

use std::collections::BTreeMap;

use game_viz_aggregation_models::{BoundaryPolicy, BucketSpec, GroupedMean, GroupedMeanRow};
use game_viz_dataset_models::Record;

/// Means of `value_field` for every (bucket, known category) pair.
///
/// Output is bucket-major, categories in `known_categories` order, and always
/// has exactly `ranges.len() * known_categories.len()` entries. A pair with no
/// defined values reports a mean of `0.0` so stacked series stay aligned.
///
/// Records are skipped when the bucket field, the category, or the value is
/// missing, or when the category is not in `known_categories`. Which range a
/// boundary value falls into follows `spec.policy`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn grouped_mean<'a, I>(
    records: I,
    spec: &BucketSpec,
    value_field: &str,
    category_field: &str,
    known_categories: &[String],
) -> Vec<GroupedMean>
where
    I: IntoIterator<Item = &'a Record>,
{
    let category_index: BTreeMap<&str, usize> = known_categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    let mut sums = vec![vec![(0.0_f64, 0_u64); known_categories.len()]; spec.ranges.len()];

    for record in records {
        let (Some(key), Some(category), Some(value)) = (
            record.measure(&spec.field),
            record.text(category_field),
            record.measure(value_field),
        ) else {
            continue;
        };
        let Some(&c) = category_index.get(category) else {
            continue;
        };

        for (b, range) in spec.ranges.iter().enumerate() {
            if !range.contains(key) {
                continue;
            }
            let cell = &mut sums[b][c];
            cell.0 += value;
            cell.1 += 1;
            if spec.policy == BoundaryPolicy::FirstMatch {
                break;
            }
        }
    }

    spec.ranges
        .iter()
        .zip(sums)
        .flat_map(|(range, row)| {
            known_categories
                .iter()
                .zip(row)
                .map(move |(category, (sum, count))| GroupedMean {
                    bucket: range.label.clone(),
                    category: category.clone(),
                    mean: if count == 0 { 0.0 } else { sum / count as f64 },
                    count,
                })
        })
        .collect()
}

/// Reshapes [`grouped_mean`] output into one row per bucket.
///
/// `entries` must come from [`grouped_mean`] with the same `spec` and
/// `known_categories`.
#[must_use]
pub fn grouped_mean_rows(
    entries: &[GroupedMean],
    spec: &BucketSpec,
    known_categories: &[String],
) -> Vec<GroupedMeanRow> {
    let width = known_categories.len();
    spec.ranges
        .iter()
        .enumerate()
        .map(|(i, range)| GroupedMeanRow {
            bucket: range.label.clone(),
            values: entries
                .get(i * width..(i + 1) * width)
                .unwrap_or_default()
                .iter()
                .map(|e| (e.category.clone(), e.mean))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use game_viz_aggregation_models::BucketRange;

    use super::*;

    fn speed_spec(policy: BoundaryPolicy) -> BucketSpec {
        BucketSpec {
            field: "fastest_speed_down".to_string(),
            ranges: vec![
                BucketRange::new(0.0, 10.0),
                BucketRange::new(10.0, 25.0),
                BucketRange::new(100.0, 300.0),
            ],
            policy,
        }
    }

    fn record(id: usize, speed: f64, category: &str, hours: Option<f64>) -> Record {
        Record::new(id)
            .with_measure("fastest_speed_down", Some(speed))
            .with_text("Played_Game_Category", category)
            .with_measure("Weekly_Avg_Video_Game_Hours", hours)
    }

    fn known() -> Vec<String> {
        vec!["Action".to_string(), "Puzzle".to_string()]
    }

    fn run(records: &[Record], policy: BoundaryPolicy) -> Vec<GroupedMean> {
        grouped_mean(
            records,
            &speed_spec(policy),
            "Weekly_Avg_Video_Game_Hours",
            "Played_Game_Category",
            &known(),
        )
    }

    #[test]
    fn reports_every_bucket_category_pair() {
        let records = vec![record(0, 5.0, "Action", Some(4.0))];
        let out = run(&records, BoundaryPolicy::FirstMatch);
        assert_eq!(out.len(), 6);
        assert_eq!(out[0].bucket, "0.0-10.0");
        assert_eq!(out[0].category, "Action");
        assert!((out[0].mean - 4.0).abs() < f64::EPSILON);
        assert!(out[1..].iter().all(|e| e.mean == 0.0 && e.count == 0));
    }

    #[test]
    fn averages_within_pair() {
        let records = vec![
            record(0, 150.0, "Puzzle", Some(2.0)),
            record(1, 120.0, "Puzzle", Some(6.0)),
            record(2, 130.0, "Puzzle", None),
            record(3, 140.0, "Action", Some(9.0)),
        ];
        let out = run(&records, BoundaryPolicy::FirstMatch);
        let puzzle_fast = &out[5];
        assert_eq!(puzzle_fast.bucket, "100.0-300.0");
        assert_eq!(puzzle_fast.category, "Puzzle");
        assert_eq!(puzzle_fast.count, 2);
        assert!((puzzle_fast.mean - 4.0).abs() < f64::EPSILON);
        assert!((out[4].mean - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn first_match_assigns_boundary_once() {
        let records = vec![record(0, 10.0, "Action", Some(3.0))];
        let out = run(&records, BoundaryPolicy::FirstMatch);
        assert_eq!(out.iter().map(|e| e.count).sum::<u64>(), 1);
        assert_eq!(out[0].count, 1);
    }

    #[test]
    fn inclusive_counts_boundary_in_both_ranges() {
        let records = vec![record(0, 10.0, "Action", Some(3.0))];
        let out = run(&records, BoundaryPolicy::Inclusive);
        assert_eq!(out[0].count, 1);
        assert_eq!(out[2].count, 1);
    }

    #[test]
    fn unknown_categories_and_gaps_are_ignored() {
        let records = vec![
            record(0, 5.0, "Racing", Some(3.0)),
            record(1, 50.0, "Action", Some(3.0)),
        ];
        let out = run(&records, BoundaryPolicy::FirstMatch);
        assert!(out.iter().all(|e| e.count == 0));
    }

    #[test]
    fn rows_group_by_bucket() {
        let records = vec![record(0, 20.0, "Puzzle", Some(7.5))];
        let spec = speed_spec(BoundaryPolicy::FirstMatch);
        let out = run(&records, BoundaryPolicy::FirstMatch);
        let rows = grouped_mean_rows(&out, &spec, &known());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].bucket, "10.0-25.0");
        assert_eq!(
            rows[1].values,
            vec![("Action".to_string(), 0.0), ("Puzzle".to_string(), 7.5)]
        );
    }

    #[test]
    fn no_known_categories_yields_empty_rows() {
        let spec = speed_spec(BoundaryPolicy::FirstMatch);
        let out = grouped_mean(Vec::<&Record>::new(), &spec, "v", "c", &[]);
        assert!(out.is_empty());
        let rows = grouped_mean_rows(&out, &spec, &[]);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.values.is_empty()));
    }
}
