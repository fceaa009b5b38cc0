//! Fixed-count, equal-width histograms.

use game_viz_aggregation_models::HistogramBin;
use game_viz_dataset_models::Record;

/// Bins the defined values of `field` into `bin_count` equal-width bins.
///
/// With `domain == None` the bins span the observed `[min, max]`; with a
/// fixed domain, values outside it are excluded. Bins are closed-open except
/// the last, which is closed so that `max` lands in it.
///
/// Returns an empty vector when there are no defined values, when
/// `bin_count` is zero, or when the domain is inverted. A degenerate domain
/// (`min == max`) produces a single bin.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn histogram<'a, I>(
    records: I,
    field: &str,
    bin_count: usize,
    domain: Option<(f64, f64)>,
) -> Vec<HistogramBin>
where
    I: IntoIterator<Item = &'a Record>,
{
    if bin_count == 0 {
        return Vec::new();
    }

    let values: Vec<f64> = records.into_iter().filter_map(|r| r.measure(field)).collect();
    if values.is_empty() {
        return Vec::new();
    }

    let (min, max) = domain.unwrap_or_else(|| {
        values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    });

    if !min.is_finite() || !max.is_finite() || max < min {
        log::debug!("Histogram over '{field}' skipped: invalid domain [{min}, {max}]");
        return Vec::new();
    }

    if (max - min).abs() < f64::EPSILON {
        let count = values.iter().filter(|v| (**v - min).abs() < f64::EPSILON).count();
        return vec![bin(min, max, count as u64)];
    }

    let width = (max - min) / bin_count as f64;
    let last = bin_count - 1;
    let mut counts = vec![0_u64; bin_count];

    for v in values {
        if v < min || v > max {
            continue;
        }
        let idx = if v >= max {
            last
        } else {
            (((v - min) / width).floor() as usize).min(last)
        };
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = (i as f64).mul_add(width, min);
            let upper = if i == last {
                max
            } else {
                ((i + 1) as f64).mul_add(width, min)
            };
            bin(lower, upper, count)
        })
        .collect()
}

fn bin(lower: f64, upper: f64, count: u64) -> HistogramBin {
    HistogramBin {
        lower,
        upper,
        count,
        label: format!("{lower:.1}-{upper:.1}"),
    }
}
