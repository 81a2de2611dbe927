// Percentage-of-total stacking

use crate::ir::{DataValue, Dataset};
use crate::value::CellValue;
use log::warn;

/// Rewrite each series as its share of the per-label total.
///
/// Only series listed in `visible` (all series when `None`) contribute to the
/// totals and are converted; the others are zeroed. Totals use absolute values
/// with nulls counted as 0, and a label whose total is 0 yields 0 everywhere.
///
/// Pure in its inputs: feed it the raw sums every time, never a previous result.
pub fn to_percentages(
    datasets: &[Dataset],
    labels: &[CellValue],
    visible: Option<&[usize]>,
) -> Vec<Dataset> {
    let is_visible = |idx: usize| visible.map_or(true, |v| v.contains(&idx));

    if let Some(v) = visible {
        for idx in v.iter().filter(|&&i| i >= datasets.len()) {
            warn!("Ignoring visible dataset index {} (only {} datasets)", idx, datasets.len());
        }
    }

    let mut totals = vec![0.0_f64; labels.len()];
    for (_, dataset) in datasets.iter().enumerate().filter(|(i, _)| is_visible(*i)) {
        for (total, value) in totals.iter_mut().zip(&dataset.data) {
            *total += magnitude(value);
        }
    }

    datasets
        .iter()
        .enumerate()
        .map(|(idx, dataset)| {
            let data = if is_visible(idx) {
                dataset
                    .data
                    .iter()
                    .enumerate()
                    .map(|(i, value)| match totals.get(i) {
                        Some(&total) if total > 0.0 => magnitude(value) / total * 100.0,
                        _ => 0.0,
                    })
                    .map(DataValue::Float)
                    .collect()
            } else {
                vec![DataValue::Float(0.0); dataset.data.len()]
            };
            Dataset {
                data,
                ..dataset.clone()
            }
        })
        .collect()
}

fn magnitude(value: &DataValue) -> f64 {
    value.as_f64().map_or(0.0, f64::abs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds(values: &[Option<f64>]) -> Dataset {
        Dataset::new("s", values.iter().map(|v| DataValue::from(*v)).collect())
    }

    fn labels(n: usize) -> Vec<CellValue> {
        (0..n as i64).map(CellValue::Integer).collect()
    }

    #[test]
    fn test_columns_sum_to_hundred() {
        let sets = vec![
            ds(&[Some(10.0), Some(0.0), None]),
            ds(&[Some(30.0), Some(0.0), Some(-5.0)]),
            ds(&[Some(60.0), None, Some(15.0)]),
        ];
        let out = to_percentages(&sets, &labels(3), None);

        let col = |i: usize| -> f64 { out.iter().map(|d| d.data[i].as_f64().unwrap()).sum() };
        assert!((col(0) - 100.0).abs() < 1e-9);
        assert_eq!(col(1), 0.0);
        assert!((col(2) - 100.0).abs() < 1e-9);
        assert!((out[1].data[2].as_f64().unwrap() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_hidden_series_are_zeroed_and_excluded() {
        let sets = vec![ds(&[Some(10.0), Some(10.0)]), ds(&[Some(30.0), Some(10.0)])];
        let out = to_percentages(&sets, &labels(2), Some(&[0][..]));
        assert_eq!(out[0].values(), vec![Some(100.0), Some(100.0)]);
        assert_eq!(out[1].values(), vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_repeated_calls_are_independent() {
        let sets = vec![ds(&[Some(1.0)]), ds(&[Some(3.0)])];
        let hidden = to_percentages(&sets, &labels(1), Some(&[1][..]));
        let all = to_percentages(&sets, &labels(1), None);
        assert_eq!(hidden[1].values(), vec![Some(100.0)]);
        assert_eq!(all[0].values(), vec![Some(25.0)]);
        assert_eq!(all[1].values(), vec![Some(75.0)]);
    }

    #[test]
    fn test_out_of_range_indices_are_ignored() {
        let sets = vec![ds(&[Some(2.0)])];
        let out = to_percentages(&sets, &labels(1), Some(&[0, 7][..]));
        assert_eq!(out[0].values(), vec![Some(100.0)]);
    }

    #[test]
    fn test_entries_beyond_labels_become_zero() {
        let sets = vec![ds(&[Some(2.0), Some(5.0)])];
        let out = to_percentages(&sets, &labels(1), None);
        assert_eq!(out[0].values(), vec![Some(100.0), Some(0.0)]);
    }

    #[test]
    fn test_metadata_is_preserved() {
        let mut set = ds(&[Some(1.0)]);
        set.label = "Revenue".into();
        set.style.bar_percentage = Some(0.9);
        let out = to_percentages(&[set], &labels(1), None);
        assert_eq!(out[0].label, "Revenue");
        assert_eq!(out[0].style.bar_percentage, Some(0.9));
    }
}
