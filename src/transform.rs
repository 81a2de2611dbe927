use crate::chart_type::{AggregationPolicy, ChartFamily, ChartProfile, ChartType, LabelOrder};
use crate::data::TabularDataset;
use crate::error::Result;
use crate::ir::{ChartData, ColorSpec, DataValue, Dataset, Point};
use crate::request::SeriesSpec;
use crate::value::{CellKey, CellValue};
use crate::ChartOptions;
use log::{debug, warn};
use std::collections::HashMap;

/// Main entry point: shape a (filtered) dataset into chart data with default options.
pub fn build_chart_data(
    dataset: &TabularDataset,
    x_axis: &str,
    series: &[SeriesSpec],
    chart_type: &ChartType,
) -> Result<ChartData> {
    build_chart_data_with(dataset, x_axis, series, chart_type, &ChartOptions::default())
}

/// Shape a dataset into chart data.
///
/// Percent-stacked charts come back as raw category sums; percentages are
/// applied afterwards by [`crate::percent::to_percentages`] so they can be
/// re-derived for any set of visible series. Colors the request did not set
/// are left empty for [`crate::palette::assign_missing_colors`].
pub fn build_chart_data_with(
    dataset: &TabularDataset,
    x_axis: &str,
    series: &[SeriesSpec],
    chart_type: &ChartType,
    options: &ChartOptions,
) -> Result<ChartData> {
    let profile = chart_type.profile();

    if profile.family == ChartFamily::Unsupported {
        warn!("Unsupported chart type '{}', returning empty chart", chart_type);
        return Ok(ChartData::empty());
    }
    if profile.family == ChartFamily::SingleSeries && series.is_empty() {
        return Ok(ChartData::empty());
    }

    // 1. Resolve columns up front so a bad name never yields partial output
    let x_idx = dataset.column_index(x_axis)?;
    let y_idxs = series
        .iter()
        .map(|s| dataset.column_index(&s.column))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Processing {} chart data: {} rows, {} series",
        chart_type,
        dataset.len(),
        series.len()
    );

    // 2. Shape per family
    let chart = match profile.family {
        ChartFamily::Category => {
            category_chart(dataset, x_idx, &y_idxs, series, &profile, options)
        }
        ChartFamily::StackedPivot => {
            stacked_chart(dataset, x_idx, &y_idxs, series, &profile, options)
        }
        ChartFamily::SingleSeries => {
            single_series_chart(dataset, x_idx, y_idxs[0], &series[0], &profile, options)
        }
        ChartFamily::Coordinate => {
            let bubble = *chart_type == ChartType::Bubble;
            coordinate_chart(dataset, x_idx, &y_idxs, series, bubble, options)
        }
        ChartFamily::Unsupported => ChartData::empty(),
    };

    if let Some(first) = chart.datasets.first() {
        debug!(
            "Dataset '{}' first points: {:?}",
            first.label,
            &first.data[..first.data.len().min(5)]
        );
    }

    Ok(chart)
}

/// Distinct non-null x values in the requested order.
pub fn category_labels(
    dataset: &TabularDataset,
    x_idx: usize,
    order: LabelOrder,
) -> Vec<CellValue> {
    let mut labels = dataset.distinct_values(x_idx);
    if order == LabelOrder::Sorted {
        labels.sort_by(|a, b| a.natural_cmp(b));
    }
    labels
}

/// Sum one series per label.
///
/// Nulls inside a group are skipped. A label with no usable value (no rows,
/// or only nulls) becomes `None` under `NullPreserving` and `0` under `ZeroFill`.
pub fn aggregate_by_label(
    dataset: &TabularDataset,
    x_idx: usize,
    y_idx: usize,
    labels: &[CellValue],
    policy: AggregationPolicy,
) -> Vec<Option<f64>> {
    let positions: HashMap<CellKey, usize> = labels
        .iter()
        .enumerate()
        .filter_map(|(i, label)| label.key().map(|k| (k, i)))
        .collect();

    let mut sums: Vec<Option<f64>> = vec![None; labels.len()];
    for row in &dataset.rows {
        let Some(pos) = row[x_idx].key().and_then(|k| positions.get(&k)) else {
            continue;
        };
        if let Some(v) = row[y_idx].as_f64() {
            let slot = &mut sums[*pos];
            *slot = Some(slot.unwrap_or(0.0) + v);
        }
    }

    apply_policy(sums, policy)
}

fn apply_policy(sums: Vec<Option<f64>>, policy: AggregationPolicy) -> Vec<Option<f64>> {
    match policy {
        AggregationPolicy::NullPreserving => sums,
        AggregationPolicy::ZeroFill => sums.into_iter().map(|s| Some(s.unwrap_or(0.0))).collect(),
    }
}

/// Per-series pivot (x → sum over rows where the series has a value),
/// inner-joined on x across all series.
///
/// A category survives only if every series has at least one value for it.
/// Label order follows the first series' pivot.
pub fn stacked_pivot(
    dataset: &TabularDataset,
    x_idx: usize,
    y_idxs: &[usize],
) -> (Vec<CellValue>, Vec<Vec<f64>>) {
    let pivots: Vec<Pivot> = y_idxs.iter().map(|&y| Pivot::build(dataset, x_idx, y)).collect();

    let Some((first, rest)) = pivots.split_first() else {
        return (Vec::new(), Vec::new());
    };

    let labels: Vec<CellValue> = first
        .order
        .iter()
        .filter(|(key, _)| rest.iter().all(|p| p.sums.contains_key(key)))
        .map(|(_, label)| label.clone())
        .collect();

    let columns = pivots
        .iter()
        .map(|pivot| {
            labels
                .iter()
                .map(|label| label.key().and_then(|k| pivot.sums.get(&k)).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();

    (labels, columns)
}

struct Pivot {
    order: Vec<(CellKey, CellValue)>,
    sums: HashMap<CellKey, f64>,
}

impl Pivot {
    fn build(dataset: &TabularDataset, x_idx: usize, y_idx: usize) -> Self {
        let mut order = Vec::new();
        let mut sums: HashMap<CellKey, f64> = HashMap::new();
        for row in &dataset.rows {
            let (Some(key), Some(v)) = (row[x_idx].key(), row[y_idx].as_f64()) else {
                continue;
            };
            match sums.get_mut(&key) {
                Some(total) => *total += v,
                None => {
                    sums.insert(key.clone(), v);
                    order.push((key, row[x_idx].clone()));
                }
            }
        }
        Self { order, sums }
    }
}

fn series_dataset(
    spec: &SeriesSpec,
    data: Vec<DataValue>,
    profile: &ChartProfile,
    options: &ChartOptions,
) -> Dataset {
    let mut dataset = Dataset::new(spec.column.clone(), data);
    if let Some(color) = spec.color.as_ref().filter(|c| !c.trim().is_empty()) {
        dataset.background_color = Some(ColorSpec::Single(color.clone()));
        dataset.border_color = Some(ColorSpec::Single(color.clone()));
    }
    dataset.border_width = options.border_width;
    dataset.style = profile.style.clone();
    dataset
}

fn category_chart(
    dataset: &TabularDataset,
    x_idx: usize,
    y_idxs: &[usize],
    series: &[SeriesSpec],
    profile: &ChartProfile,
    options: &ChartOptions,
) -> ChartData {
    if dataset.is_empty() {
        return ChartData::empty();
    }

    let labels = category_labels(dataset, x_idx, profile.label_order);
    let datasets = series
        .iter()
        .zip(y_idxs)
        .map(|(spec, &y_idx)| {
            let data = aggregate_by_label(dataset, x_idx, y_idx, &labels, profile.policy)
                .into_iter()
                .map(DataValue::from)
                .collect();
            series_dataset(spec, data, profile, options)
        })
        .collect();

    ChartData {
        labels: Some(labels),
        datasets,
    }
}

fn stacked_chart(
    dataset: &TabularDataset,
    x_idx: usize,
    y_idxs: &[usize],
    series: &[SeriesSpec],
    profile: &ChartProfile,
    options: &ChartOptions,
) -> ChartData {
    if dataset.is_empty() {
        return ChartData::empty();
    }

    let (labels, columns) = stacked_pivot(dataset, x_idx, y_idxs);
    let datasets = series
        .iter()
        .zip(columns)
        .map(|(spec, values)| {
            let data = values.into_iter().map(DataValue::Float).collect();
            series_dataset(spec, data, profile, options)
        })
        .collect();

    ChartData {
        labels: Some(labels),
        datasets,
    }
}

fn single_series_chart(
    dataset: &TabularDataset,
    x_idx: usize,
    y_idx: usize,
    spec: &SeriesSpec,
    profile: &ChartProfile,
    options: &ChartOptions,
) -> ChartData {
    let labels = category_labels(dataset, x_idx, profile.label_order);
    let data = aggregate_by_label(dataset, x_idx, y_idx, &labels, profile.policy)
        .into_iter()
        .map(DataValue::from)
        .collect();

    // Colors are per slice, never per series
    let plain = SeriesSpec {
        column: spec.column.clone(),
        color: None,
    };

    ChartData {
        labels: Some(labels),
        datasets: vec![series_dataset(&plain, data, profile, options)],
    }
}

fn coordinate_chart(
    dataset: &TabularDataset,
    x_idx: usize,
    y_idxs: &[usize],
    series: &[SeriesSpec],
    bubble: bool,
    options: &ChartOptions,
) -> ChartData {
    let profile = ChartType::Scatter.profile();
    let datasets = series
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let y_idx = y_idxs[i];
            let r_idx = if bubble { y_idxs.get(i + 1).copied() } else { None };

            let points = dataset
                .rows
                .iter()
                .filter_map(|row| {
                    let x = plottable(&row[x_idx])?;
                    let y = plottable(&row[y_idx])?;
                    let point = if bubble {
                        let r = r_idx
                            .and_then(|idx| plottable(&row[idx]))
                            .unwrap_or(CellValue::Float(options.bubble_radius));
                        Point::xyr(x, y, r)
                    } else {
                        Point::xy(x, y)
                    };
                    Some(DataValue::Point(point))
                })
                .collect();

            series_dataset(spec, points, &profile, options)
        })
        .collect();

    ChartData {
        labels: None,
        datasets,
    }
}

// Rows missing a coordinate are dropped, never emitted as null points
fn plottable(cell: &CellValue) -> Option<CellValue> {
    cell.is_plottable().then(|| cell.clone())
}
