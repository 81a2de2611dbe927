// Runtime executor for chart requests

use crate::chart_type::ChartType;
use crate::data::TabularDataset;
use crate::error::Result;
use crate::filter::{self, filter_rows};
use crate::ir::ChartData;
use crate::palette::assign_missing_colors;
use crate::percent::to_percentages;
use crate::request::ChartRequest;
use crate::sanitize::Sanitize;
use crate::transform::build_chart_data_with;
use crate::value::CellValue;
use crate::ChartOptions;
use log::debug;
use serde::Serialize;

/// Everything a client needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartResponse {
    pub chart_data: ChartData,
    pub chart_type: ChartType,
    /// Choices for the chart filter column, empty when none was named.
    pub chart_filter_values: Vec<CellValue>,
    pub filtered_row_count: usize,
}

/// Run a validated request against a dataset
pub fn generate_chart(
    dataset: &TabularDataset,
    request: &ChartRequest,
    options: &ChartOptions,
) -> Result<ChartResponse> {
    // 1. Row range, then the main filter
    let rows = filter_rows(dataset, &request.range, request.main_filter.as_ref())?;

    // 2. Chart filter choices come from rows before the chart filter narrows them
    let chart_filter_values = match &request.chart_filter_column {
        Some(column) => filter::distinct_values(&rows, column)?
            .into_iter()
            .map(Sanitize::sanitize)
            .collect(),
        None => Vec::new(),
    };

    let rows = match &request.chart_filter {
        Some(f) => f.apply(&rows)?,
        None => rows,
    };
    debug!("{} rows reach the {} transformer", rows.len(), request.chart_type);

    // 3. Shape
    let mut chart_data = build_chart_data_with(
        &rows,
        &request.x_axis,
        &request.series,
        &request.chart_type,
        options,
    )?;

    // 4. Percent stacking always starts from the raw sums
    if request.chart_type.profile().percent {
        let labels = chart_data.labels.clone().unwrap_or_default();
        chart_data.datasets = to_percentages(
            &chart_data.datasets,
            &labels,
            request.visible_datasets.as_deref(),
        );
    }

    // 5. Colors and wire safety
    assign_missing_colors(
        &mut chart_data,
        &request.chart_type,
        &options.color_palette(),
        options.radar_fill_alpha,
    );
    let chart_data = chart_data.sanitize();

    debug!(
        "Chart ready: {} labels, {} datasets",
        chart_data.label_count(),
        chart_data.datasets.len()
    );

    Ok(ChartResponse {
        chart_data,
        chart_type: request.chart_type.clone(),
        chart_filter_values,
        filtered_row_count: rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ColorSpec, DataValue};
    use crate::request::RawChartRequest;
    use crate::request::SeriesSpec;
    use serde_json::json;

    fn orders() -> TabularDataset {
        let row = |region: &str, month: &str, a: i64, b: i64| {
            vec![region.into(), month.into(), CellValue::Integer(a), CellValue::Integer(b)]
        };
        TabularDataset::new(
            vec!["Region".into(), "Month".into(), "A".into(), "B".into()],
            vec![
                row("North", "Jan", 1, 1),
                row("South", "Jan", 2, 2),
                row("North", "Feb", 5, 5),
                row("South", "Feb", 0, 0),
            ],
        )
    }

    fn request(chart_type: &str, series: &[&str]) -> ChartRequest {
        let raw = RawChartRequest {
            x_axis: Some("Month".into()),
            y_axes: Some(series.iter().map(|s| SeriesSpec::new(*s)).collect()),
            chart_type: Some(chart_type.into()),
            ..RawChartRequest::default()
        };
        ChartRequest::from_raw(raw, &orders()).unwrap()
    }

    #[test]
    fn test_chart_filter_values_ignore_chart_filter() {
        let mut req = request("bar", &["A"]);
        req.chart_filter_column = Some("Region".into());
        req.chart_filter = Some(crate::filter::EqualityFilter {
            column: "Region".into(),
            value: "South".into(),
        });

        let resp = generate_chart(&orders(), &req, &ChartOptions::default()).unwrap();
        assert_eq!(
            resp.chart_filter_values,
            vec![CellValue::text("North"), CellValue::text("South")]
        );
        assert_eq!(resp.filtered_row_count, 2);
        assert_eq!(resp.chart_data.datasets[0].values(), vec![Some(2.0), Some(0.0)]);
    }

    #[test]
    fn test_percent_stacked_respects_visibility() {
        let mut req = request("percentStackedBar", &["A", "B"]);
        let all = generate_chart(&orders(), &req, &ChartOptions::default()).unwrap();
        assert_eq!(
            all.chart_data.datasets[0].data,
            vec![DataValue::Integer(50), DataValue::Integer(50)]
        );

        req.visible_datasets = Some(vec![1]);
        let only_b = generate_chart(&orders(), &req, &ChartOptions::default()).unwrap();
        assert_eq!(
            only_b.chart_data.datasets[0].data,
            vec![DataValue::Integer(0), DataValue::Integer(0)]
        );
        assert_eq!(
            only_b.chart_data.datasets[1].data,
            vec![DataValue::Integer(100), DataValue::Integer(100)]
        );
    }

    #[test]
    fn test_colors_are_filled_from_options() {
        let options = ChartOptions {
            palette: vec!["#111111".into(), "#222222".into()],
            ..ChartOptions::default()
        };
        let resp = generate_chart(&orders(), &request("line", &["A", "B"]), &options).unwrap();
        assert_eq!(
            resp.chart_data.datasets[1].border_color,
            Some(ColorSpec::Single("#222222".into()))
        );
    }

    #[test]
    fn test_response_wire_shape() {
        let resp =
            generate_chart(&orders(), &request("bar", &["A"]), &ChartOptions::default()).unwrap();
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["chartType"], json!("bar"));
        assert_eq!(value["chartData"]["labels"], json!(["Jan", "Feb"]));
        assert_eq!(value["chartData"]["datasets"][0]["data"], json!([3, 5]));
        assert_eq!(value["chartFilterValues"], json!([]));
        assert_eq!(value["filteredRowCount"], json!(4));
    }
}
