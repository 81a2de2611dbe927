// Chart request decoding and validation

use crate::chart_type::ChartType;
use crate::data::TabularDataset;
use crate::error::{ChartError, Result};
use crate::filter::{EqualityFilter, RowRange};
use crate::value::CellValue;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One y-axis selection. Order matters: the first series drives single-series
/// charts, and series `i + 1` supplies bubble radii for series `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SeriesSpec {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            color: None,
        }
    }
}

/// Request payload as sent by a client, before any checks.
///
/// Every field is optional here so missing ones can be reported by name.
/// Row numbers and dataset indices accept JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChartRequest {
    #[serde(default)]
    pub x_axis: Option<String>,
    #[serde(default)]
    pub y_axes: Option<Vec<SeriesSpec>>,
    #[serde(default)]
    pub chart_type: Option<String>,
    #[serde(default)]
    pub filter_column: Option<String>,
    #[serde(default)]
    pub filter_value: Option<Value>,
    #[serde(default)]
    pub chart_filter_column: Option<String>,
    #[serde(default)]
    pub chart_filter_value: Option<Value>,
    #[serde(default, deserialize_with = "de_opt_i64_from_string_or_number")]
    pub start_row: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64_from_string_or_number")]
    pub end_row: Option<i64>,
    #[serde(default, deserialize_with = "de_indices")]
    pub visible_datasets: Option<Vec<usize>>,
}

/// A request checked against a dataset: required fields present and every
/// referenced column known.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub x_axis: String,
    pub series: Vec<SeriesSpec>,
    pub chart_type: ChartType,
    pub range: RowRange,
    pub main_filter: Option<EqualityFilter>,
    /// Column whose distinct values are offered as chart filter choices.
    pub chart_filter_column: Option<String>,
    pub chart_filter: Option<EqualityFilter>,
    pub visible_datasets: Option<Vec<usize>>,
}

impl ChartRequest {
    /// Decode and validate a JSON request body.
    pub fn from_json(body: &str, dataset: &TabularDataset) -> Result<Self> {
        let raw: RawChartRequest = serde_json::from_str(body)?;
        Self::from_raw(raw, dataset)
    }

    /// Validate a decoded request.
    ///
    /// Required fields are checked before any column, so a request missing
    /// `xAxis` reports that even if its series are also unknown. Filter
    /// columns are only checked when the filter is active.
    pub fn from_raw(raw: RawChartRequest, dataset: &TabularDataset) -> Result<Self> {
        let x_axis = raw
            .x_axis
            .filter(|x| !x.is_empty())
            .ok_or(ChartError::MissingParameter("xAxis"))?;
        let series = raw
            .y_axes
            .filter(|y| !y.is_empty())
            .ok_or(ChartError::MissingParameter("yAxes"))?;
        let chart_type = raw
            .chart_type
            .filter(|t| !t.is_empty())
            .map(|t| ChartType::from_name(&t))
            .ok_or(ChartError::MissingParameter("chartType"))?;

        let main_filter = EqualityFilter::new(raw.filter_column, filter_value(raw.filter_value));
        let chart_filter_column = raw.chart_filter_column.filter(|c| !c.is_empty());
        let chart_filter = EqualityFilter::new(
            chart_filter_column.clone(),
            filter_value(raw.chart_filter_value),
        );

        dataset.column_index(&x_axis)?;
        for spec in &series {
            dataset.column_index(&spec.column)?;
        }
        if let Some(f) = &main_filter {
            dataset.column_index(&f.column)?;
        }
        if let Some(column) = &chart_filter_column {
            dataset.column_index(column)?;
        }

        Ok(Self {
            x_axis,
            series,
            chart_type,
            range: RowRange::new(raw.start_row, raw.end_row),
            main_filter,
            chart_filter_column,
            chart_filter,
            visible_datasets: raw.visible_datasets,
        })
    }
}

// Arrays and objects cannot equal a cell, so they leave the filter inactive
fn filter_value(value: Option<Value>) -> Option<CellValue> {
    value.as_ref().and_then(CellValue::from_json)
}

/// An integer sent either as a JSON number or as a string. Null and the
/// empty string both mean absent.
struct LooseInt(Option<i64>);

impl<'de> Deserialize<'de> for LooseInt {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        struct LooseIntVisitor;

        impl<'de> Visitor<'de> for LooseIntVisitor {
            type Value = Option<i64>;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an integer, a numeric string or null")
            }

            fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Some(v))
            }

            fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(v).map(Some).map_err(E::custom)
            }

            fn visit_f64<E>(self, v: f64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                if v.is_finite() && v.fract() == 0.0 {
                    Ok(Some(v as i64))
                } else {
                    Err(E::custom(format!("expected a whole number, got {}", v)))
                }
            }

            fn visit_str<E>(self, s: &str) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                s.parse::<i64>().map(Some).map_err(E::custom)
            }

            fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }
        }

        deserializer.deserialize_any(LooseIntVisitor).map(LooseInt)
    }
}

fn de_opt_i64_from_string_or_number<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    LooseInt::deserialize(deserializer).map(|v| v.0)
}

/// Dataset indices; blank and negative entries are dropped.
fn de_indices<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<usize>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<LooseInt>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|items| {
        items
            .into_iter()
            .filter_map(|i| i.0)
            .filter_map(|i| usize::try_from(i).ok())
            .collect()
    }))
}
