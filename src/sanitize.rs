// Final pass that keeps chart output representable as plain JSON

use crate::ir::{ChartData, DataValue, Dataset, Point, StyleFlags};
use crate::value::CellValue;
use serde_json::{Number, Value};

/// Largest magnitude below which every integral f64 is an exact integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Rewrite a value so it only holds finite, plain numbers, strings and nulls.
///
/// Non-finite floats become null, integral floats are narrowed to integers.
/// Timestamps are left typed here and render as ISO strings on serialization.
pub trait Sanitize {
    fn sanitize(self) -> Self;
}

/// Narrow a float: non-finite → `Null`, integral → `Integer`, else `Float`.
pub fn narrow(v: f64) -> DataValue {
    if !v.is_finite() {
        DataValue::Null
    } else if v.fract() == 0.0 && v.abs() < MAX_EXACT_INTEGER {
        DataValue::Integer(v as i64)
    } else {
        DataValue::Float(v)
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|f| f.is_finite())
}

impl Sanitize for ChartData {
    fn sanitize(self) -> Self {
        ChartData {
            labels: self
                .labels
                .map(|labels| labels.into_iter().map(Sanitize::sanitize).collect()),
            datasets: self.datasets.into_iter().map(Sanitize::sanitize).collect(),
        }
    }
}

impl Sanitize for Dataset {
    fn sanitize(self) -> Self {
        Dataset {
            data: self.data.into_iter().map(Sanitize::sanitize).collect(),
            border_width: if self.border_width.is_finite() {
                self.border_width
            } else {
                1.0
            },
            style: self.style.sanitize(),
            ..self
        }
    }
}

impl Sanitize for StyleFlags {
    fn sanitize(self) -> Self {
        StyleFlags {
            tension: finite(self.tension),
            point_radius: finite(self.point_radius),
            point_hover_radius: finite(self.point_hover_radius),
            bar_percentage: finite(self.bar_percentage),
            category_percentage: finite(self.category_percentage),
            ..self
        }
    }
}

impl Sanitize for DataValue {
    fn sanitize(self) -> Self {
        match self {
            DataValue::Float(v) => narrow(v),
            DataValue::Point(p) if !(p.x.is_plottable() && p.y.is_plottable()) => DataValue::Null,
            DataValue::Point(p) => DataValue::Point(Point {
                r: p.r.filter(CellValue::is_plottable),
                ..p
            }),
            other => other,
        }
    }
}

impl Sanitize for CellValue {
    fn sanitize(self) -> Self {
        match self {
            CellValue::Float(v) if !v.is_finite() => CellValue::Null,
            other => other,
        }
    }
}

/// Apply the same narrowing to an arbitrary JSON tree.
pub fn sanitize_json(value: Value) -> Value {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => match narrow(f) {
                DataValue::Integer(i) => Value::from(i),
                DataValue::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
                _ => Value::Null,
            },
            _ => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_json).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, sanitize_json(v)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_narrow() {
        assert_eq!(narrow(300.0), DataValue::Integer(300));
        assert_eq!(narrow(-2.0), DataValue::Integer(-2));
        assert_eq!(narrow(2.5), DataValue::Float(2.5));
        assert_eq!(narrow(f64::NAN), DataValue::Null);
        assert_eq!(narrow(f64::NEG_INFINITY), DataValue::Null);
        assert_eq!(narrow(1e300), DataValue::Float(1e300));
    }

    #[test]
    fn test_chart_data_is_sanitized() {
        let mut ds = Dataset::new(
            "s",
            vec![
                DataValue::Float(f64::NAN),
                DataValue::Float(4.0),
                DataValue::Point(Point::xy(f64::INFINITY, 1.0)),
                DataValue::Point(Point::xyr(1.0, 2.0, f64::NAN)),
            ],
        );
        ds.style.tension = Some(f64::NAN);
        let chart = ChartData {
            labels: Some(vec![CellValue::Float(f64::NAN), CellValue::text("b")]),
            datasets: vec![ds],
        }
        .sanitize();

        assert_eq!(
            chart.labels,
            Some(vec![CellValue::Null, CellValue::text("b")])
        );
        let data = &chart.datasets[0].data;
        assert_eq!(data[0], DataValue::Null);
        assert_eq!(data[1], DataValue::Integer(4));
        assert_eq!(data[2], DataValue::Null);
        assert_eq!(data[3], DataValue::Point(Point::xy(1.0, 2.0)));
        assert_eq!(chart.datasets[0].style.tension, None);
    }

    #[test]
    fn test_sanitize_json_tree() {
        let v = json!({"a": [1.0, 2.5, "x", null], "b": {"c": 7}});
        assert_eq!(
            sanitize_json(v),
            json!({"a": [1, 2.5, "x", null], "b": {"c": 7}})
        );
    }
}
