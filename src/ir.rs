use crate::value::CellValue;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

// =============================================================================
// Chart-ready output
// =============================================================================

/// Labels plus one dataset per series, in the shape chart front-ends consume.
///
/// `labels` is absent for coordinate charts. When present, every dataset's
/// `data` has one entry per label, aligned by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<CellValue>>,
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    /// `{labels: [], datasets: []}`
    pub fn empty() -> Self {
        Self {
            labels: Some(Vec::new()),
            datasets: Vec::new(),
        }
    }

    pub fn label_count(&self) -> usize {
        self.labels.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<DataValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<ColorSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<ColorSpec>,
    #[serde(serialize_with = "serialize_number")]
    pub border_width: f64,
    #[serde(flatten)]
    pub style: StyleFlags,
}

impl Dataset {
    pub fn new(label: impl Into<String>, data: Vec<DataValue>) -> Self {
        Self {
            label: label.into(),
            data,
            background_color: None,
            border_color: None,
            border_width: 1.0,
            style: StyleFlags::default(),
        }
    }

    /// Numeric view of `data`; nulls and points read as `None`.
    pub fn values(&self) -> Vec<Option<f64>> {
        self.data.iter().map(DataValue::as_f64).collect()
    }
}

/// A single color or one color per data entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Single(String),
    Each(Vec<String>),
}

/// Chart-type specific presentation flags. Unset flags are omitted from the output.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleFlags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_hover_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_gaps: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_percentage: Option<f64>,
}

// =============================================================================
// Data entries
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Null,
    Integer(i64),
    Float(f64),
    Point(Point),
}

impl DataValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Integer(i) => Some(*i as f64),
            DataValue::Float(f) => Some(*f),
            DataValue::Null | DataValue::Point(_) => None,
        }
    }
}

impl From<Option<f64>> for DataValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(DataValue::Null, DataValue::Float)
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        DataValue::Float(v)
    }
}

impl From<Point> for DataValue {
    fn from(p: Point) -> Self {
        DataValue::Point(p)
    }
}

/// Coordinate chart entry. `r` is only set for bubble charts.
///
/// Coordinates keep the cell's own type: a text or date axis is emitted as
/// strings, numbers as numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: CellValue,
    pub y: CellValue,
    pub r: Option<CellValue>,
}

impl Point {
    pub fn xy(x: impl Into<CellValue>, y: impl Into<CellValue>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            r: None,
        }
    }

    pub fn xyr(
        x: impl Into<CellValue>,
        y: impl Into<CellValue>,
        r: impl Into<CellValue>,
    ) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            r: Some(r.into()),
        }
    }
}

impl Serialize for DataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DataValue::Null => serializer.serialize_unit(),
            DataValue::Integer(i) => serializer.serialize_i64(*i),
            DataValue::Float(f) => serialize_number(f, serializer),
            DataValue::Point(p) => p.serialize(serializer),
        }
    }
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(if self.r.is_some() { 3 } else { 2 }))?;
        map.serialize_entry("x", &Coordinate(&self.x))?;
        map.serialize_entry("y", &Coordinate(&self.y))?;
        if let Some(r) = &self.r {
            map.serialize_entry("r", &Coordinate(r))?;
        }
        map.end()
    }
}

struct Coordinate<'a>(&'a CellValue);

impl Serialize for Coordinate<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            CellValue::Float(f) => serialize_number(f, serializer),
            other => other.serialize(serializer),
        }
    }
}

/// Write integral floats as integers and non-finite floats as `null`.
fn serialize_number<S: Serializer>(v: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    match crate::sanitize::narrow(*v) {
        DataValue::Integer(i) => serializer.serialize_i64(i),
        DataValue::Float(f) => serializer.serialize_f64(f),
        _ => serializer.serialize_unit(),
    }
}
