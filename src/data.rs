use crate::error::{ChartError, Result as ChartResult};
use crate::sanitize::sanitize_json;
use crate::value::CellValue;
use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A fully materialized sheet: ordered column names and typed rows.
///
/// Every row holds exactly one value per header, in header order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabularDataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Column listing plus JSON records, as shown when a sheet is opened.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetPreview {
    pub columns: Vec<String>,
    pub data: Vec<Value>,
    pub row_count: usize,
}

impl TabularDataset {
    /// Build a dataset, padding short rows with nulls and truncating long ones.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Create a dataset from a JSON array of objects.
    ///
    /// Column order follows the keys of the first object; keys missing from
    /// later objects become null.
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        let Some(first) = array.first() else {
            return Ok(Self::default());
        };

        let first_obj = first
            .as_object()
            .ok_or_else(|| anyhow!("Items in array must be objects"))?;
        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::with_capacity(array.len());
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;

            let mut row = Vec::with_capacity(headers.len());
            for header in &headers {
                let cell = match obj.get(header) {
                    None => CellValue::Null,
                    Some(v) => CellValue::from_json(v).ok_or_else(|| {
                        anyhow!("Unsupported value type for field '{}'", header)
                    })?,
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, or `InvalidColumn`.
    pub fn column_index(&self, name: &str) -> ChartResult<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ChartError::InvalidColumn(name.to_string()))
    }

    /// Rows `[start, end)`, clamped to the dataset bounds.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.rows.len());
        let start = start.min(end);
        Self {
            headers: self.headers.clone(),
            rows: self.rows[start..end].to_vec(),
        }
    }

    /// Keep the rows for which `keep` returns true.
    pub fn retain_rows<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        Self {
            headers: self.headers.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Distinct non-null values of column `idx`, in order of first appearance.
    pub fn distinct_values(&self, idx: usize) -> Vec<CellValue> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|row| &row[idx])
            .filter(|cell| cell.key().is_some_and(|k| seen.insert(k)))
            .cloned()
            .collect()
    }

    /// One JSON object per row, sanitized for the wire.
    pub fn records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let obj: Map<String, Value> = self
                    .headers
                    .iter()
                    .zip(row)
                    .map(|(h, cell)| (h.clone(), cell.to_json()))
                    .collect();
                sanitize_json(Value::Object(obj))
            })
            .collect()
    }

    /// Column names, the first `limit` records (all when `None`) and the total row count.
    pub fn preview(&self, limit: Option<usize>) -> SheetPreview {
        let mut data = self.records();
        if let Some(limit) = limit {
            data.truncate(limit);
        }
        SheetPreview {
            columns: self.headers.clone(),
            data,
            row_count: self.rows.len(),
        }
    }
}
