// Row-range slicing and equality filters

use crate::data::TabularDataset;
use crate::error::Result;
use crate::value::CellValue;
use log::debug;

/// Row bounds in spreadsheet numbering: row 1 is the header, so the first
/// data row is row 2. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowRange {
    pub start_row: Option<i64>,
    pub end_row: Option<i64>,
}

impl RowRange {
    pub fn new(start_row: Option<i64>, end_row: Option<i64>) -> Self {
        Self { start_row, end_row }
    }

    /// Half-open 0-indexed slice `[start, end)` over a dataset of `len` rows.
    ///
    /// `start = max(0, start_row - 2)` for a positive start row, else 0.
    /// `end = end_row - 1` for a positive end row, else `len`.
    /// Both are clamped to `len`; a start past the end selects nothing.
    pub fn bounds(&self, len: usize) -> (usize, usize) {
        let start = match self.start_row {
            Some(s) if s > 0 => (s - 2).max(0) as usize,
            _ => 0,
        };
        let end = match self.end_row {
            Some(e) if e > 0 => ((e - 1) as usize).min(len),
            _ => len,
        };
        (start.min(end), end)
    }

    pub fn apply(&self, dataset: &TabularDataset) -> TabularDataset {
        let (start, end) = self.bounds(dataset.len());
        dataset.slice(start, end)
    }
}

/// Keep rows whose `column` equals `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualityFilter {
    pub column: String,
    pub value: CellValue,
}

impl EqualityFilter {
    /// A filter is only active with a column name and a truthy value.
    ///
    /// Blank cells, `false` and numeric zero all count as "no filter".
    pub fn new(column: Option<String>, value: Option<CellValue>) -> Option<Self> {
        let column = column.filter(|c| !c.is_empty())?;
        let value = value.filter(is_truthy)?;
        Some(Self { column, value })
    }

    /// Rows where the column matches the value; null cells never match.
    pub fn apply(&self, dataset: &TabularDataset) -> Result<TabularDataset> {
        let idx = dataset.column_index(&self.column)?;
        let filtered = dataset.retain_rows(|row| row[idx].matches(&self.value));
        debug!(
            "Filter {} == {}: {} of {} rows kept",
            self.column,
            self.value,
            filtered.len(),
            dataset.len()
        );
        Ok(filtered)
    }
}

fn is_truthy(value: &CellValue) -> bool {
    match value {
        CellValue::Bool(b) => *b,
        CellValue::Integer(i) => *i != 0,
        CellValue::Float(f) => *f != 0.0 && !f.is_nan(),
        other => !other.is_blank(),
    }
}

/// Slice to the row range, then apply the main filter.
///
/// The filter column is checked before any work so an unknown column never
/// yields a partial result.
pub fn filter_rows(
    dataset: &TabularDataset,
    range: &RowRange,
    main_filter: Option<&EqualityFilter>,
) -> Result<TabularDataset> {
    if let Some(f) = main_filter {
        dataset.column_index(&f.column)?;
    }

    let sliced = range.apply(dataset);
    debug!("Row range {:?} kept {} of {} rows", range, sliced.len(), dataset.len());

    match main_filter {
        Some(f) => f.apply(&sliced),
        None => Ok(sliced),
    }
}

/// Distinct non-null values of a column, in order of first appearance.
pub fn distinct_values(dataset: &TabularDataset, column: &str) -> Result<Vec<CellValue>> {
    let idx = dataset.column_index(column)?;
    Ok(dataset.distinct_values(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChartError;

    fn numbered(n: i64) -> TabularDataset {
        TabularDataset::new(
            vec!["n".into(), "kind".into()],
            (0..n)
                .map(|i| {
                    let kind = if i % 2 == 0 { "even" } else { "odd" };
                    vec![CellValue::Integer(i), kind.into()]
                })
                .collect(),
        )
    }

    #[test]
    fn test_range_from_first_data_row() {
        assert_eq!(RowRange::new(Some(2), None).bounds(20), (0, 20));
        assert_eq!(RowRange::new(Some(1), None).bounds(20), (0, 20));
        assert_eq!(RowRange::new(None, None).bounds(20), (0, 20));
        assert_eq!(RowRange::new(Some(0), None).bounds(20), (0, 20));
    }

    #[test]
    fn test_range_five_to_ten() {
        assert_eq!(RowRange::new(Some(5), Some(10)).bounds(20), (3, 9));
        let rows = RowRange::new(Some(5), Some(10)).apply(&numbered(20));
        let values: Vec<_> = rows.rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(values, (3..9).map(CellValue::Integer).collect::<Vec<_>>());
    }

    #[test]
    fn test_range_clamps_to_dataset() {
        assert_eq!(RowRange::new(Some(5), Some(100)).bounds(6), (3, 6));
        assert_eq!(RowRange::new(Some(50), None).bounds(6), (6, 6));
        assert_eq!(RowRange::new(Some(8), Some(4)).bounds(20), (3, 3));
        assert_eq!(RowRange::new(None, Some(0)).bounds(6), (0, 6));
    }

    #[test]
    fn test_filter_rows_with_main_filter() {
        let f = EqualityFilter::new(Some("kind".into()), Some("odd".into())).unwrap();
        let out = filter_rows(&numbered(10), &RowRange::new(Some(2), Some(7)), Some(&f)).unwrap();
        let values: Vec<_> = out.rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(
            values,
            vec![CellValue::Integer(1), CellValue::Integer(3), CellValue::Integer(5)]
        );
    }

    #[test]
    fn test_numeric_filter_matches_across_int_and_float() {
        let f = EqualityFilter::new(Some("n".into()), Some(CellValue::Float(4.0))).unwrap();
        let out = f.apply(&numbered(10)).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_filter_excludes_nulls() {
        let data = TabularDataset::new(
            vec!["c".into()],
            vec![vec![CellValue::Null], vec!["x".into()]],
        );
        let f = EqualityFilter::new(Some("c".into()), Some("x".into())).unwrap();
        assert_eq!(f.apply(&data).unwrap().len(), 1);
    }

    #[test]
    fn test_inactive_filters() {
        assert!(EqualityFilter::new(None, Some("x".into())).is_none());
        assert!(EqualityFilter::new(Some("c".into()), None).is_none());
        assert!(EqualityFilter::new(Some("c".into()), Some("".into())).is_none());
        assert!(EqualityFilter::new(Some("".into()), Some("x".into())).is_none());
        assert!(EqualityFilter::new(Some("c".into()), Some(CellValue::Null)).is_none());
    }

    #[test]
    fn test_falsy_values_leave_filter_inactive() {
        let column = || Some("n".to_string());
        assert!(EqualityFilter::new(column(), Some(CellValue::Integer(0))).is_none());
        assert!(EqualityFilter::new(column(), Some(CellValue::Float(0.0))).is_none());
        assert!(EqualityFilter::new(column(), Some(CellValue::Bool(false))).is_none());

        assert!(EqualityFilter::new(column(), Some(CellValue::Integer(-1))).is_some());
        assert!(EqualityFilter::new(column(), Some(CellValue::Bool(true))).is_some());
        assert!(EqualityFilter::new(column(), Some("0".into())).is_some());
    }

    #[test]
    fn test_unknown_filter_column() {
        let f = EqualityFilter::new(Some("missing".into()), Some("x".into())).unwrap();
        let err = filter_rows(&numbered(3), &RowRange::default(), Some(&f)).unwrap_err();
        assert!(matches!(err, ChartError::InvalidColumn(_)));
    }

    #[test]
    fn test_distinct_values_in_appearance_order() {
        let values = distinct_values(&numbered(5), "kind").unwrap();
        assert_eq!(values, vec![CellValue::text("even"), CellValue::text("odd")]);
        assert!(distinct_values(&numbered(5), "nope").is_err());
    }
}
