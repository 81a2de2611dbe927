// CSV loading into a typed dataset

use crate::data::TabularDataset;
use crate::parser::parse_cell;
use anyhow::{Context, Result};
use std::io::{self, Read};
use std::path::Path;

/// Read a headered CSV from any reader, typing each cell.
///
/// Ragged rows are accepted; short rows are padded with nulls.
pub fn read_dataset<R: Read>(reader: R) -> Result<TabularDataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        // +2: one for the header, one for 1-based numbering
        let record = record.with_context(|| format!("Failed to read CSV row {}", idx + 2))?;
        rows.push(record.iter().map(parse_cell).collect());
    }

    Ok(TabularDataset::new(headers, rows))
}

pub fn read_dataset_from_stdin() -> Result<TabularDataset> {
    read_dataset(io::stdin().lock())
}

pub fn read_dataset_from_path<P: AsRef<Path>>(path: P) -> Result<TabularDataset> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open '{}'", path.display()))?;
    read_dataset(file)
}
