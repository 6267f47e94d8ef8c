use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{IngestError, Result};

/// Raw delimited table with normalized headers.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// 1-based source line of each row, parallel to `rows`.
    pub lines: Vec<usize>,
}

impl CsvTable {
    /// Position of a header, matched after normalization.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = normalize_header(name);
        self.headers.iter().position(|header| *header == wanted)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reading options for delimited input.
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Stop after this many data rows.
    pub max_rows: Option<usize>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            max_rows: None,
        }
    }
}

impl IngestOptions {
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }
}

/// Lowercases a header and collapses inner whitespace.
///
/// Source extracts mix `PATIENT_ID` and `patient_id` spellings, so matching is
/// done on the lowercased form.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    read_csv_table_with_options(path, &IngestOptions::default())
}

pub fn read_csv_table_with_options(path: &Path, options: &IngestOptions) -> Result<CsvTable> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(file);

    let mut headers: Option<Vec<String>> = None;
    let mut table = CsvTable::default();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        if headers.is_none() {
            headers = Some(record.iter().map(normalize_header).collect());
            continue;
        }
        if options.max_rows.is_some_and(|max| table.rows.len() >= max) {
            break;
        }
        let width = headers.as_ref().map_or(0, Vec::len);
        let row = (0..width)
            .map(|idx| record.get(idx).map(normalize_cell).unwrap_or_default())
            .collect();
        let line = record
            .position()
            .map_or(table.rows.len() + 2, |pos| pos.line() as usize);
        table.rows.push(row);
        table.lines.push(line);
    }

    table.headers = headers.ok_or_else(|| IngestError::EmptyCsv {
        path: path.to_path_buf(),
    })?;
    Ok(table)
}
