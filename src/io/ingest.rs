//! Batch CSV ingest.
//!
//! Turns a CSV of walls into validated `WallParameters`, one per row.
//!
//! - **Strict schema** for the required columns (clear errors + exit code 2)
//! - **Row-level validation**: bad rows are skipped and reported, not fatal
//! - Header names are case-insensitive and tolerate a UTF-8 BOM

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{PARAMETER_NAMES, SectionType, WallParameters, parse_parameter};
use crate::error::AppError;

/// Column holding the row identifier.
pub const ID_COLUMN: &str = "id";
/// Column holding the section label.
pub const SECTION_COLUMN: &str = "section_type";

/// One wall read from the batch file.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    pub line: usize,
    pub id: String,
    pub params: WallParameters,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: valid rows plus what was skipped.
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub rows: Vec<BatchRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a batch CSV from disk.
pub fn load_batch_csv(path: &Path) -> Result<BatchInput, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let input = read_batch_csv(file)?;
    tracing::info!(
        "Read {} rows from '{}' ({} skipped)",
        input.rows_read,
        path.display(),
        input.row_errors.len()
    );
    Ok(input)
}

/// Parse a batch CSV from any reader.
pub fn read_batch_csv<R: Read>(source: R) -> Result<BatchInput, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header line, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let id = get_optional(&record, &header_map, ID_COLUMN).map(str::to_string);
        match parse_row(&record, &header_map) {
            Ok(params) => rows.push(BatchRow {
                line,
                id: id.unwrap_or_else(|| format!("row{line}")),
                params,
            }),
            Err(message) => row_errors.push(RowError { line, id, message }),
        }
    }

    if rows.is_empty() {
        return Err(AppError::new(2, "No valid rows in the batch CSV."));
    }

    Ok(BatchInput {
        rows,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = PARAMETER_NAMES
        .iter()
        .copied()
        .chain([SECTION_COLUMN])
        .filter(|name| !header_map.contains_key(*name))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    let list = missing.iter().map(|m| format!("`{m}`")).collect::<Vec<_>>().join(", ");
    Err(AppError::new(2, format!("Missing required column(s): {list}")))
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<WallParameters, String> {
    let mut values = [0.0; 9];
    for (slot, name) in values.iter_mut().zip(PARAMETER_NAMES) {
        let text = get_required(record, header_map, name)?;
        *slot = parse_parameter(name, text).map_err(|e| e.to_string())?;
    }
    let section: SectionType = get_required(record, header_map, SECTION_COLUMN)?
        .parse()
        .map_err(|e: AppError| e.to_string())?;
    Ok(WallParameters::from_scalars(values, section))
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    get_optional(record, header_map, name).ok_or_else(|| format!("Missing value for `{name}`."))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = *header_map.get(name)?;
    record.get(idx).filter(|s| !s.is_empty())
}
