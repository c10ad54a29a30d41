//! CSV spreadsheets in and out.
//!
//! Inputs are human-edited exports: UTF-8 most of the time, Latin-1 when
//! saved from older spreadsheet software. Outputs are UTF-8 with a BOM so
//! they open cleanly in Excel.

use std::io::Write;
use std::path::Path;

use regulamenta_core::{ColumnMap, ColumnRole, DecreePattern, Law, MatchResult, RegulationRecord};
use tracing::{debug, info, warn};

use crate::StoreError;

const BOM: &str = "\u{feff}";

pub const IDENTIFIED_HEADERS: [&str; 5] = [
    "Capital / Estado",
    "Nome",
    "Decreto (original)",
    "Decreto (número extraído)",
    "Link",
];

pub const MATCH_HEADERS: [&str; 6] = [
    "Arquivo TXT",
    "Caminho TXT",
    "Município (CSV)",
    "Decreto (original)",
    "Decreto (número extraído)",
    "Trecho Encontrado",
];

/// Header row plus data rows, all as owned strings.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Decode file bytes as UTF-8, falling back to Latin-1 (Windows-1252).
///
/// A leading BOM is dropped either way.
pub fn decode_text(bytes: &[u8]) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
            debug!(lossy = had_errors, "decoded as windows-1252");
            decoded.into_owned()
        }
    };
    match text.strip_prefix(BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

pub fn read_table(path: &Path, delimiter: u8) -> Result<Table, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|e| StoreError::io(path, e))?;
    let text = decode_text(&bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(StoreError::NoHeader(path.to_path_buf()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    debug!(path = %path.display(), rows = rows.len(), "read table");
    Ok(Table { headers, rows })
}

/// Write a UTF-8 CSV with BOM, creating parent directories.
pub fn write_table<I, R, S>(path: &Path, headers: &[&str], rows: I) -> Result<usize, StoreError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    let mut file = std::fs::File::create(path).map_err(|e| StoreError::io(path, e))?;
    file.write_all(BOM.as_bytes())
        .map_err(|e| StoreError::io(path, e))?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(headers)?;
    let mut count = 0;
    for row in rows {
        writer.write_record(row)?;
        count += 1;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))?;
    Ok(count)
}

/// Read a survey sheet and map every row to a [`RegulationRecord`].
///
/// Columns are matched once; missing roles are logged and their cells read
/// as empty.
pub fn load_records(
    path: &Path,
    law: Law,
    pattern: DecreePattern,
) -> Result<Vec<RegulationRecord>, StoreError> {
    let table = read_table(path, b',')?;
    let map = ColumnMap::detect(&table.headers);
    let missing = map.missing();
    if !missing.is_empty() {
        let missing: Vec<String> = missing.iter().map(|r| r.to_string()).collect();
        warn!(
            path = %path.display(),
            law = %law,
            missing = %missing.join(", "),
            "expected columns not found"
        );
    }
    Ok(table
        .rows
        .iter()
        .map(|row| map.record(row, law, pattern))
        .collect())
}

/// Write cleaned records in the canonical identified layout.
pub fn write_identified(path: &Path, records: &[RegulationRecord]) -> Result<usize, StoreError> {
    let rows = records.iter().map(|r| {
        [
            r.territory_type.map(|t| t.label()).unwrap_or("").to_string(),
            r.territory.clone(),
            r.regulation_text.clone(),
            r.decree_number.clone().unwrap_or_default(),
            r.source_link.clone().unwrap_or_default(),
        ]
    });
    let count = write_table(path, &IDENTIFIED_HEADERS, rows)?;
    info!(path = %path.display(), rows = count, "wrote identified table");
    Ok(count)
}

/// Read a table written by [`write_identified`].
///
/// The extracted-number column is taken as written; an empty cell stays
/// `None` instead of being derived again.
pub fn read_identified(path: &Path, law: Law) -> Result<Vec<RegulationRecord>, StoreError> {
    let table = read_table(path, b',')?;
    let map = ColumnMap::detect(&table.headers);
    Ok(table
        .rows
        .iter()
        .map(|row| {
            let mut record = map.record(row, law, DecreePattern::DottedOnly);
            record.decree_number = map
                .get(ColumnRole::DecreeNumber)
                .and_then(|i| row.get(i))
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            record
        })
        .collect())
}

pub fn write_matches(path: &Path, matches: &[MatchResult]) -> Result<usize, StoreError> {
    let rows = matches.iter().map(|m| {
        [
            m.txt_file.clone(),
            m.txt_path.display().to_string(),
            m.territory.clone(),
            m.original_value.clone(),
            m.extracted_value.clone(),
            m.outcome.to_string(),
        ]
    });
    let count = write_table(path, &MATCH_HEADERS, rows)?;
    info!(path = %path.display(), rows = count, "wrote match results");
    Ok(count)
}
