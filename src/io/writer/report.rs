//! CSV summary reports.
//!
//! Every run of a stage appends one row per language.
//! The header is written only when the file is new (or empty).
use std::fs::OpenOptions;
use std::path::Path;

use serde::Serialize;

use crate::error::Error;

/// Append `rows` to the CSV file at `path`.
pub fn append_rows<R: Serialize>(path: &Path, rows: &[R]) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let is_new = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Append a single row.
pub fn append_row<R: Serialize>(path: &Path, row: &R) -> Result<(), Error> {
    append_rows(path, std::slice::from_ref(row))
}
