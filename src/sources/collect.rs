/*! RAW and CLEAN outputs

Fetchers that keep an untouched copy of what they collected write two files per language:

- RAW: `<prefix>/raw/<code>/<source>.<timestamp>.jsonl`, records as collected,
- CLEAN: `<prefix>/processed/<code>.<source>.jsonl`, normalized and length-filtered, with `len_chars`.
!*/
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::info;
use serde::Serialize;

use crate::error::Error;
use crate::io::{JsonlWriter, WriterTrait};
use crate::processing::Cleaner;
use crate::record::Record;

/// UTC timestamp used in generated file names, e.g. `20240131T120000Z`.
pub fn timestamp() -> String {
    Utc::now().format("%Y%m%dT%H%M%SZ").to_string()
}

/// Path of the processed file of `code` for `source`.
pub fn processed_path(prefix: &Path, code: &str, source: &str) -> PathBuf {
    prefix.join("processed").join(format!("{code}.{source}.jsonl"))
}

/// Normalize and length-filter `records`, setting `len_chars`.
pub fn clean_records(records: &[Record], cleaner: &Cleaner) -> Vec<Record> {
    records
        .iter()
        .filter_map(|r| {
            let text = cleaner.clean(&r.text)?;
            if text.is_empty() {
                return None;
            }
            let mut r = r.clone();
            r.set_extra("len_chars", text.chars().count());
            r.text = text;
            Some(r)
        })
        .collect()
}

/// Write `records` to `path`, returning the number of written records.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<usize, Error> {
    let mut w = JsonlWriter::create(path)?;
    for r in records {
        w.write_single(r)?;
    }
    w.flush()?;
    Ok(w.count())
}

/// Split `records` by project code, codes in order of first appearance.
pub fn group_by_code(records: Vec<Record>) -> Vec<(String, Vec<Record>)> {
    let mut groups: Vec<(String, Vec<Record>)> = Vec::new();
    for r in records {
        match groups.iter_mut().find(|(code, _)| *code == r.code) {
            Some((_, group)) => group.push(r),
            None => groups.push((r.code.clone(), vec![r])),
        }
    }
    groups
}

/// Write the RAW and CLEAN files of `code`/`source`. Returns their paths.
pub fn write_outputs(
    prefix: &Path,
    code: &str,
    source: &str,
    raw: &[Record],
    clean: &[Record],
) -> Result<(PathBuf, PathBuf), Error> {
    let raw_path = prefix
        .join("raw")
        .join(code)
        .join(format!("{source}.{}.jsonl", timestamp()));
    let clean_path = processed_path(prefix, code, source);

    let n_raw = write_records(&raw_path, raw)?;
    let n_clean = write_records(&clean_path, clean)?;

    info!("[{code}:{source}] wrote RAW -> {raw_path:?} ({n_raw} rows)");
    info!("[{code}:{source}] wrote CLEAN -> {clean_path:?} ({n_clean} rows)");
    Ok((raw_path, clean_path))
}
