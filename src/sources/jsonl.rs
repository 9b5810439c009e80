//! Generic JSONL ingestion.
//!
//! Takes any JSON lines file whose objects carry a `text` field
//! and turns it into RAW and CLEAN files for one language and source
//! (see [super::collect]).
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;

use crate::error::Error;
use crate::io::JsonlReader;
use crate::processing::Cleaner;
use crate::record::Record;

use super::collect::{clean_records, write_outputs};

/// Input row. Only `text` is required.
#[derive(Debug, Deserialize)]
struct Row {
    text: Option<String>,
    title: Option<String>,
    url: Option<String>,
    lang: Option<String>,
}

/// Ingestion settings.
#[derive(Debug, Clone)]
pub struct Ingest {
    pub code: String,
    pub source: String,
    pub license: String,
    pub domain: String,
    pub prefix: PathBuf,
    pub cleaner: Cleaner,
}

impl Ingest {
    pub fn new(code: &str, source: &str, license: &str, prefix: &Path) -> Self {
        Self {
            code: code.to_string(),
            source: source.to_string(),
            license: license.to_string(),
            domain: "sentences".to_string(),
            prefix: prefix.to_path_buf(),
            cleaner: Cleaner::default(),
        }
    }

    /// Raw records of `input`, skipping rows without text.
    pub fn read(&self, input: &Path) -> Result<Vec<Record>, Error> {
        let reader: JsonlReader<Row> = JsonlReader::new(input)?;
        let mut records = Vec::new();
        let mut missing = 0;
        for row in reader {
            let text = match row.text {
                Some(t) => t,
                None => {
                    missing += 1;
                    continue;
                }
            };
            let mut r = Record::new(text, &self.code, &self.source)
                .with_domain(&self.domain)
                .with_license(&self.license)
                .with_url(row.url)
                .with_title(row.title);
            if let Some(lang) = row.lang {
                r.lang = lang;
            }
            records.push(r);
        }
        if missing > 0 {
            warn!("[{}] {missing} row(s) without text in {input:?}", self.code);
        }
        Ok(records)
    }

    /// Ingest `input`, returning the RAW and CLEAN paths.
    pub fn run(&self, input: &Path) -> Result<(PathBuf, PathBuf), Error> {
        let raw = self.read(input)?;
        let clean = clean_records(&raw, &self.cleaner);
        info!(
            "[{}] {} raw, {} clean rows from {input:?}",
            self.code,
            raw.len(),
            clean.len()
        );
        write_outputs(&self.prefix, &self.code, &self.source, &raw, &clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jsonl");
        std::fs::write(
            &input,
            concat!(
                r#"{"text":"  toki  pona  ","url":"https://x/1"}"#,
                "\n",
                r#"{"title":"no text"}"#,
                "\n",
                r#"{"text":"mi moku","lang":"tok-Latn"}"#,
                "\n",
                r#"{"text":"   "}"#,
                "\n",
            ),
        )
        .unwrap();

        let ingest = Ingest::new("tok", "tatoeba", "CC-BY-2.0-FR", dir.path());
        let (raw, clean) = ingest.run(&input).unwrap();

        let raw: Vec<Record> = JsonlReader::new(&raw).unwrap().collect();
        assert_eq!(raw.len(), 3);
        assert_eq!(raw[0].text, "  toki  pona  ");
        assert_eq!(raw[1].lang, "tok-Latn");
        assert_eq!(raw[1].code, "tok");

        let clean: Vec<Record> = JsonlReader::new(&clean).unwrap().collect();
        assert_eq!(clean.len(), 2);
        assert_eq!(clean[0].text, "toki pona");
        assert_eq!(clean[0].domain.as_deref(), Some("sentences"));
        assert_eq!(clean[0].url.as_deref(), Some("https://x/1"));
        assert_eq!(clean[1].extra["len_chars"], 7);
    }
}
