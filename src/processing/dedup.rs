/*! Deduplication

Per language, across sources (`<lang>.<source>.jsonl`, in source order):

- exact duplicates are found with [runiq](https://github.com/whitfin/runiq)'s digest filter over
  normalized text (NFC, collapsed whitespace),
- near duplicates (optional) with character n-gram Jaccard similarity, see [NearDuplicate].

The first occurrence is kept, later ones are dropped.
Kept records carry the normalized text and `trace.dedup = "kept"`.
!*/
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::info;
use runiq::filters::Filter as RuniqFilter;
use serde::Serialize;

use crate::error::Error;
use crate::filtering::{FilterMut, NearDuplicate};
use crate::io::writer::report;
use crate::io::{Corpus, JsonlWriter, WriterTrait};
use crate::processing::normalize::collapse_whitespace;
use crate::record::Record;

/// Summary row of `reports/dedup_summary.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DedupSummary {
    pub lang: String,
    pub input_total: usize,
    pub kept: usize,
    pub exact_dups: usize,
    pub near_dups: usize,
    /// Comma-separated source order.
    pub sources: String,
}

/// Deduplicates a stream of records, keeping track of what was seen.
pub struct Deduplicator {
    exact: runiq::filters::DigestFilter,
    near: Option<NearDuplicate>,
    pub input_total: usize,
    pub exact_dups: usize,
    pub near_dups: usize,
}

impl Deduplicator {
    /// `near` enables near-duplicate detection.
    pub fn new(near: Option<NearDuplicate>) -> Self {
        Self {
            exact: runiq::filters::DigestFilter::default(),
            near,
            input_total: 0,
            exact_dups: 0,
            near_dups: 0,
        }
    }

    /// Normalize the record and return it if it is the first of its kind.
    pub fn keep(&mut self, mut record: Record) -> Option<Record> {
        self.input_total += 1;
        let text = collapse_whitespace(&record.text);
        if text.is_empty() {
            return None;
        }

        // near duplicates stay in the digest filter:
        // their exact repeats are counted as exact duplicates.
        if self.exact.detect(text.as_bytes()) {
            if let Some(near) = &mut self.near {
                if !near.detect_mut(&text) {
                    self.near_dups += 1;
                    return None;
                }
            }
        } else {
            self.exact_dups += 1;
            return None;
        }

        record.text = text;
        record.trace("dedup", "kept");
        Some(record)
    }
}

/// Deduplication stage.
#[derive(Debug, Clone)]
pub struct Dedup {
    pub src: PathBuf,
    pub dst: PathBuf,
    pub sources: Vec<String>,
    pub near_dup: bool,
    pub ngram: usize,
    pub threshold: f64,
    pub report: Option<PathBuf>,
}

impl Dedup {
    /// Default settings: wikipedia, tatoeba then udhr, exact duplicates only.
    pub fn new(src: &Path, dst: &Path) -> Self {
        Self {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            sources: ["wikipedia", "tatoeba", "udhr"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            near_dup: false,
            ngram: 5,
            threshold: 0.85,
            report: None,
        }
    }

    fn corpus(&self, source: &str) -> Corpus {
        Corpus::new(&self.src, &format!(".{source}.jsonl"))
    }

    /// Languages having a file for at least one source.
    pub fn discover_langs(&self) -> Result<Vec<String>, Error> {
        let mut langs = BTreeSet::new();
        for source in &self.sources {
            langs.extend(self.corpus(source).langs()?);
        }
        Ok(langs.into_iter().collect())
    }

    pub fn output_path(&self, lang: &str) -> PathBuf {
        self.dst.join(format!("{lang}.dedup.jsonl"))
    }

    /// Deduplicate a single language. Returns `None` if no source file exists.
    pub fn dedup_lang(&self, lang: &str) -> Result<Option<DedupSummary>, Error> {
        let inputs: Vec<PathBuf> = self
            .sources
            .iter()
            .map(|source| self.corpus(source).path(lang))
            .filter(|p| p.exists())
            .collect();
        if inputs.is_empty() {
            info!("[{lang}] no input files, skipping");
            return Ok(None);
        }

        let near = if self.near_dup {
            Some(NearDuplicate::new(self.ngram, self.threshold)?)
        } else {
            None
        };
        let mut dedup = Deduplicator::new(near);

        let out_path = self.output_path(lang);
        let mut writer = JsonlWriter::create(&out_path)?;
        for input in &inputs {
            for record in crate::io::JsonlReader::<Record>::new(input)? {
                if let Some(kept) = dedup.keep(record) {
                    writer.write_single(&kept)?;
                }
            }
        }
        writer.flush()?;

        let summary = DedupSummary {
            lang: lang.to_string(),
            input_total: dedup.input_total,
            kept: writer.count(),
            exact_dups: dedup.exact_dups,
            near_dups: dedup.near_dups,
            sources: self.sources.join(","),
        };
        info!(
            "[{lang}] input={} kept={} exact_dups={} near_dups={} -> {:?}",
            summary.input_total, summary.kept, summary.exact_dups, summary.near_dups, out_path
        );
        Ok(Some(summary))
    }

    /// Deduplicate `langs` (or every discovered language if empty).
    pub fn run(&self, langs: &[String]) -> Result<Vec<DedupSummary>, Error> {
        let langs = if langs.is_empty() {
            self.discover_langs()?
        } else {
            langs.to_vec()
        };
        if langs.is_empty() {
            info!("no languages discovered in {:?}, nothing to do", self.src);
        }

        let mut summaries = Vec::with_capacity(langs.len());
        for lang in &langs {
            if let Some(summary) = self.dedup_lang(lang)? {
                if let Some(report_path) = &self.report {
                    report::append_row(report_path, &summary)?;
                }
                summaries.push(summary);
            }
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::JsonlReader;

    fn rec(text: &str, source: &str) -> Record {
        Record::new(text.to_string(), "en", source)
    }

    #[test]
    fn exact_duplicates() {
        let mut d = Deduplicator::new(None);
        let kept: Vec<Record> = vec![
            rec("hello  world", "wikipedia"),
            rec("hello world", "tatoeba"),
            rec("", "tatoeba"),
            rec("goodbye", "udhr"),
        ]
        .into_iter()
        .filter_map(|r| d.keep(r))
        .collect();

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].text, "hello world");
        assert_eq!(kept[0].source.as_deref(), Some("wikipedia"));
        assert_eq!(kept[0].extra["trace"]["dedup"], "kept");
        assert_eq!(d.input_total, 4);
        assert_eq!(d.exact_dups, 1);
        assert_eq!(d.near_dups, 0);
    }

    #[test]
    fn near_duplicates() {
        let mut d = Deduplicator::new(Some(NearDuplicate::new(5, 0.85).unwrap()));
        let kept: Vec<Record> = vec![
            rec("All human beings are born free and equal in dignity and rights.", "udhr"),
            rec("All human beings are born free and equal in dignity and rights!", "udhr"),
            rec("Everyone has the right to life, liberty and security of person.", "udhr"),
        ]
        .into_iter()
        .filter_map(|r| d.keep(r))
        .collect();

        assert_eq!(kept.len(), 2);
        assert_eq!(d.near_dups, 1);
        assert_eq!(d.exact_dups, 0);
    }

    #[test]
    fn idempotent() {
        let records = vec![
            rec("a cat sat on the mat today", "wikipedia"),
            rec("a cat sat on the mat today.", "tatoeba"),
            rec("a  cat sat on the mat today", "tatoeba"),
            rec("dogs bark at night in the village", "udhr"),
        ];
        let mut first = Deduplicator::new(Some(NearDuplicate::new(5, 0.85).unwrap()));
        let once: Vec<Record> = records.into_iter().filter_map(|r| first.keep(r)).collect();

        let mut second = Deduplicator::new(Some(NearDuplicate::new(5, 0.85).unwrap()));
        let twice: Vec<Record> = once.clone().into_iter().filter_map(|r| second.keep(r)).collect();

        assert_eq!(once, twice);
        assert_eq!(second.exact_dups + second.near_dups, 0);
    }

    #[test]
    fn dedup_lang_across_sources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("yo.tatoeba.jsonl"),
            "{\"text\":\"Bawo ni\",\"lang\":\"yo\",\"code\":\"yo\",\"source\":\"tatoeba\"}\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("yo.udhr.jsonl"),
            "{\"text\":\"Bawo  ni\",\"lang\":\"yo\",\"code\":\"yo\",\"source\":\"udhr\"}\n{\"text\":\"E kaaro\",\"lang\":\"yo\",\"code\":\"yo\",\"source\":\"udhr\"}\n",
        )
        .unwrap();

        let mut dedup = Dedup::new(dir.path(), dir.path());
        dedup.report = Some(dir.path().join("reports/dedup_summary.csv"));
        let summaries = dedup.run(&[]).unwrap();

        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!((s.input_total, s.kept, s.exact_dups), (3, 2, 1));
        assert_eq!(s.sources, "wikipedia,tatoeba,udhr");

        let kept: Vec<Record> = JsonlReader::new(&dedup.output_path("yo")).unwrap().collect();
        assert_eq!(kept[0].source.as_deref(), Some("tatoeba"));
        assert_eq!(kept[1].text, "E kaaro");

        let report = std::fs::read_to_string(dir.path().join("reports/dedup_summary.csv")).unwrap();
        assert!(report.starts_with("lang,input_total,kept,exact_dups,near_dups,sources\n"));
    }

    #[test]
    fn invalid_near_dup_settings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("yo.tatoeba.jsonl"),
            "{\"text\":\"E kaaro\",\"lang\":\"yo\",\"code\":\"yo\",\"source\":\"tatoeba\"}\n",
        )
        .unwrap();

        let mut dedup = Dedup::new(dir.path(), dir.path());
        dedup.near_dup = true;
        dedup.threshold = 0.0;
        assert!(dedup.run(&[]).is_err());

        dedup.threshold = 0.85;
        dedup.ngram = 0;
        assert!(dedup.run(&[]).is_err());
        assert!(!dedup.output_path("yo").exists());
    }

    #[test]
    fn no_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let dedup = Dedup::new(dir.path(), dir.path());
        assert!(dedup.dedup_lang("xx").unwrap().is_none());
        assert!(!dedup.output_path("xx").exists());
    }
}
