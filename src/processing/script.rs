/*! Script detection and romanization flags

Each character is assigned its Unicode script property.
`Common` (punctuation, digits, spaces), `Inherited` (combining marks) and unassigned code points are not counted.
The primary script is the most frequent one (ties go to the alphabetically first name),
or `Unknown` when nothing was counted.

A line is flagged as romanized when at least 60% of its counted characters are Latin
while its language is normally written in another script.
!*/
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use unicode_script::{Script, UnicodeScript};

use crate::error::Error;
use crate::io::writer::report;
use crate::io::{Corpus, JsonlWriter, WriterTrait};
use crate::lang::expected_script;
use crate::record::{Record, ScriptTag, TaggedRecord};

/// Share of Latin characters above which a line is considered Latin-majority.
pub const LATIN_MAJORITY: f64 = 0.6;

const JAPANESE_SCRIPTS: [&str; 3] = ["Han", "Hiragana", "Katakana"];

/// Character counts per script name.
pub fn script_counts(text: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for c in text.chars() {
        match c.script() {
            Script::Common | Script::Inherited | Script::Unknown => continue,
            s => *counts.entry(s.full_name().to_string()).or_insert(0) += 1,
        }
    }
    counts
}

/// Tag `text` with its primary script.
pub fn tag(text: &str) -> ScriptTag {
    let counts = script_counts(text);
    let total: usize = counts.values().sum();

    // strict comparison keeps the alphabetically first script on ties
    let mut primary: Option<(&String, usize)> = None;
    for (name, &n) in &counts {
        if primary.map(|(_, best)| n > best).unwrap_or(true) {
            primary = Some((name, n));
        }
    }

    let (primary, primary_ratio) = match primary {
        Some((name, n)) if total > 0 => (name.clone(), round4(n as f64 / total as f64)),
        _ => ("Unknown".to_string(), 0.0),
    };

    ScriptTag {
        primary,
        primary_ratio,
        counts,
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

fn is_latin_majority(tag: &ScriptTag) -> bool {
    tag.primary == "Latin" && tag.primary_ratio >= LATIN_MAJORITY
}

/// Whether a line of `lang` with script `tag` looks romanized.
pub fn is_romanized(lang: &str, tag: &ScriptTag) -> bool {
    if lang == "ja" && JAPANESE_SCRIPTS.contains(&tag.primary.as_str()) {
        return false;
    }
    expected_script(lang) != "Latin" && is_latin_majority(tag)
}

/// Summary row of `reports/script_summary.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptSummary {
    pub lang: String,
    pub lines: usize,
    pub latin_majority: usize,
    pub romanized_est: usize,
}

/// Script tagging stage.
#[derive(Debug, Clone)]
pub struct ScriptTagger {
    pub src: PathBuf,
    pub in_suffix: String,
    pub out_suffix: String,
    pub report: Option<PathBuf>,
}

impl ScriptTagger {
    pub fn new(src: &Path) -> Self {
        Self {
            src: src.to_path_buf(),
            in_suffix: ".dedup.jsonl".to_string(),
            out_suffix: ".dedup.tagged.jsonl".to_string(),
            report: None,
        }
    }

    /// Tag a single language. Returns `None` if its input file is missing.
    pub fn tag_lang(&self, lang: &str) -> Result<Option<ScriptSummary>, Error> {
        let corpus = Corpus::new(&self.src, &self.in_suffix);
        let reader = match corpus.reader::<Record>(lang)? {
            Some(r) => r,
            None => return Ok(None),
        };

        let out_path = self.src.join(format!("{lang}{}", self.out_suffix));
        let mut writer = JsonlWriter::create(&out_path)?;
        let mut summary = ScriptSummary {
            lang: lang.to_string(),
            lines: 0,
            latin_majority: 0,
            romanized_est: 0,
        };

        for record in reader {
            let script = tag(&record.text);
            let romanized = is_romanized(lang, &script);
            summary.lines += 1;
            if is_latin_majority(&script) {
                summary.latin_majority += 1;
            }
            if romanized {
                summary.romanized_est += 1;
            }
            writer.write_single(&TaggedRecord {
                record,
                script,
                is_romanized: romanized,
            })?;
        }
        writer.flush()?;

        info!(
            "[{lang}] lines={} latin_majority={} romanized_est={} -> {:?}",
            summary.lines, summary.latin_majority, summary.romanized_est, out_path
        );
        Ok(Some(summary))
    }

    /// Tag `langs` (or every discovered language if empty), appending summaries to the report.
    pub fn run(&self, langs: &[String]) -> Result<Vec<ScriptSummary>, Error> {
        let corpus = Corpus::new(&self.src, &self.in_suffix);
        let langs = corpus.langs_or(langs)?;
        if langs.is_empty() {
            info!("no input files matching *{} in {:?}", self.in_suffix, self.src);
        }

        let mut summaries = Vec::with_capacity(langs.len());
        for lang in &langs {
            if let Some(summary) = self.tag_lang(lang)? {
                if let Some(report_path) = &self.report {
                    report::append_row(report_path, &summary)?;
                }
                summaries.push(summary);
            }
        }
        Ok(summaries)
    }
}
