/*! Experiment inputs

Sentences to classify, grouped by language, come from:

- a JSON map `{lang: [sentence, ...]}` (see [crate::sources::udhr_text]),
- a split directory, reading `<dir>/<split>/<lang>.jsonl`,
- a glossary text file, for a control language with no corpus of its own.
!*/
use std::collections::BTreeMap;
use std::path::Path;

use log::info;

use crate::error::Error;
use crate::io::Corpus;
use crate::record::{Record, SplitLabel};

/// Sentences keyed by language code.
pub type Sentences = BTreeMap<String, Vec<String>>;

/// Substrings marking Klingon text in a glossary line.
pub const GLOSSARY_MARKERS: [&str; 12] = [
    "'", "tlh", "Qapla'", "Hol", "jI", "bI", "Daj", "pu'", "QonoS", "QIt", "yI", "'oH",
];

/// Read a `{lang: [sentences]}` JSON map.
pub fn from_json(path: &Path) -> Result<Sentences, Error> {
    let sentences: Sentences = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    info!("loaded {} languages from {path:?}", sentences.len());
    Ok(sentences)
}

/// Read the `split` partition of a split directory, for `langs` or every language present.
pub fn from_split_dir(dir: &Path, split: SplitLabel, langs: &[String]) -> Result<Sentences, Error> {
    let corpus = Corpus::new(&dir.join(split.as_str()), ".jsonl");
    let mut sentences = BTreeMap::new();
    for lang in corpus.langs_or(langs)? {
        if let Some(reader) = corpus.reader::<Record>(&lang)? {
            let texts: Vec<String> = reader.map(|r| r.text).filter(|t| !t.is_empty()).collect();
            info!("[{lang}] {} {split} sentences", texts.len());
            sentences.insert(lang, texts);
        }
    }
    Ok(sentences)
}

fn has_marker(text: &str) -> bool {
    GLOSSARY_MARKERS.iter().any(|m| text.contains(m))
}

/// Glossary sentences of a single line, if any.
///
/// Lines of the form `left = right` keep whichever side carries a marker, left first.
/// Other lines are kept whole when they carry one.
pub fn glossary_line(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("http") {
        return None;
    }
    if line.contains('=') {
        let mut parts = line.split('=');
        let left = parts.next().unwrap_or_default().trim();
        let right = parts.next().unwrap_or_default().trim();
        if has_marker(left) {
            Some(left)
        } else if has_marker(right) {
            Some(right)
        } else {
            None
        }
    } else if has_marker(line) {
        Some(line)
    } else {
        None
    }
}

/// Read a glossary file as the sentences of `lang`.
pub fn from_glossary(path: &Path, lang: &str) -> Result<Sentences, Error> {
    let content = std::fs::read_to_string(path)?;
    let kept: Vec<String> = content
        .lines()
        .filter_map(glossary_line)
        .map(String::from)
        .collect();
    info!("[{lang}] loaded {} glossary sentences from {path:?}", kept.len());
    Ok(BTreeMap::from([(lang.to_string(), kept)]))
}
