/*! UDHR plain-text sentences for major languages

Reads the plain-text UDHR translations (`<dir>/<stem>`, see [UDHR_MAJOR_FILES]),
keeps the first `max_sentences` lines of running text of each
and writes them as a `{language: [sentences]}` JSON map, the input format of the experiment.

Invalid UTF-8 bytes are dropped. Headings and article numbers are filtered out by [UdhrBoilerplate].
!*/
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::Error;
use crate::filtering::{Filter, UdhrBoilerplate};
use crate::lang::UDHR_MAJOR_FILES;

pub const DEFAULT_OUTPUT: &str = "udhr_major_languages_sentences_extended.json";

/// Running-text lines of `content`, at most `max_sentences`.
pub fn extract_sentences(content: &str, max_sentences: usize) -> Vec<String> {
    let filter = UdhrBoilerplate::default();
    content
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| filter.detect(line.as_str()))
        .take(max_sentences)
        .collect()
}

/// Extraction settings.
#[derive(Debug, Clone)]
pub struct UdhrText {
    pub dir: PathBuf,
    pub max_sentences: usize,
}

impl UdhrText {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            max_sentences: 50,
        }
    }

    /// Sentences of one file. Missing files are logged and yield `None`.
    pub fn file_sentences(&self, stem: &str) -> Result<Option<Vec<String>>, Error> {
        let path = self.dir.join(stem);
        if !path.exists() {
            warn!("file not found: {path:?}");
            return Ok(None);
        }
        let bytes = std::fs::read(&path)?;
        let content: String = String::from_utf8_lossy(&bytes)
            .chars()
            .filter(|c| *c != char::REPLACEMENT_CHARACTER)
            .collect();
        Ok(Some(extract_sentences(&content, self.max_sentences)))
    }

    /// Sentences of every major language that has at least one.
    pub fn extract(&self) -> Result<BTreeMap<String, Vec<String>>, Error> {
        let mut all = BTreeMap::new();
        for (name, stem) in UDHR_MAJOR_FILES.iter() {
            match self.file_sentences(stem)? {
                Some(sentences) if !sentences.is_empty() => {
                    info!("[{name}] extracted {} sentences", sentences.len());
                    all.insert(name.to_string(), sentences);
                }
                Some(_) => warn!("[{name}] no sentences extracted"),
                None => (),
            }
        }
        Ok(all)
    }

    /// Extract and write the JSON map to `output`.
    pub fn run(&self, output: &Path) -> Result<BTreeMap<String, usize>, Error> {
        let all = self.extract()?;
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output, serde_json::to_string_pretty(&all)?)?;
        info!("sentences for {} languages saved to {output:?}", all.len());
        Ok(all.into_iter().map(|(k, v)| (k, v.len())).collect())
    }
}
