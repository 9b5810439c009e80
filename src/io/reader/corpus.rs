/*! Corpus reader

Per-language files of a stage live side by side in a directory, named `<lang><suffix>`
(`en.dedup.jsonl`, `am.dedup.tagged.jsonl`...).
[Corpus] discovers the languages present and hands out a reader per language.
!*/
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::warn;
use serde::de::DeserializeOwned;

use crate::error::Error;

use super::JsonlReader;

pub struct Corpus {
    dir: PathBuf,
    suffix: String,
}

impl Corpus {
    /// Corpus of files `dir/<lang><suffix>`.
    pub fn new(dir: &Path, suffix: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            suffix: suffix.to_string(),
        }
    }

    /// Path of the file for `lang`.
    pub fn path(&self, lang: &str) -> PathBuf {
        self.dir.join(format!("{lang}{}", self.suffix))
    }

    /// Languages that have a file, sorted.
    ///
    /// The language is the file name up to its first dot.
    pub fn langs(&self) -> Result<Vec<String>, Error> {
        let pattern = self.dir.join(format!("*{}", self.suffix));
        let pattern = pattern
            .to_str()
            .ok_or_else(|| Error::Custom(format!("non utf-8 path: {:?}", self.dir)))?;

        let mut langs = BTreeSet::new();
        for entry in glob::glob(pattern)? {
            let path = entry?;
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if let Some(lang) = name.split('.').next() {
                    if !lang.is_empty() {
                        langs.insert(lang.to_string());
                    }
                }
            }
        }
        Ok(langs.into_iter().collect())
    }

    /// Use `requested` when not empty, discover languages otherwise.
    pub fn langs_or(&self, requested: &[String]) -> Result<Vec<String>, Error> {
        if requested.is_empty() {
            self.langs()
        } else {
            Ok(requested.to_vec())
        }
    }

    /// Reader for `lang`, or `None` (with a warning) if its file is missing.
    pub fn reader<T: DeserializeOwned>(&self, lang: &str) -> Result<Option<JsonlReader<T>>, Error> {
        let path = self.path(lang);
        if !path.exists() {
            warn!("[{lang}] missing {path:?}, skipping");
            return Ok(None);
        }
        JsonlReader::new(&path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    #[test]
    fn discovers_langs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["am.dedup.jsonl", "en.dedup.jsonl", "en.udhr.jsonl", "ka.dedup.tagged.jsonl"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let corpus = Corpus::new(dir.path(), ".dedup.jsonl");
        assert_eq!(corpus.langs().unwrap(), vec!["am", "en"]);

        let requested = vec!["yo".to_string()];
        assert_eq!(corpus.langs_or(&requested).unwrap(), requested);
    }

    #[test]
    fn missing_reader_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = Corpus::new(dir.path(), ".dedup.jsonl");
        let reader = corpus.reader::<Record>("xx").unwrap();
        assert!(reader.is_none());
    }
}
