/*! Split-separated writers.

For a given language, [SplitFiles] holds one [JsonlWriter] per [SplitLabel],
writing to `dst/<split>/<lang>.jsonl`.
!*/
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Error;
use crate::record::SplitLabel;

use super::writer::{JsonlWriter, WriterTrait};

pub struct SplitFiles<T> {
    writers: BTreeMap<SplitLabel, JsonlWriter<T>>,
}

impl<T: Serialize> SplitFiles<T> {
    /// Open (and truncate) the three split files of `lang` under `dst`.
    pub fn new(dst: &Path, lang: &str) -> Result<Self, Error> {
        let mut writers = BTreeMap::new();
        for split in SplitLabel::ALL {
            writers.insert(split, JsonlWriter::create(&Self::path(dst, split, lang))?);
        }
        Ok(Self { writers })
    }

    pub fn path(dst: &Path, split: SplitLabel, lang: &str) -> PathBuf {
        dst.join(split.as_str()).join(format!("{lang}.jsonl"))
    }

    pub fn write_single(&mut self, split: SplitLabel, val: &T) -> Result<(), Error> {
        match self.writers.get_mut(&split) {
            Some(w) => w.write_single(val),
            None => Err(Error::Custom(format!("no writer for split {split}"))),
        }
    }

    /// Flush every writer.
    pub fn flush(&mut self) -> Result<(), Error> {
        for w in self.writers.values_mut() {
            w.flush()?;
        }
        Ok(())
    }
}
