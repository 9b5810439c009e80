/*! JSON lines reader.

Blank lines are ignored and malformed lines are skipped (with a debug log),
so that a single broken record never stops a stage.
Files ending in `.gz` or `.bz2` are transparently decompressed.
!*/
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use log::debug;
use serde::de::DeserializeOwned;

use crate::error::Error;

/// Open `path` for buffered reading, decompressing it if it ends in `.gz` or `.bz2`.
pub fn open_compressed(path: &Path) -> Result<Box<dyn BufRead>, Error> {
    let file = File::open(path)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("gz") => Ok(Box::new(BufReader::new(MultiGzDecoder::new(file)))),
        Some("bz2") => Ok(Box::new(BufReader::new(MultiBzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

/// Iterator over the well-formed records of a JSONL file.
pub struct JsonlReader<T> {
    path: PathBuf,
    lines: Lines<Box<dyn BufRead>>,
    line_nb: usize,
    skipped: usize,
    phantom: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: &Path) -> Result<Self, Error> {
        Ok(Self {
            path: path.to_path_buf(),
            lines: open_compressed(path)?.lines(),
            line_nb: 0,
            skipped: 0,
            phantom: PhantomData,
        })
    }

    /// Number of lines skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<T: DeserializeOwned> Iterator for JsonlReader<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            let line = self.lines.next()?;
            self.line_nb += 1;
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    // invalid utf-8 or truncated gzip stream
                    debug!("{:?}:{}: unreadable line: {e}", self.path, self.line_nb);
                    self.skipped += 1;
                    continue;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => return Some(record),
                Err(e) => {
                    debug!("{:?}:{}: malformed record: {e}", self.path, self.line_nb);
                    self.skipped += 1;
                }
            }
        }
    }
}
