/*! JSON lines writer.

Files are truncated on creation: every stage rewrites its outputs from scratch,
which keeps re-runs idempotent.
!*/
use std::fs::File;
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::Path;

use serde::Serialize;

use crate::error::Error;

use super::WriterTrait;

pub struct JsonlWriter<T> {
    handle: BufWriter<File>,
    count: usize,
    phantom: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create (or truncate) `path`, creating its parent directories.
    pub fn create(path: &Path) -> Result<Self, Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            handle: BufWriter::new(File::create(path)?),
            count: 0,
            phantom: PhantomData,
        })
    }

    /// Number of records written.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl<T: Serialize> WriterTrait for JsonlWriter<T> {
    type Item = T;

    fn write(&mut self, vals: Vec<T>) -> Result<(), Error> {
        for val in &vals {
            self.write_single(val)?;
        }
        Ok(())
    }

    fn write_single(&mut self, val: &T) -> Result<(), Error> {
        serde_json::to_writer(&mut self.handle, val)?;
        self.handle.write_all(b"\n")?;
        self.count += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        Ok(self.handle.flush()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::JsonlReader;
    use crate::record::Record;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/am.udhr.jsonl");

        let mut w = JsonlWriter::create(&path).unwrap();
        let records = vec![
            Record::new("ሰላም".to_string(), "am", "udhr"),
            Record::new("ሁሉም".to_string(), "am", "udhr"),
        ];
        w.write(records.clone()).unwrap();
        w.flush().unwrap();
        assert_eq!(w.count(), 2);

        // non-ascii is written as is
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("ሰላም"));

        let back: Vec<Record> = JsonlReader::new(&path).unwrap().collect();
        assert_eq!(back, records);
    }
}
