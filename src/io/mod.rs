/*!
# IO utilities

Reading and writing of the JSON lines files exchanged between stages,
plus the CSV summary reports every stage appends to.

- [reader] streams records out of (possibly compressed) JSONL files and discovers languages in a directory,
- [writer] writes records back, one file per language or per split.
!*/
mod langfiles;
pub mod reader;
pub mod writer;

pub use langfiles::SplitFiles;
pub use reader::{Corpus, JsonlReader};
pub use writer::{JsonlWriter, WriterTrait};
