/*! Corpus reading utilities

[JsonlReader] reads one file, [Corpus] finds the per-language files of a stage.
!*/
pub mod corpus;
mod jsonl;

pub use corpus::Corpus;
pub use jsonl::{open_compressed, JsonlReader};
