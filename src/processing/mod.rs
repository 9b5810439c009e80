/*! Content processing

Stages that turn fetched per-source files into a split corpus:

1. [dedup]: merge the sources of a language, dropping exact and near duplicates,
2. [script]: tag each line with its script and flag romanized text,
3. [split]: stratified train/dev/test split.

[normalize] holds the text normalization every fetcher applies before writing.
!*/
pub mod dedup;
pub mod normalize;
pub mod script;
pub mod split;

pub use dedup::{Dedup, DedupSummary};
pub use normalize::{normalize_text, Cleaner, NormalizationForm};
pub use script::{ScriptSummary, ScriptTagger};
pub use split::{Ratios, SplitSummary, Splitter};
