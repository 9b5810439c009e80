/*! lidcorpus

Multilingual corpus building and language identification benchmarking.

Sources ([sources]) write per-language JSONL files that go through
deduplication, script tagging and splitting ([processing], chained by [pipelines]).
The [experiment] module benchmarks a language identification model ([identifiers]) on the result.
!*/
pub mod download;
pub mod error;
pub mod experiment;
pub mod filtering;
pub mod identifiers;
pub mod io;
pub mod lang;
pub mod pipelines;
pub mod processing;
pub mod record;
pub mod sources;
