/*!
# JSONL and report writing

[JsonlWriter] writes serializable records one per line, creating parent directories as needed.
[report] appends summary rows to CSV files shared by every run of a stage.
!*/
mod writer_jsonl;
mod writertrait;
pub mod report;

pub use writer_jsonl::JsonlWriter;
pub use writertrait::WriterTrait;
