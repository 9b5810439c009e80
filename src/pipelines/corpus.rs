//! Corpus pipeline
//!
//! Runs the file-to-file stages in order, for a language list or every language found:
//!
//! 1. deduplication of `<processed>/<lang>.<source>.jsonl` into `<lang>.dedup.jsonl`,
//! 1. script tagging into `<lang>.dedup.tagged.jsonl`,
//! 1. stratified splitting into `<splits>/{train,dev,test}/<lang>.jsonl`.
//!
//! Every stage appends its summary rows to `<reports>/<stage>_summary.csv`.
//! Each stage can also be run on its own, the pipeline only chains them.
use std::path::Path;

use log::info;

use crate::error::Error;
use crate::processing::{Dedup, DedupSummary, ScriptSummary, ScriptTagger, SplitSummary, Splitter};

use super::Pipeline;

/// Summaries of each stage.
#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    pub dedup: Vec<DedupSummary>,
    pub script: Vec<ScriptSummary>,
    pub split: Vec<SplitSummary>,
}

pub struct CorpusPipeline {
    pub langs: Vec<String>,
    pub dedup: Dedup,
    pub tagger: ScriptTagger,
    pub splitter: Splitter,
}

impl CorpusPipeline {
    /// Stages with their default settings, reading and writing in `processed`,
    /// splitting into `splits` and reporting into `reports`.
    pub fn new(processed: &Path, splits: &Path, reports: &Path) -> Self {
        let mut dedup = Dedup::new(processed, processed);
        dedup.report = Some(reports.join("dedup_summary.csv"));

        let mut tagger = ScriptTagger::new(processed);
        tagger.report = Some(reports.join("script_summary.csv"));

        let mut splitter = Splitter::new(processed, splits);
        splitter.report = Some(reports.join("split_summary.csv"));

        Self {
            langs: Vec::new(),
            dedup,
            tagger,
            splitter,
        }
    }

    pub fn with_langs(mut self, langs: &[String]) -> Self {
        self.langs = langs.to_vec();
        self
    }
}

impl Pipeline<PipelineSummary> for CorpusPipeline {
    fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn run(&self) -> Result<PipelineSummary, Error> {
        info!("corpus pipeline v{}", Self::version());

        let dedup = self.dedup.run(&self.langs)?;
        // later stages only see what was deduplicated in this run
        let langs: Vec<String> = dedup.iter().map(|s| s.lang.clone()).collect();
        if langs.is_empty() {
            info!("nothing was deduplicated, stopping");
            return Ok(PipelineSummary {
                dedup,
                ..Default::default()
            });
        }

        let script = self.tagger.run(&langs)?;
        let split = self.splitter.run(&langs)?;
        info!(
            "done: {} language(s), {} split record(s)",
            langs.len(),
            split.iter().map(|s| s.total).sum::<usize>()
        );

        Ok(PipelineSummary { dedup, script, split })
    }
}
