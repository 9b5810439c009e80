/*! Language identification benchmark

Runs a pretrained classifier over held-out sentences and reports per-language accuracy.

- [sentences] loads the inputs,
- [runner] classifies them,
- [stats] aggregates and prints the results,
- [report] merges several runs into a comprehensive report.
!*/
use std::path::Path;

use crate::error::Error;
use crate::identifiers::Predict;

pub mod report;
pub mod runner;
pub mod sentences;
pub mod stats;

pub use report::Comprehensive;
pub use runner::{Experiment, LangResults};
pub use sentences::Sentences;
pub use stats::{accuracy_table, ExperimentResults, LanguageStats, Summary};

impl Experiment {
    /// Classify `sentences`, print the accuracy table under `title` and save results to `output`.
    pub fn run<P: Predict>(
        &self,
        model: &P,
        sentences: &Sentences,
        title: &str,
        output: &Path,
    ) -> Result<ExperimentResults, Error> {
        let results = ExperimentResults::new(self.classify(model, sentences));
        println!("{}", accuracy_table(&results.language_stats, title));
        results.save(output)?;
        Ok(results)
    }
}
