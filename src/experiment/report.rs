/*! Comprehensive report

Merges the results of several experiments (later files win on shared codes),
attaches display names and categories, and computes per-category accuracy statistics.
!*/
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use log::{info, warn};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;

use super::runner::LangResults;
use super::stats::{mean, median, ranked, ExperimentResults, LanguageStats};

/// Read a `{code: string}` JSON map, or an empty one (with a warning) if the file is missing.
pub fn load_map(path: &Path) -> Result<BTreeMap<String, String>, Error> {
    if !path.exists() {
        warn!("{path:?} not found, using defaults");
        return Ok(BTreeMap::new());
    }
    Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}

/// `Low-resource` -> `low_resource`
fn slug(category: &str) -> String {
    category.to_lowercase().replace(['-', ' '], "_")
}

/// Accuracy distribution of a category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl CategoryStats {
    fn of(accuracies: &[f64]) -> Self {
        Self {
            count: accuracies.len(),
            mean: mean(accuracies),
            median: median(accuracies),
            min: accuracies.iter().copied().fold(f64::INFINITY, f64::min),
            max: accuracies.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Content of `comprehensive_results.json`.
#[derive(Debug, Clone, Serialize)]
pub struct Comprehensive {
    pub all_results: BTreeMap<String, LangResults>,
    pub all_stats: BTreeMap<String, LanguageStats>,
    pub language_names: BTreeMap<String, String>,
    pub language_categories: BTreeMap<String, String>,
    /// `total_languages`, then `<category>_count` and `<category>_avg_accuracy` per category.
    pub summary: Map<String, Value>,
}

impl Comprehensive {
    /// Merge `experiments` in order.
    pub fn merge(
        experiments: Vec<ExperimentResults>,
        language_names: BTreeMap<String, String>,
        language_categories: BTreeMap<String, String>,
    ) -> Self {
        let mut all_results = BTreeMap::new();
        let mut all_stats = BTreeMap::new();
        for e in experiments {
            all_results.extend(e.results);
            all_stats.extend(e.language_stats);
        }

        let mut report = Self {
            all_results,
            all_stats,
            language_names,
            language_categories,
            summary: Map::new(),
        };
        report.summary = report.summary_map();
        report
    }

    /// Load and merge result files. Missing files are skipped, but at least one is required.
    pub fn from_files(
        results: &[impl AsRef<Path>],
        names: &Path,
        categories: &Path,
    ) -> Result<Self, Error> {
        let mut experiments = Vec::new();
        for path in results {
            let path = path.as_ref();
            if !path.exists() {
                warn!("{path:?} not found, run the experiment first");
                continue;
            }
            experiments.push(ExperimentResults::load(path)?);
        }
        if experiments.is_empty() {
            return Err(Error::Custom("no experiment results to report on".to_string()));
        }
        Ok(Self::merge(experiments, load_map(names)?, load_map(categories)?))
    }

    pub fn category(&self, code: &str) -> &str {
        self.language_categories
            .get(code)
            .map(String::as_str)
            .unwrap_or("Unknown")
    }

    /// Stats of every category present in the categories map, sorted by name.
    pub fn categories(&self) -> BTreeMap<String, CategoryStats> {
        let mut accuracies: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (code, stats) in &self.all_stats {
            if let Some(category) = self.language_categories.get(code) {
                accuracies.entry(category.clone()).or_default().push(stats.accuracy);
            }
        }
        accuracies
            .into_iter()
            .map(|(category, acc)| (category, CategoryStats::of(&acc)))
            .collect()
    }

    fn summary_map(&self) -> Map<String, Value> {
        let mut summary = Map::new();
        summary.insert("total_languages".to_string(), self.all_stats.len().into());
        for (category, stats) in self.categories() {
            let slug = slug(&category);
            summary.insert(format!("{slug}_count"), stats.count.into());
            summary.insert(format!("{slug}_avg_accuracy"), stats.mean.into());
        }
        summary
    }

    /// Ranked table of all languages followed by per-category statistics.
    pub fn table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n=== COMPREHENSIVE ACCURACY TABLE (ALL LANGUAGES) ===");
        let _ = writeln!(
            out,
            "{:<4} {:<20} {:<10} {:<12} {:<10} {:<15}",
            "Rank", "Language", "Code", "Category", "Accuracy", "Correct/Total"
        );
        let _ = writeln!(out, "{}", "-".repeat(85));
        for (rank, (code, s)) in ranked(&self.all_stats).into_iter().enumerate() {
            let name = self.language_names.get(code).unwrap_or(code);
            let _ = writeln!(
                out,
                "{:<4} {:<20} {:<10} {:<12} {:>6.1}%    {:>3}/{:<3}",
                rank + 1,
                name,
                code,
                self.category(code),
                s.accuracy,
                s.correct_predictions,
                s.total_sentences
            );
        }

        let categories = self.categories();
        let _ = writeln!(out, "\n=== SUMMARY STATISTICS ===");
        let _ = writeln!(out, "Total languages tested: {}", self.all_stats.len());
        for (category, stats) in &categories {
            let _ = writeln!(out, "{category} languages: {}", stats.count);
        }
        for (category, stats) in &categories {
            let _ = writeln!(out, "\n{category} languages:");
            let _ = writeln!(out, "  Average accuracy: {:.1}%", stats.mean);
            let _ = writeln!(out, "  Median accuracy: {:.1}%", stats.median);
            let _ = writeln!(out, "  Min accuracy: {:.1}%", stats.min);
            let _ = writeln!(out, "  Max accuracy: {:.1}%", stats.max);
        }
        out
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("comprehensive results saved to {path:?}");
        Ok(())
    }
}
