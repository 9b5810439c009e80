/*! Statistics over classification results

[LanguageStats] summarizes a language's [LangResults], [Summary] the whole experiment.
Accuracies and rates are percentages.
!*/
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Error;

use super::runner::LangResults;

/// Number of misclassifications listed per language.
const TOP_MISCLASSIFICATIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageStats {
    pub total_sentences: usize,
    pub correct_predictions: usize,
    pub accuracy: f64,
    #[serde(alias = "klingon_predictions")]
    pub watched_predictions: usize,
    #[serde(alias = "klingon_rate")]
    pub watched_rate: f64,
    pub most_common_misclassifications: Vec<(String, usize)>,
    pub average_confidence: f64,
}

impl From<&LangResults> for LanguageStats {
    fn from(r: &LangResults) -> Self {
        let total = r.predictions.len();
        let percent = |n: usize| {
            if total > 0 {
                n as f64 / total as f64 * 100.0
            } else {
                0.0
            }
        };

        let mut misclassifications: Vec<(String, usize)> = r
            .other_predictions
            .iter()
            .map(|(label, count)| (label.clone(), *count))
            .collect();
        // stable: ties stay in label order
        misclassifications.sort_by(|a, b| b.1.cmp(&a.1));
        misclassifications.truncate(TOP_MISCLASSIFICATIONS);

        let confidences: Vec<f64> = r.confidences.iter().map(|c| *c as f64).collect();

        Self {
            total_sentences: total,
            correct_predictions: r.correct_predictions,
            accuracy: percent(r.correct_predictions),
            watched_predictions: r.watched_predictions,
            watched_rate: percent(r.watched_predictions),
            most_common_misclassifications: misclassifications,
            average_confidence: mean(&confidences),
        }
    }
}

/// Stats of every language.
pub fn analyze(results: &BTreeMap<String, LangResults>) -> BTreeMap<String, LanguageStats> {
    results
        .iter()
        .map(|(lang, r)| (lang.clone(), LanguageStats::from(r)))
        .collect()
}

/// Mean, 0 for no values.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Median, 0 for no values. Even counts average the two middle values.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Accuracy distribution over languages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_languages: usize,
    pub average_accuracy: f64,
    pub median_accuracy: f64,
    pub min_accuracy: f64,
    pub max_accuracy: f64,
}

impl Summary {
    pub fn of<'a>(stats: impl Iterator<Item = &'a LanguageStats>) -> Self {
        let accuracies: Vec<f64> = stats.map(|s| s.accuracy).collect();
        if accuracies.is_empty() {
            return Self::default();
        }
        Self {
            total_languages: accuracies.len(),
            average_accuracy: mean(&accuracies),
            median_accuracy: median(&accuracies),
            min_accuracy: accuracies.iter().copied().fold(f64::INFINITY, f64::min),
            max_accuracy: accuracies.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Content of an experiment results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResults {
    pub results: BTreeMap<String, LangResults>,
    pub language_stats: BTreeMap<String, LanguageStats>,
    pub summary: Summary,
}

impl ExperimentResults {
    pub fn new(results: BTreeMap<String, LangResults>) -> Self {
        let language_stats = analyze(&results);
        let summary = Summary::of(language_stats.values());
        Self {
            results,
            language_stats,
            summary,
        }
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("detailed results saved to {path:?}");
        Ok(())
    }
}

/// Languages sorted by accuracy, best first. Ties keep code order.
pub fn ranked(stats: &BTreeMap<String, LanguageStats>) -> Vec<(&String, &LanguageStats)> {
    stats
        .iter()
        .sorted_by(|a, b| b.1.accuracy.total_cmp(&a.1.accuracy))
        .collect()
}

/// Accuracy table, one line per language, best first.
pub fn accuracy_table(stats: &BTreeMap<String, LanguageStats>, title: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== {title} ===");
    let _ = writeln!(
        out,
        "{:<4} {:<20} {:<10} {:<10} {:<15} {:<12}",
        "Rank", "Language", "Code", "Accuracy", "Correct/Total", "Watched Rate"
    );
    let _ = writeln!(out, "{}", "-".repeat(85));
    for (rank, (lang, s)) in ranked(stats).into_iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<20} {:<10} {:>6.1}%    {:>3}/{:<3}        {:>6.1}%",
            rank + 1,
            lang,
            "",
            s.accuracy,
            s.correct_predictions,
            s.total_sentences,
            s.watched_rate
        );
    }
    out
}
