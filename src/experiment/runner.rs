/*! Classification runner

Classifies every sentence of every language with a [Predict] model (top-1)
and counts, per language:

- correct predictions: the label is the language's model code, with or without a script suffix
  (see [is_correct_label]),
- watched predictions: the label is the watched label (Klingon by default),
- any other label.

Dataset codes are mapped to model codes with [model_code].
!*/
use std::collections::{BTreeMap, HashMap};

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::identifiers::labels::{is_correct_label, WATCHED_LABEL};
use crate::identifiers::Predict;
use crate::lang::model_code;

use super::sentences::Sentences;

/// Raw per-language results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LangResults {
    pub predictions: Vec<String>,
    pub confidences: Vec<f32>,
    pub correct_predictions: usize,
    #[serde(alias = "klingon_predictions")]
    pub watched_predictions: usize,
    pub other_predictions: BTreeMap<String, usize>,
}

impl LangResults {
    /// Record a prediction of `label` with `prob` for a language whose model code is `code`.
    pub fn add(&mut self, label: &str, prob: f32, code: &str, watched: &str) {
        self.predictions.push(label.to_string());
        self.confidences.push(prob);
        if is_correct_label(label, code) {
            self.correct_predictions += 1;
        } else if label == watched {
            self.watched_predictions += 1;
        } else {
            *self.other_predictions.entry(label.to_string()).or_insert(0) += 1;
        }
    }
}

/// Experiment settings.
#[derive(Debug, Clone)]
pub struct Experiment {
    /// Dataset code -> model code, checked before the built-in corrections.
    pub overrides: HashMap<String, String>,
    pub watched: String,
}

impl Default for Experiment {
    fn default() -> Self {
        Self {
            overrides: HashMap::new(),
            watched: WATCHED_LABEL.to_string(),
        }
    }
}

impl Experiment {
    /// Classify the sentences of one language.
    pub fn classify_lang<P: Predict>(&self, model: &P, lang: &str, sentences: &[String]) -> LangResults {
        let code = model_code(lang, &self.overrides);
        info!("[{lang}] classifying {} sentences (model code {code})", sentences.len());

        let mut results = LangResults::default();
        for sentence in sentences {
            match model.predict_one(sentence) {
                Ok(Some(id)) => results.add(id.label(), id.prob(), code, &self.watched),
                Ok(None) => debug!("[{lang}] no prediction for {sentence:?}"),
                Err(e) => error!("[{lang}] error classifying sentence: {e}"),
            }
        }
        results
    }

    /// Classify all languages of `sentences`.
    pub fn classify<P: Predict>(&self, model: &P, sentences: &Sentences) -> BTreeMap<String, LangResults> {
        sentences
            .iter()
            .map(|(lang, s)| (lang.clone(), self.classify_lang(model, lang, s)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::Error;
    use crate::experiment::sentences::from_split_dir;
    use crate::identifiers::Identification;
    use crate::io::{JsonlWriter, WriterTrait};
    use crate::record::{Record, SplitLabel};

    /// Answers from a sentence -> label table, failing on unknown sentences.
    #[derive(Default)]
    pub struct FakeModel {
        pub answers: HashMap<String, (String, f32)>,
    }

    impl FakeModel {
        pub fn with(mut self, sentence: &str, label: &str, prob: f32) -> Self {
            self.answers
                .insert(sentence.to_string(), (label.to_string(), prob));
            self
        }
    }

    impl Predict for FakeModel {
        fn predict_one(&self, line: &str) -> Result<Option<Identification>, Error> {
            self.answers
                .get(line)
                .map(|(label, prob)| Some(Identification::new(label, *prob)))
                .ok_or_else(|| Error::FastText(format!("unknown sentence {line}")))
        }
    }

    #[test]
    fn counts() {
        let model = FakeModel::default()
            .with("a", "__label__msc_Latn", 0.9)
            .with("b", "__label__tlh_Latn", 0.5)
            .with("c", "__label__fra_Latn", 0.4)
            .with("d", "__label__msc", 0.7);
        let exp = Experiment::default();

        // "man" is corrected to "msc", "e" fails and is skipped
        let sentences: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        let results = exp.classify_lang(&model, "man", &sentences);

        assert_eq!(results.predictions.len(), 4);
        assert_eq!(results.correct_predictions, 2);
        assert_eq!(results.watched_predictions, 1);
        assert_eq!(results.other_predictions["__label__fra_Latn"], 1);
    }

    #[test]
    fn split_dir_project_codes() {
        let dir = tempfile::tempdir().unwrap();
        for (lang, text) in [("am", "ሰላም ለዓለም"), ("ka", "გამარჯობა")] {
            let mut w = JsonlWriter::create(&dir.path().join(format!("test/{lang}.jsonl"))).unwrap();
            w.write_single(&Record::new(text.to_string(), lang, "tatoeba")).unwrap();
            w.flush().unwrap();
        }
        let model = FakeModel::default()
            .with("ሰላም ለዓለም", "__label__amh_Ethi", 0.9)
            .with("გამარჯობა", "__label__kat_Geor", 0.9);

        let sentences = from_split_dir(dir.path(), SplitLabel::Test, &[]).unwrap();
        let results = Experiment::default().classify(&model, &sentences);
        assert_eq!(results["am"].correct_predictions, 1);
        assert_eq!(results["ka"].correct_predictions, 1);
    }

    #[test]
    fn watched_label_can_be_correct() {
        let model = FakeModel::default().with("Qapla'", "__label__tlh_Latn", 0.99);
        let sentences = BTreeMap::from([("klingon".to_string(), vec!["Qapla'".to_string()])]);
        let results = Experiment::default().classify(&model, &sentences);
        assert_eq!(results["klingon"].correct_predictions, 1);
        assert_eq!(results["klingon"].watched_predictions, 0);
    }

    #[test]
    fn reads_klingon_field() {
        let json = r#"{"predictions":[],"confidences":[],"correct_predictions":0,"klingon_predictions":3,"other_predictions":{}}"#;
        let r: LangResults = serde_json::from_str(json).unwrap();
        assert_eq!(r.watched_predictions, 3);
    }
}
