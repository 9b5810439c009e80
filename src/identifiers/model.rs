/*! FastText model.
* !*/
use std::path::Path;

use fasttext::FastText as FastTextLib;

use crate::error::Error;

/// Label and probability of a single prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    label: String,
    prob: f32,
}

impl Identification {
    pub fn new(label: &str, prob: f32) -> Self {
        Self {
            label: label.to_string(),
            prob,
        }
    }

    /// Raw model label, `__label__` prefix included.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn prob(&self) -> f32 {
        self.prob
    }
}

/// Prediction trait.
///
/// Enables top-1 prediction on a single line.
pub trait Predict {
    fn predict_one(&self, line: &str) -> Result<Option<Identification>, Error>;
}

/// FastText model.
pub struct FastText {
    inner: FastTextLib,
    /// Predictions below this probability are discarded.
    pub threshold: f32,
}

impl FastText {
    /// fasttext predicts on a single line
    fn prepare(line: &str) -> String {
        line.replace(['\n', '\r'], " ").replace(char::from(0), "")
    }
}

impl Predict for FastText {
    fn predict_one(&self, line: &str) -> Result<Option<Identification>, Error> {
        let pred = self
            .inner
            .predict(&Self::prepare(line), 1, self.threshold)
            .map_err(Error::FastText)?;
        Ok(pred
            .into_iter()
            .next()
            .map(|p| Identification::new(&p.label, p.prob)))
    }
}

/// Fasttext builder.
pub struct FastTextBuilder<'a> {
    path: Option<&'a Path>,
    threshold: Option<f32>,
}

impl<'a> FastTextBuilder<'a> {
    fn init_fasttextlib(path: &Path) -> Result<FastTextLib, Error> {
        if !path.exists() {
            return Err(Error::Custom(format!(
                "model not found at {path:?}, see the download-model subcommand"
            )));
        }
        let path = path
            .to_str()
            .ok_or_else(|| Error::Custom(format!("Could not parse path {path:?}")))?;
        let mut ft = FastTextLib::new();
        ft.load_model(path).map_err(Error::FastText)?;
        Ok(ft)
    }

    pub fn build(&self) -> Result<FastText, Error> {
        match (self.path, self.threshold) {
            (Some(path), Some(threshold)) => Ok(FastText {
                inner: Self::init_fasttextlib(path)?,
                threshold,
            }),
            (None, _) => Err(Error::Custom("No path provided".to_string())),
            (_, None) => Err(Error::Custom("No threshold provided".to_string())),
        }
    }

    pub fn path<'b>(&'b mut self, path: &'a Path) -> &'b mut FastTextBuilder<'a> {
        self.path = Some(path);
        self
    }

    pub fn threshold<'b>(&'b mut self, threshold: f32) -> &'b mut FastTextBuilder<'a> {
        self.threshold = Some(threshold);
        self
    }
}

impl<'a> Default for FastTextBuilder<'a> {
    fn default() -> Self {
        Self {
            path: Some(Path::new("model.bin")),
            threshold: Some(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        let model = FastTextBuilder::default().path(&path).build();
        assert!(matches!(model, Err(Error::Custom(_))));
    }

    #[test]
    fn incomplete_builder() {
        let mut builder = FastTextBuilder {
            path: Some(Path::new("model.bin")),
            threshold: None,
        };
        assert!(matches!(builder.build(), Err(Error::Custom(m)) if m.contains("threshold")));
        builder.threshold(0.5);
        // still fails, but because the model file is not there
        assert!(builder.build().is_err());
    }

    #[test]
    fn single_line() {
        assert_eq!(FastText::prepare("a\nb\r\nc"), "a b  c");
    }
}
