/*! Language identification models

Holds a [Predict] trait so that the experiment can run on any classifier.

The only implementation is [fasttext](https://fasttext.cc), used with
GlotLID-style labels (`__label__<iso639-3>_<Script>`), see [labels].
!*/
pub mod labels;
mod model;

pub use model::{FastText, FastTextBuilder, Identification, Predict};
