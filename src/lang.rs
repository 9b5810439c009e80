//! Language code tables.
//!
//! Project codes are what names files and fills the `code`/`lang` fields.
//! They are ISO 639-1 when one exists (`pt`, `am`), ISO 639-3 otherwise (`tok`, `jbo`).
//! Sources and models speak other dialects:
//! - Tatoeba and UDHR use ISO 639-3 (`por`, `amh`),
//! - fastText/GlotLID labels are `__label__<iso639-3>_<Script>`, sometimes with a
//!   macrolanguage or neighbouring code (see [MODEL_CODE_CORRECTIONS]).
use std::collections::HashMap;

use lazy_static::lazy_static;

lazy_static! {
    /// 2-letter/community project code -> ISO 639-3, as used in the Tatoeba dump.
    pub static ref ISO1_TO_ISO3: HashMap<&'static str, &'static str> = [
        // anchors
        ("en", "eng"), ("pt", "por"), ("es", "spa"), ("tr", "tur"), ("ja", "jpn"),
        // conlangs
        ("eo", "epo"), ("ia", "ina"), ("io", "ido"), ("ie", "ile"), ("jbo", "jbo"),
        ("tok", "tok"), ("lfn", "lfn"), ("vo", "vol"), ("avk", "avk"),
        // low-resource
        ("yo", "yor"), ("am", "amh"), ("ka", "kat"), ("ur", "urd"), ("lo", "lao"),
        ("km", "khm"), ("my", "mya"), ("dz", "dzo"),
    ]
    .into_iter()
    .collect();

    /// Preferred project code for a given ISO 639-3 code.
    pub static ref ISO3_TO_PROJECT: HashMap<&'static str, &'static str> = [
        ("eng", "en"), ("por", "pt"), ("spa", "es"), ("tur", "tr"), ("jpn", "ja"),
        ("epo", "eo"), ("ina", "ia"), ("ido", "io"), ("ile", "ie"), ("yor", "yo"),
        ("vol", "vo"), ("lfn", "lfn"), ("jbo", "jbo"), ("avk", "avk"), ("tok", "tok"),
        ("amh", "am"), ("kat", "ka"), ("urd", "ur"), ("lao", "lo"), ("khm", "km"),
        ("mya", "my"), ("dzo", "dz"), ("kek", "kek"), ("fuf", "fuf"),
    ]
    .into_iter()
    .collect();

    /// Project code -> ISO 639-3 code of the UDHR translation.
    pub static ref UDHR_ISO3: HashMap<&'static str, &'static str> = [
        ("am", "amh"), ("ka", "kat"), ("kek", "kek"), ("fuf", "fuf"), ("ur", "urd"),
        ("lo", "lao"), ("km", "khm"), ("my", "mya"), ("dz", "dzo"), ("yo", "yor"),
    ]
    .into_iter()
    .collect();

    /// Default script of a language, as a Unicode script long name.
    /// Languages that are not listed are expected to be written in Latin.
    pub static ref EXPECTED_SCRIPT: HashMap<&'static str, &'static str> = [
        // non-Latin
        ("am", "Ethiopic"), ("ka", "Georgian"), ("ur", "Arabic"), ("lo", "Lao"),
        ("km", "Khmer"), ("my", "Myanmar"), ("dz", "Tibetan"), ("ja", "Japanese"),
        // Latin
        ("yo", "Latin"), ("en", "Latin"), ("pt", "Latin"), ("es", "Latin"), ("tr", "Latin"),
        ("eo", "Latin"), ("ia", "Latin"), ("io", "Latin"), ("ie", "Latin"), ("lfn", "Latin"),
        ("vo", "Latin"), ("avk", "Latin"), ("jbo", "Latin"), ("tok", "Latin"),
        ("kek", "Latin"), ("fuf", "Latin"),
    ]
    .into_iter()
    .collect();

    /// Dataset code -> model code, for languages whose label in the model
    /// differs from the code used to collect them.
    /// Major languages are keyed by their English name, as in the UDHR extraction.
    pub static ref MODEL_CODE_CORRECTIONS: HashMap<&'static str, &'static str> = [
        ("man", "msc"),
        ("amc", "kaq"),
        ("hva", "hus"),
        ("nah", "nch"),
        ("nym", "suk"),
        ("mix", "xtm"),
        ("lns", "vut"),
        ("klingon", "tlh"),
        ("english", "eng"),
        ("spanish", "spa"),
        ("french", "fra"),
        ("portuguese", "por"),
        ("russian", "rus"),
        ("chinese", "cmn"),
        ("hindi", "hin"),
        ("bengali", "ben"),
        ("german", "deu"),
        ("japanese", "jpn"),
        ("italian", "ita"),
        ("turkish", "tur"),
        ("vietnamese", "vie"),
        ("korean", "kor"),
        ("persian", "fas"),
        ("swahili", "swh"),
        ("indonesian", "ind"),
    ]
    .into_iter()
    .collect();

    /// UDHR plain-text file stems for major languages, keyed by English name.
    pub static ref UDHR_MAJOR_FILES: Vec<(&'static str, &'static str)> = vec![
        ("english", "English-Latin1"),
        ("spanish", "Spanish-Latin1"),
        ("french", "French_Francais-Latin1"),
        ("portuguese", "Portuguese_Portugues-Latin1"),
        ("russian", "Russian-Cyrillic"),
        ("chinese", "Chinese_Mandarin-UTF8"),
        ("hindi", "Hindi_web-UTF8"),
        ("bengali", "Bengali-UTF8"),
        ("german", "German_Deutsch-Latin1"),
        ("japanese", "Japanese_Nihongo-UTF8"),
        ("italian", "Italian-Latin1"),
        ("turkish", "Turkish_Turkce-UTF8"),
        ("vietnamese", "Vietnamese-UTF8"),
        ("korean", "Korean_Hankuko-UTF8"),
        ("persian", "Farsi_Persian-UTF8"),
        ("swahili", "Swahili_Kiswahili-Latin1"),
        ("indonesian", "Indonesian-Latin1"),
    ];
}

/// A language as requested on the command line, resolved to both naming schemes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePair {
    pub project: String,
    pub iso3: String,
}

impl CodePair {
    /// Resolve a 2- or 3-letter code.
    ///
    /// 2-letter codes are looked up in [ISO1_TO_ISO3],
    /// 3-letter codes are kept as ISO 639-3 and mapped back to a 2-letter project code when known.
    /// Anything else is used verbatim for both.
    pub fn resolve(code: &str) -> Self {
        let c = code.trim().to_lowercase();
        let (project, iso3) = match c.len() {
            2 => {
                let iso3 = ISO1_TO_ISO3.get(c.as_str()).copied().unwrap_or(c.as_str());
                (c.clone(), iso3.to_string())
            }
            3 => {
                let project = ISO3_TO_PROJECT.get(c.as_str()).copied().unwrap_or(c.as_str());
                (project.to_string(), c.clone())
            }
            _ => (c.clone(), c.clone()),
        };
        Self { project, iso3 }
    }
}

/// Expected script of a project code, defaulting to Latin.
pub fn expected_script(code: &str) -> &'static str {
    EXPECTED_SCRIPT.get(code).copied().unwrap_or("Latin")
}

/// Model code for a dataset code, using `overrides` first, then [MODEL_CODE_CORRECTIONS].
///
/// Project codes that have an ISO 639-3 counterpart in [ISO1_TO_ISO3] (`am`, `ka`) map to it.
pub fn model_code<'a>(code: &'a str, overrides: &'a HashMap<String, String>) -> &'a str {
    if let Some(c) = overrides.get(code) {
        return c.as_str();
    }
    MODEL_CODE_CORRECTIONS
        .get(code)
        .or_else(|| ISO1_TO_ISO3.get(code))
        .copied()
        .unwrap_or(code)
}
