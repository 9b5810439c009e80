/*! Text normalization

Applied inline by every fetcher, before length filtering:

1. Unicode normalization (NFC unless told otherwise),
2. `\r\n` and lone `\r` become `\n`,
3. runs of spaces and tabs become a single space,
4. every line is trimmed, and so is the whole text,
5. leading byte order marks are stripped along with the leading whitespace.

Normalizing twice gives the same result as normalizing once.
!*/
use std::str::FromStr;

use unicode_normalization::UnicodeNormalization;

use crate::filtering::{CharLength, Filter};

/// Unicode normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationForm {
    #[default]
    Nfc,
    Nfkc,
    Nfd,
    Nfkd,
}

impl NormalizationForm {
    pub fn apply(&self, text: &str) -> String {
        match self {
            NormalizationForm::Nfc => text.nfc().collect(),
            NormalizationForm::Nfkc => text.nfkc().collect(),
            NormalizationForm::Nfd => text.nfd().collect(),
            NormalizationForm::Nfkd => text.nfkd().collect(),
        }
    }
}

impl FromStr for NormalizationForm {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NFC" => Ok(Self::Nfc),
            "NFKC" => Ok(Self::Nfkc),
            "NFD" => Ok(Self::Nfd),
            "NFKD" => Ok(Self::Nfkd),
            other => Err(format!("unknown normalization form: {other}")),
        }
    }
}

/// Normalize `text` using `form`. See module documentation.
pub fn normalize_text(text: &str, form: NormalizationForm) -> String {
    let text = form.apply(text);
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let lines: Vec<String> = text.split('\n').map(collapse_blanks).collect();
    lines
        .join("\n")
        .trim_start_matches(|c: char| c == '\u{feff}' || c.is_whitespace())
        .trim_end()
        .to_string()
}

/// Collapse space/tab runs to a single space and trim the line.
fn collapse_blanks(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_blank = false;
    for c in line.chars() {
        if c == ' ' || c == '\t' {
            in_blank = true;
        } else {
            if in_blank && !out.is_empty() {
                out.push(' ');
            }
            in_blank = false;
            out.push(c);
        }
    }
    out
}

/// NFC, then every whitespace run (newlines included) becomes a single space.
///
/// This is the comparison (and output) form used by deduplication.
pub fn collapse_whitespace(text: &str) -> String {
    let text: String = text.nfc().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalization followed by a length filter.
#[derive(Debug, Clone, Copy)]
pub struct Cleaner {
    form: NormalizationForm,
    length: CharLength,
}

impl Cleaner {
    pub fn new(form: NormalizationForm, min_chars: usize, max_chars: usize) -> Self {
        Self {
            form,
            length: CharLength::new(min_chars, max_chars),
        }
    }

    /// Normalized text, or `None` if it falls outside of the length bounds.
    pub fn clean(&self, text: &str) -> Option<String> {
        let text = normalize_text(text, self.form);
        if self.length.detect(text.as_str()) {
            Some(text)
        } else {
            None
        }
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self {
            form: NormalizationForm::Nfc,
            length: CharLength::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_whitespace_and_newlines() {
        let text = "\u{feff}  Hello \t  world  \r\n\tsecond\rline  ";
        assert_eq!(
            normalize_text(text, NormalizationForm::Nfc),
            "Hello world\nsecond\nline"
        );
    }

    #[test]
    fn bom_after_blanks() {
        assert_eq!(normalize_text(" \u{feff}x", NormalizationForm::Nfc), "x");
        assert_eq!(normalize_text("\u{feff}\n\u{feff} x", NormalizationForm::Nfc), "x");
    }

    #[test]
    fn composes_nfc() {
        // e + combining acute
        let text = "cafe\u{301}";
        assert_eq!(normalize_text(text, NormalizationForm::Nfc), "café");
        assert_eq!(normalize_text("café", NormalizationForm::Nfd), "cafe\u{301}");
    }

    #[test]
    fn nfkc_folds_compatibility() {
        assert_eq!(normalize_text("ﬁ ①", NormalizationForm::Nfkc), "fi 1");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "\u{feff}Ünïcödé \u{00a0} text\r\n  with\tblanks ",
            "ሰላም  ለዓለም\r\n",
            "a\u{0308}\u{0301} \t b",
            "   ",
            " \u{feff}x",
            "\u{feff} \u{feff}\n x",
        ];
        for form in [
            NormalizationForm::Nfc,
            NormalizationForm::Nfkc,
            NormalizationForm::Nfd,
            NormalizationForm::Nfkd,
        ] {
            for s in samples {
                let once = normalize_text(s, form);
                assert_eq!(normalize_text(&once, form), once, "{form:?} {s:?}");
            }
        }
    }

    #[test]
    fn form_from_str() {
        assert_eq!("nfkc".parse::<NormalizationForm>(), Ok(NormalizationForm::Nfkc));
        assert!("nfx".parse::<NormalizationForm>().is_err());
    }

    #[test]
    fn collapse_for_dedup() {
        assert_eq!(collapse_whitespace(" a\n\n b\tc "), "a b c");
    }

    #[test]
    fn cleaner_bounds() {
        let c = Cleaner::new(NormalizationForm::Nfc, 3, 5);
        assert_eq!(c.clean("  ab  "), None);
        assert_eq!(c.clean("  abc  "), Some("abc".to_string()));
        assert_eq!(c.clean("abcdef"), None);
    }
}
