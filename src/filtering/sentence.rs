//! sentence-level filtering
use super::Filter;

/// Inclusive length filter, in Unicode code points.
///
/// Keeps sentences with `min_chars <= length <= max_chars`.
#[derive(Debug, Clone, Copy)]
pub struct CharLength {
    min_chars: usize,
    max_chars: usize,
}

impl CharLength {
    pub fn new(min_chars: usize, max_chars: usize) -> Self {
        Self {
            min_chars,
            max_chars,
        }
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }
}

impl Filter<&str> for CharLength {
    fn detect(&self, sentence: &str) -> bool {
        let length = sentence.chars().count();
        length >= self.min_chars && length <= self.max_chars
    }
}

impl Default for CharLength {
    /// Keeps every non-empty sentence.
    fn default() -> Self {
        Self::new(1, 100_000)
    }
}

/// Prefixes of UDHR headings, preambles and article titles in the major languages.
const UDHR_BOILERPLATE: [&str; 13] = [
    "article",
    "artículo",
    "preamble",
    "préambule",
    "universal declaration",
    "declaración universal",
    "declaração universal",
    "déclaration universelle",
    "now, therefore",
    "l'assemblée générale",
    "la asamblea general",
    "a assembléia geral",
    "a assembleia geral",
];

/// Drops UDHR lines that are not running text:
/// headings, article numbers, preamble openers and anything shorter than `min_chars`.
#[derive(Debug, Clone, Copy)]
pub struct UdhrBoilerplate {
    min_chars: usize,
}

impl Default for UdhrBoilerplate {
    fn default() -> Self {
        Self { min_chars: 10 }
    }
}

impl Filter<&str> for UdhrBoilerplate {
    fn detect(&self, sentence: &str) -> bool {
        let sentence = sentence.trim();
        if sentence.chars().count() < self.min_chars {
            return false;
        }
        if sentence.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        let lower = sentence.to_lowercase();
        !UDHR_BOILERPLATE
            .iter()
            .any(|prefix| lower.starts_with(prefix))
    }
}
