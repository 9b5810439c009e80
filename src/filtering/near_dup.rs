//! Near-duplicate detection over character n-grams.
//!
//! Two texts are near-duplicates when the Jaccard similarity of their
//! character n-gram sets reaches a threshold.
//! N-grams are computed over NFKC-normalized, lowercased text, whitespace included.
use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

use crate::error::Error;

use super::FilterMut;

/// Set of character n-grams of `text`.
///
/// Texts shorter than `n` yield a single n-gram (the text itself), empty texts yield none.
pub fn char_ngrams(text: &str, n: usize) -> HashSet<String> {
    let chars: Vec<char> = text.nfkc().flat_map(char::to_lowercase).collect();
    if chars.is_empty() {
        return HashSet::new();
    }
    if chars.len() < n || n == 0 {
        return std::iter::once(chars.into_iter().collect()).collect();
    }
    chars.windows(n).map(|w| w.iter().collect()).collect()
}

/// Jaccard similarity. Empty sets are never similar to anything.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    if inter == 0 {
        return 0.0;
    }
    let union = a.len() + b.len() - inter;
    inter as f64 / union as f64
}

/// First-seen-wins near-duplicate filter.
///
/// [FilterMut::detect_mut] returns `false` when the text is at least `threshold`-similar
/// to a previously kept text, and otherwise remembers it and returns `true`.
/// Comparison is linear in the number of kept texts.
pub struct NearDuplicate {
    n: usize,
    threshold: f64,
    kept: Vec<HashSet<String>>,
}

impl NearDuplicate {
    /// Fails if `n` is 0 or `threshold` is outside of `(0, 1]`.
    pub fn new(n: usize, threshold: f64) -> Result<Self, Error> {
        if n == 0 {
            return Err(Error::Custom("n-gram size must be at least 1".to_string()));
        }
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(Error::Custom(format!(
                "near-duplicate threshold must be in (0, 1]: {threshold}"
            )));
        }
        Ok(Self {
            n,
            threshold,
            kept: Vec::new(),
        })
    }

    fn matches(&self, grams: &HashSet<String>) -> bool {
        self.kept
            .iter()
            .any(|prev| jaccard(grams, prev) >= self.threshold)
    }

    pub fn len(&self) -> usize {
        self.kept.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

impl Default for NearDuplicate {
    /// 5-grams, 0.85 threshold.
    fn default() -> Self {
        Self {
            n: 5,
            threshold: 0.85,
            kept: Vec::new(),
        }
    }
}

impl FilterMut<&str> for NearDuplicate {
    fn detect_mut(&mut self, text: &str) -> bool {
        let grams = char_ngrams(text, self.n);
        if self.matches(&grams) {
            return false;
        }
        self.kept.push(grams);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ngrams_short_text() {
        let g = char_ngrams("abc", 5);
        assert_eq!(g.len(), 1);
        assert!(g.contains("abc"));
        assert!(char_ngrams("", 5).is_empty());
    }

    #[test]
    fn ngrams_are_lowercased() {
        assert_eq!(char_ngrams("ABCDEF", 5), char_ngrams("abcdef", 5));
        assert_eq!(char_ngrams("abcdef", 5).len(), 2);
    }

    #[test]
    fn jaccard_bounds() {
        let a = char_ngrams("the quick brown fox", 5);
        let b = char_ngrams("completely different", 5);
        assert_eq!(jaccard(&a, &a), 1.0);
        assert_eq!(jaccard(&a, &b), 0.0);
        assert_eq!(jaccard(&a, &HashSet::new()), 0.0);
    }

    #[test]
    fn first_seen_wins() {
        let mut f = NearDuplicate::new(5, 0.85).unwrap();
        let original = "All human beings are born free and equal in dignity and rights.";
        let variant = "All human beings are born free and equal in dignity and rights!";
        let other = "Everyone has the right to life, liberty and security of person.";

        assert!(f.detect_mut(original));
        assert!(!f.detect_mut(variant));
        assert!(f.detect_mut(other));
        assert_eq!(f.len(), 2);
    }

    #[test]
    fn first_text_is_remembered() {
        let mut f = NearDuplicate::default();
        assert!(f.detect_mut("Tatoeba is a collection of sentences."));
        assert!(!f.detect_mut("tatoeba is a collection of sentences."));
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn rejects_bad_settings() {
        assert!(NearDuplicate::new(0, 0.85).is_err());
        assert!(NearDuplicate::new(5, 0.0).is_err());
        assert!(NearDuplicate::new(5, 1.5).is_err());
        assert!(NearDuplicate::new(5, f64::NAN).is_err());
        assert!(NearDuplicate::new(1, 1.0).is_ok());
    }

    #[test]
    fn deterministic() {
        let texts = [
            "one sentence about cats and dogs",
            "one sentence about cats and dogs.",
            "another sentence about birds",
            "one sentence about cats and frogs",
        ];
        let run = || {
            let mut f = NearDuplicate::new(5, 0.8).unwrap();
            texts.iter().map(|t| f.detect_mut(t)).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
