use chrono::{Datelike, Utc};
use rand::Rng;

const DEFAULT_CORPUS: &str = include_str!("../words.txt");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedMode {
    /// Seed derived from the calendar date, so every room gets the same
    /// word on a given day.
    Date,
    /// Seed drawn uniformly from [0, 10000).
    Random,
}

/// Picks target words from a fixed corpus. Never fails: selection is a
/// plain modular index into the corpus.
#[derive(Debug, Clone)]
pub struct WordSelector {
    corpus: Vec<String>,
}

impl WordSelector {
    /// Parse a newline-separated word list, skipping blanks and `#`
    /// comments. The list must contain at least one word.
    pub fn new(word_list: &str) -> Self {
        let corpus: Vec<String> = word_list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .collect();
        assert!(!corpus.is_empty(), "word corpus is empty");

        Self { corpus }
    }

    pub fn with_default_corpus() -> Self {
        Self::new(DEFAULT_CORPUS)
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    pub fn select(&self, mode: SeedMode) -> String {
        let seed = match mode {
            SeedMode::Date => {
                let today = Utc::now().date_naive();
                (today.day() + today.month() * 100) as usize
                    + today.year() as usize * 10_000
            }
            SeedMode::Random => rand::rng().random_range(0..10_000),
        };
        self.select_with_seed(seed)
    }

    pub fn select_with_seed(&self, seed: usize) -> String {
        self.corpus[seed % self.corpus.len()].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_skipping_comments_and_blanks() {
        let selector = WordSelector::new("# header\nMoon\n\n  star  \n# tail\nrain");
        assert_eq!(selector.len(), 3);
        assert_eq!(selector.select_with_seed(0), "moon");
        assert_eq!(selector.select_with_seed(1), "star");
        assert_eq!(selector.select_with_seed(2), "rain");
    }

    #[test]
    fn seed_wraps_modulo_corpus_length() {
        let selector = WordSelector::new("a\nb\nc");
        assert_eq!(selector.select_with_seed(3), "a");
        assert_eq!(selector.select_with_seed(7), "b");
    }

    #[test]
    fn default_corpus_is_usable() {
        let selector = WordSelector::with_default_corpus();
        assert!(selector.len() > 50);
        let word = selector.select(SeedMode::Random);
        assert!(!word.is_empty());
        assert_eq!(word, word.to_lowercase());
    }

    #[test]
    fn date_mode_is_stable_within_a_day() {
        let selector = WordSelector::with_default_corpus();
        assert_eq!(selector.select(SeedMode::Date), selector.select(SeedMode::Date));
    }

    #[test]
    #[should_panic(expected = "word corpus is empty")]
    fn empty_corpus_is_rejected() {
        WordSelector::new("# only comments\n\n");
    }
}
