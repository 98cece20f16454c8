use std::collections::{HashMap, HashSet};

use crossgen_oracle::{Clue, Oracle, OracleError, Word};

/// An in-memory oracle with a canned `pattern -> words` table, for deterministic tests
/// and offline runs. Unknown patterns return an empty (not an error) result, matching
/// `words_matching`'s "may return fewer than count, including zero" contract.
#[derive(Debug, Default, Clone)]
pub struct StubOracle {
    pattern_table: HashMap<String, Vec<Word>>,
    themed_table: HashMap<String, Vec<(Word, Clue)>>,
    clue_table: HashMap<Word, Clue>,
}

impl StubOracle {
    pub fn new() -> Self {
        StubOracle::default()
    }

    /// Registers the words returned for an exact pattern match (e.g. `"S...E"`).
    pub fn with_pattern(mut self, pattern: impl Into<String>, words: Vec<Word>) -> Self {
        self.pattern_table.insert(pattern.into(), words);
        self
    }

    pub fn with_themed(mut self, topic: impl Into<String>, words: Vec<(Word, Clue)>) -> Self {
        self.themed_table.insert(topic.into(), words);
        self
    }

    pub fn with_clue(mut self, word: impl Into<Word>, clue: impl Into<Clue>) -> Self {
        self.clue_table.insert(word.into(), clue.into());
        self
    }
}

impl Oracle for StubOracle {
    fn words_matching(
        &mut self,
        pattern: &str,
        count: u32,
        excluded: &HashSet<Word>,
    ) -> Result<Vec<Word>, OracleError> {
        let words = self
            .pattern_table
            .get(pattern)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|w| !excluded.contains(w))
            .take(count as usize)
            .collect();
        Ok(words)
    }

    fn themed_words(
        &mut self,
        topic: &str,
        count: u32,
        len_min: u32,
        len_max: u32,
    ) -> Result<Vec<(Word, Clue)>, OracleError> {
        let words = self
            .themed_table
            .get(topic)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|(w, _)| {
                let len = w.len() as u32;
                len >= len_min && len <= len_max
            })
            .take(count as usize)
            .collect();
        Ok(words)
    }

    fn clues_for(&mut self, words: &[Word]) -> Result<HashMap<Word, Clue>, OracleError> {
        Ok(words
            .iter()
            .filter_map(|w| self.clue_table.get(w).map(|c| (w.clone(), c.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_matching_returns_registered_pattern() {
        let mut oracle = StubOracle::new().with_pattern(
            "S...E",
            vec!["SHADE".to_string(), "SHAPE".to_string(), "SHARE".to_string()],
        );

        let words = oracle.words_matching("S...E", 10, &HashSet::new()).unwrap();

        assert_eq!(3, words.len());
        assert!(words.contains(&"SHADE".to_string()));
    }

    #[test]
    fn words_matching_unknown_pattern_is_empty_not_error() {
        let mut oracle = StubOracle::new();
        let words = oracle.words_matching("Z...Z", 10, &HashSet::new()).unwrap();
        assert!(words.is_empty());
    }

    #[test]
    fn words_matching_respects_count_and_exclude() {
        let mut oracle = StubOracle::new().with_pattern(
            "S...E",
            vec!["SHADE".to_string(), "SHAPE".to_string(), "SHARE".to_string()],
        );
        let mut excluded = HashSet::new();
        excluded.insert("SHAPE".to_string());

        let words = oracle.words_matching("S...E", 1, &excluded).unwrap();

        assert_eq!(1, words.len());
        assert_ne!("SHAPE", words[0]);
    }

    #[test]
    fn themed_words_filters_by_length_bounds() {
        let mut oracle = StubOracle::new().with_themed(
            "fruit",
            vec![
                ("FIG".to_string(), "Small fruit".to_string()),
                ("PINEAPPLE".to_string(), "Spiky fruit".to_string()),
            ],
        );

        let words = oracle.themed_words("fruit", 10, 4, 6).unwrap();

        assert!(words.is_empty());
    }

    #[test]
    fn clues_for_returns_only_known_words() {
        let mut oracle = StubOracle::new().with_clue("SHADE", "Partial darkness");
        let clues = oracle
            .clues_for(&["SHADE".to_string(), "UNKNOWN".to_string()])
            .unwrap();
        assert_eq!(1, clues.len());
        assert_eq!("Partial darkness", clues["SHADE"]);
    }
}
