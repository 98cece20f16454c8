use std::collections::HashMap;

use crate::error::OracleError;

pub type Word = String;
pub type Clue = String;

/// Capability required of any implementation of the external word-pattern source: a
/// `Real` (e.g. HTTP-backed) oracle, a `Stub` for deterministic tests, or a `Null`
/// that always refuses.
///
/// The solver depends only on this capability, never on transport details.
pub trait Oracle {
    /// Words of `len(pattern)` letters matching `pattern` (`.` = unknown letter), not
    /// in `excluded`. May return fewer than `count`.
    fn words_matching(
        &mut self,
        pattern: &str,
        count: u32,
        excluded: &std::collections::HashSet<Word>,
    ) -> Result<Vec<Word>, OracleError>;

    /// A themed word list with clues, word lengths within `[len_min, len_max]`.
    fn themed_words(
        &mut self,
        topic: &str,
        count: u32,
        len_min: u32,
        len_max: u32,
    ) -> Result<Vec<(Word, Clue)>, OracleError>;

    /// Clues for an already-solved set of words.
    fn clues_for(&mut self, words: &[Word]) -> Result<HashMap<Word, Clue>, OracleError>;
}
