use std::collections::{HashMap, HashSet};

use crossgen_oracle::{Clue, Oracle, OracleError, Word};

/// An oracle that always refuses. Used when `oracle.enabled = false`: the solver still
/// goes through the same `Oracle` capability seam, it just gets nothing back.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOracle;

impl NullOracle {
    pub fn new() -> Self {
        NullOracle
    }
}

impl Oracle for NullOracle {
    fn words_matching(
        &mut self,
        _pattern: &str,
        _count: u32,
        _excluded: &HashSet<Word>,
    ) -> Result<Vec<Word>, OracleError> {
        Err(OracleError::BudgetExhausted {
            kind: "pattern_match".to_string(),
        })
    }

    fn themed_words(
        &mut self,
        _topic: &str,
        _count: u32,
        _len_min: u32,
        _len_max: u32,
    ) -> Result<Vec<(Word, Clue)>, OracleError> {
        Err(OracleError::BudgetExhausted {
            kind: "themed_list".to_string(),
        })
    }

    fn clues_for(&mut self, _words: &[Word]) -> Result<HashMap<Word, Clue>, OracleError> {
        Err(OracleError::BudgetExhausted {
            kind: "clue_batch".to_string(),
        })
    }
}
