use std::collections::{HashMap, HashSet};

use crate::budget::CallBudget;
use crate::kinds::PATTERN_MATCH;
use crate::oracle::{Oracle, Word};

/// Bounded, cached, accounted access to an [`Oracle`]. This is what the solver actually
/// talks to: it never calls an [`Oracle`] implementation directly.
pub struct OracleAdapter {
    oracle: Option<Box<dyn Oracle>>,
    budget: CallBudget,
    cache: HashMap<(String, String), Vec<Word>>,
    on_limit_reached: Option<Box<dyn FnMut(&str)>>,
}

impl OracleAdapter {
    pub fn new(oracle: Option<Box<dyn Oracle>>, budget: CallBudget) -> Self {
        OracleAdapter {
            oracle,
            budget,
            cache: HashMap::new(),
            on_limit_reached: None,
        }
    }

    /// An adapter with no backing oracle at all: every request refuses immediately.
    pub fn disabled() -> Self {
        OracleAdapter::new(None, CallBudget::closed())
    }

    pub fn is_enabled(&self) -> bool {
        self.oracle.is_some()
    }

    pub fn budget(&self) -> &CallBudget {
        &self.budget
    }

    pub fn on_limit_reached(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_limit_reached = Some(Box::new(callback));
    }

    pub fn can_call(&self, kind: &str) -> bool {
        self.oracle.is_some() && self.budget.can_call(kind)
    }

    /// Requests `count` words matching `pattern`, excluding `exclude`. Returns an empty
    /// vec on refusal, cache miss with a failing oracle, or true emptiness — never
    /// panics and never propagates a transport error to the caller, since the solver
    /// treats oracle unavailability as ordinary domain exhaustion.
    pub fn request_words(&mut self, pattern: &str, count: u32, exclude: &HashSet<Word>) -> Vec<Word> {
        let cache_key = (pattern.to_string(), PATTERN_MATCH.to_string());
        if let Some(cached) = self.cache.get(&cache_key) {
            log::debug!("oracle cache hit for pattern {pattern}");
            return cached
                .iter()
                .filter(|w| !exclude.contains(*w))
                .cloned()
                .collect();
        }

        if !self.can_call(PATTERN_MATCH) {
            if let Some(cb) = self.on_limit_reached.as_mut() {
                cb(PATTERN_MATCH);
            }
            return vec![];
        }

        let Some(oracle) = self.oracle.as_mut() else {
            return vec![];
        };

        match oracle.words_matching(pattern, count, exclude) {
            Ok(words) => {
                let conforming: Vec<Word> = words
                    .into_iter()
                    .filter(|w| conforms(w, pattern))
                    .collect();
                self.budget.record(
                    PATTERN_MATCH,
                    0,
                    !conforming.is_empty(),
                    Some(pattern.to_string()),
                );
                self.cache.insert(cache_key, conforming.clone());
                conforming
                    .into_iter()
                    .filter(|w| !exclude.contains(w))
                    .collect()
            }
            Err(err) => {
                log::warn!("oracle request for pattern {pattern} failed: {err}");
                self.budget.record(PATTERN_MATCH, 0, false, Some(pattern.to_string()));
                vec![]
            }
        }
    }
}

fn conforms(word: &str, pattern: &str) -> bool {
    word.len() == pattern.len()
        && word
            .chars()
            .zip(pattern.chars())
            .all(|(w, p)| p == '.' || w == p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OracleError;

    struct StubOracle {
        words: Vec<Word>,
    }

    impl Oracle for StubOracle {
        fn words_matching(
            &mut self,
            _pattern: &str,
            _count: u32,
            _excluded: &HashSet<Word>,
        ) -> Result<Vec<Word>, OracleError> {
            Ok(self.words.clone())
        }

        fn themed_words(
            &mut self,
            _topic: &str,
            _count: u32,
            _len_min: u32,
            _len_max: u32,
        ) -> Result<Vec<(Word, String)>, OracleError> {
            Ok(vec![])
        }

        fn clues_for(
            &mut self,
            _words: &[Word],
        ) -> Result<HashMap<Word, String>, OracleError> {
            Ok(HashMap::new())
        }
    }

    #[test]
    fn disabled_adapter_refuses() {
        let mut adapter = OracleAdapter::disabled();
        assert!(adapter.request_words("S...E", 10, &HashSet::new()).is_empty());
        assert_eq!(0, adapter.budget().total_calls());
    }

    #[test]
    fn request_words_filters_nonconforming_and_excluded() {
        let stub = StubOracle {
            words: vec!["SHADE".to_string(), "HOUSE".to_string(), "SHAPE".to_string()],
        };
        let mut adapter = OracleAdapter::new(Some(Box::new(stub)), CallBudget::new(5, HashMap::new()));
        let mut exclude = HashSet::new();
        exclude.insert("SHAPE".to_string());

        let words = adapter.request_words("S...E", 10, &exclude);

        assert_eq!(vec!["SHADE".to_string()], words);
        assert_eq!(1, adapter.budget().total_calls());
    }

    #[test]
    fn cache_hit_consumes_no_budget() {
        let stub = StubOracle {
            words: vec!["SHADE".to_string()],
        };
        let mut adapter = OracleAdapter::new(Some(Box::new(stub)), CallBudget::new(5, HashMap::new()));
        adapter.request_words("S...E", 10, &HashSet::new());
        assert_eq!(1, adapter.budget().total_calls());

        adapter.request_words("S...E", 10, &HashSet::new());
        assert_eq!(1, adapter.budget().total_calls(), "cache hit must not re-consume budget");
    }

    #[test]
    fn exhausted_budget_refuses_and_notifies() {
        let stub = StubOracle {
            words: vec!["SHADE".to_string()],
        };
        let mut adapter = OracleAdapter::new(Some(Box::new(stub)), CallBudget::closed());
        let notified = std::rc::Rc::new(std::cell::RefCell::new(None));
        let notified_clone = notified.clone();
        adapter.on_limit_reached(move |kind| *notified_clone.borrow_mut() = Some(kind.to_string()));

        let words = adapter.request_words("S...E", 10, &HashSet::new());

        assert!(words.is_empty());
        assert_eq!(Some("pattern_match".to_string()), *notified.borrow());
    }
}
