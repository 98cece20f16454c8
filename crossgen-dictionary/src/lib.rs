//! Indexed word store for the crossword constraint-satisfaction core.
//!
//! Words are grouped by length, with a secondary `(position, letter) -> word-ids`
//! inverted index per length bucket so that [`Dictionary::candidates`] is
//! `O(|matching|)` amortized rather than `O(|Dictionary|)`.

pub mod error;

use std::collections::HashMap;
use std::collections::HashSet;
use std::io::{BufRead, BufReader, Read};

use bit_set::BitSet;

pub use error::DictionaryError;

/// A dictionary word id, stable for the lifetime of the length bucket it belongs to.
pub type WordId = usize;

/// The default minimum word length accepted by the dictionary.
pub const DEFAULT_MIN_LEN: usize = 3;

#[derive(Debug, Default)]
struct LengthBucket {
    words: Vec<String>,
    ids: HashMap<String, WordId>,
    by_position_letter: HashMap<(usize, char), BitSet>,
    all: BitSet,
}

impl LengthBucket {
    /// Inserts `word`, returning its id and whether it was newly inserted. Idempotent:
    /// re-inserting an existing word returns its existing id and `false`.
    fn insert(&mut self, word: &str) -> (WordId, bool) {
        if let Some(&id) = self.ids.get(word) {
            return (id, false);
        }
        let id = self.words.len();
        for (position, letter) in word.chars().enumerate() {
            self.by_position_letter
                .entry((position, letter))
                .or_default()
                .insert(id);
        }
        self.all.insert(id);
        self.ids.insert(word.to_string(), id);
        self.words.push(word.to_string());
        (id, true)
    }

    /// Word ids matching `pattern` (`.` = wildcard), as a bitset.
    fn matching(&self, pattern: &str) -> BitSet {
        let mut result = self.all.clone();
        for (position, letter) in pattern.chars().enumerate() {
            if letter == '.' {
                continue;
            }
            match self.by_position_letter.get(&(position, letter)) {
                Some(set) => result.intersect_with(set),
                None => return BitSet::new(),
            }
        }
        result
    }
}

/// The dictionary: a finite, append-only set of uppercase alphabetic words, indexed by
/// length for fast pattern lookups.
#[derive(Debug)]
pub struct Dictionary {
    min_word_length: usize,
    buckets: HashMap<usize, LengthBucket>,
}

impl Dictionary {
    pub fn new(min_word_length: usize) -> Self {
        Dictionary {
            min_word_length,
            buckets: HashMap::new(),
        }
    }

    pub fn min_word_length(&self) -> usize {
        self.min_word_length
    }

    /// Uppercases `word`, rejects it if too short or non-alphabetic, and otherwise
    /// inserts it into its length bucket. Idempotent: re-adding an existing word is a
    /// no-op that returns `Ok(false)`.
    pub fn add(&mut self, word: &str) -> Result<bool, DictionaryError> {
        self.add_get_id(word).map(|(_, inserted)| inserted)
    }

    /// As [`Dictionary::add`], but also returns the word's id within its length
    /// bucket (existing or newly assigned). Used by the solver to fold oracle-supplied
    /// words directly into a domain bitset.
    pub fn add_get_id(&mut self, word: &str) -> Result<(WordId, bool), DictionaryError> {
        let upper = word.to_uppercase();
        if upper.len() < self.min_word_length {
            return Err(DictionaryError::TooShort {
                word: upper,
                actual: upper.chars().count(),
                min_length: self.min_word_length,
            });
        }
        if !upper.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DictionaryError::NotAlphabetic { word: upper });
        }
        Ok(self.buckets.entry(upper.len()).or_default().insert(&upper))
    }

    /// Total number of distinct words across all length buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(|b| b.words.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len_at(&self, length: usize) -> usize {
        self.buckets.get(&length).map_or(0, |b| b.words.len())
    }

    /// All words of `length` matching `pattern` (`.` = wildcard) and not present in
    /// `exclude`, in stable sorted-string order.
    pub fn candidates(&self, length: usize, pattern: &str, exclude: &HashSet<String>) -> Vec<String> {
        let Some(bucket) = self.buckets.get(&length) else {
            return vec![];
        };
        if pattern.len() != length {
            return vec![];
        }
        let matching = bucket.matching(pattern);
        let mut words: Vec<String> = matching
            .iter()
            .map(|id| bucket.words[id].clone())
            .filter(|word| !exclude.contains(word))
            .collect();
        words.sort_unstable();
        words
    }

    /// Word ids of `length` matching `pattern` (`.` = wildcard), as a bitset indexed by
    /// word id within that length's bucket. Used by the solver to build and revise
    /// domains without materializing word strings.
    pub fn word_ids_matching(&self, length: usize, pattern: &str) -> BitSet {
        match self.buckets.get(&length) {
            Some(bucket) if pattern.len() == length => bucket.matching(pattern),
            _ => BitSet::new(),
        }
    }

    /// All word ids of `length`, as a bitset.
    pub fn all_word_ids(&self, length: usize) -> BitSet {
        self.buckets.get(&length).map_or_else(BitSet::new, |b| b.all.clone())
    }

    /// The word string for `id` within the `length` bucket, if any.
    pub fn word_at(&self, length: usize, id: WordId) -> Option<&str> {
        self.buckets.get(&length)?.words.get(id).map(String::as_str)
    }

    /// Reads and sanitizes words from a newline-delimited source: strips punctuation,
    /// uppercases, and drops anything non-alphabetic or empty. Returns the accepted
    /// words without loading them, matching the CLI's historical loader contract.
    pub fn sanitize_reader<R: Read>(data: R) -> Result<Vec<String>, DictionaryError> {
        BufReader::new(data)
            .lines()
            .map(|line| line.map_err(|e| DictionaryError::Parse(e.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(|lines| {
                lines
                    .into_iter()
                    .map(|word| word.replace(['-', '\'', '.'], "").to_uppercase())
                    .filter(|word| !word.is_empty() && word.chars().all(|c| c.is_ascii_alphabetic()))
                    .collect()
            })
    }

    /// Loads a JSON array of words (`["APPLE", "PEACH", ...]`) and adds every valid one.
    /// Returns the number of words actually inserted.
    pub fn load_json(&mut self, data: &str) -> Result<usize, DictionaryError> {
        let words: Vec<String> =
            serde_json::from_str(data).map_err(|e| DictionaryError::Parse(e.to_string()))?;
        let mut added = 0;
        for word in words {
            if self.add(&word).unwrap_or(false) {
                added += 1;
            }
        }
        log::debug!("loaded {added} words from JSON source");
        Ok(added)
    }
}
