use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DictionaryError {
    #[error("word '{word}' has length {actual}, shorter than minimum {min_length}")]
    TooShort {
        word: String,
        actual: usize,
        min_length: usize,
    },

    #[error("word '{word}' contains a non-alphabetic character")]
    NotAlphabetic { word: String },

    #[error("failed to parse word list: {0}")]
    Parse(String),
}
