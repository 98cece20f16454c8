//! [`crossgen_oracle::Oracle`] implementation backed by a generic HTTP word-pattern
//! service, reached via blocking requests so the solver's suspension model (oracle
//! calls are the only suspension points) stays a plain function call from its side.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crossgen_oracle::{Clue, Oracle, OracleError, Word};
use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
struct WordsMatchingRequest<'a> {
    pattern: &'a str,
    count: u32,
    excluded: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct WordsMatchingResponse {
    words: Vec<Word>,
}

#[derive(Debug, Serialize)]
struct ThemedWordsRequest<'a> {
    topic: &'a str,
    count: u32,
    len_min: u32,
    len_max: u32,
}

#[derive(Debug, Deserialize)]
struct ThemedWordsResponse {
    words: Vec<(Word, Clue)>,
}

#[derive(Debug, Serialize)]
struct CluesForRequest<'a> {
    words: &'a [Word],
}

#[derive(Debug, Deserialize)]
struct CluesForResponse {
    clues: HashMap<Word, Clue>,
}

/// A `Real` oracle backend: calls a JSON HTTP service at `base_url` for each of the
/// three oracle operations, at `{base_url}/words_matching`, `{base_url}/themed_words`,
/// and `{base_url}/clues_for`.
pub struct HttpOracle {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpOracle {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpOracle::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .expect("HTTP client configuration must be valid");
        HttpOracle {
            base_url: base_url.into(),
            client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Oracle for HttpOracle {
    fn words_matching(
        &mut self,
        pattern: &str,
        count: u32,
        excluded: &HashSet<Word>,
    ) -> Result<Vec<Word>, OracleError> {
        let excluded: Vec<&str> = excluded.iter().map(String::as_str).collect();
        let body = WordsMatchingRequest {
            pattern,
            count,
            excluded: &excluded,
        };
        let response = self
            .client
            .post(self.endpoint("words_matching"))
            .json(&body)
            .send()
            .map_err(map_transport_error)?;
        let parsed: WordsMatchingResponse = response
            .error_for_status()
            .map_err(map_transport_error)?
            .json()
            .map_err(map_transport_error)?;
        Ok(parsed.words)
    }

    fn themed_words(
        &mut self,
        topic: &str,
        count: u32,
        len_min: u32,
        len_max: u32,
    ) -> Result<Vec<(Word, Clue)>, OracleError> {
        let body = ThemedWordsRequest {
            topic,
            count,
            len_min,
            len_max,
        };
        let response = self
            .client
            .post(self.endpoint("themed_words"))
            .json(&body)
            .send()
            .map_err(map_transport_error)?;
        let parsed: ThemedWordsResponse = response
            .error_for_status()
            .map_err(map_transport_error)?
            .json()
            .map_err(map_transport_error)?;
        Ok(parsed.words)
    }

    fn clues_for(&mut self, words: &[Word]) -> Result<HashMap<Word, Clue>, OracleError> {
        let body = CluesForRequest { words };
        let response = self
            .client
            .post(self.endpoint("clues_for"))
            .json(&body)
            .send()
            .map_err(map_transport_error)?;
        let parsed: CluesForResponse = response
            .error_for_status()
            .map_err(map_transport_error)?
            .json()
            .map_err(map_transport_error)?;
        Ok(parsed.clues)
    }
}

fn map_transport_error(err: reqwest::Error) -> OracleError {
    if err.is_timeout() {
        OracleError::Timeout
    } else {
        OracleError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url_and_path() {
        let oracle = HttpOracle::new("http://oracle.example:9000/");
        assert_eq!(
            "http://oracle.example:9000/words_matching",
            oracle.endpoint("words_matching")
        );
    }
}
