use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::SolverError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Side length of a freshly generated blank grid (odd, ≥ 3). Unused when a grid is
    /// loaded from an existing file or string.
    pub size: usize,
    pub min_word_length: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            size: 5,
            min_word_length: crossgen_grid::slot::DEFAULT_MIN_LEN,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub use_inference: bool,
    pub deadline_seconds: Option<u64>,
    pub progress_interval_seconds: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            use_inference: true,
            deadline_seconds: None,
            progress_interval_seconds: 2.0,
        }
    }
}

/// Whether an exhausted oracle budget aborts the search (`Fail`) or the search
/// continues dictionary-only for the affected slot (`Fallback`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnLimitReached {
    Fail,
    Fallback,
}

impl Default for OnLimitReached {
    fn default() -> Self {
        OnLimitReached::Fallback
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub enabled: bool,
    pub max_total_calls: u32,
    pub per_kind_caps: HashMap<String, u32>,
    pub on_limit_reached: OnLimitReached,
}

impl Default for OracleConfig {
    fn default() -> Self {
        OracleConfig {
            enabled: false,
            max_total_calls: 0,
            per_kind_caps: HashMap::new(),
            on_limit_reached: OnLimitReached::Fallback,
        }
    }
}

/// Top-level solver configuration, loadable from a TOML file or built with
/// [`Default`]. Every recognized option has a documented default so a bare `[oracle]`
/// section, or no file at all, still produces a usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub solver: SolverConfig,
    pub oracle: OracleConfig,
}

impl Config {
    pub fn from_toml_str(data: &str) -> Result<Self, SolverError> {
        toml::from_str(data).map_err(|e| SolverError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SolverError> {
        let data = std::fs::read_to_string(path)?;
        Config::from_toml_str(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_defaults() {
        let config = Config::default();
        assert_eq!(5, config.grid.size);
        assert_eq!(3, config.grid.min_word_length);
        assert!(config.solver.use_inference);
        assert_eq!(None, config.solver.deadline_seconds);
        assert_eq!(2.0, config.solver.progress_interval_seconds);
        assert!(!config.oracle.enabled);
        assert_eq!(OnLimitReached::Fallback, config.oracle.on_limit_reached);
    }

    #[test]
    fn from_toml_str_overrides_only_specified_fields() {
        let config = Config::from_toml_str(
            r#"
            [oracle]
            enabled = true
            max_total_calls = 50
            on_limit_reached = "fail"
            "#,
        )
        .unwrap();
        assert!(config.oracle.enabled);
        assert_eq!(50, config.oracle.max_total_calls);
        assert_eq!(OnLimitReached::Fail, config.oracle.on_limit_reached);
        assert_eq!(3, config.grid.min_word_length, "unspecified sections keep their default");
    }

    #[test]
    fn from_toml_str_rejects_malformed_input() {
        assert!(Config::from_toml_str("not = [valid").is_err());
    }
}
