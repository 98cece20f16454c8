//! Command-line frontend: loads a grid, a dictionary, and an optional config/oracle,
//! runs the solver, and prints the filled grid plus a one-line stats summary.

use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use crossgen_dictionary::Dictionary;
use crossgen_grid::GridModel;
use crossgen_oracle::{CallBudget, OracleAdapter};
use crossgen_oracle_http::HttpOracle;
use crossgen_oracle_stub::NullOracle;
use crossgen_solver::{Config, SolveOutcome, Solver, Solution};

/// Fills a crossword grid given a mask and a dictionary.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the grid file: one row per line, '#' block, '.' open, 'A'-'Z' prefilled.
    /// If omitted, a blank grid of `grid.size` (from the config) is generated.
    grid: Option<PathBuf>,

    /// Path to the word list: newline-delimited text, or a `.json` array of words.
    #[arg(short, long)]
    dictionary: PathBuf,

    /// Path to a TOML configuration file. Defaults match spec-documented behavior.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of an HTTP word-pattern oracle service. If omitted and `oracle.enabled`
    /// is set in the config, oracle calls are wired up but always refuse.
    #[arg(long)]
    oracle_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Grid(#[from] crossgen_grid::GridError),
    #[error(transparent)]
    Dictionary(#[from] crossgen_dictionary::DictionaryError),
    #[error(transparent)]
    Solver(#[from] crossgen_solver::SolverError),
}

fn main() {
    env_logger::init();
    match run(Args::parse()) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<i32, CliError> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let grid = match &args.grid {
        Some(path) => {
            let grid_text = read_to_string(path)?;
            let rows: Vec<String> = grid_text.lines().map(str::to_string).collect();
            GridModel::from_rows(rows, config.grid.min_word_length)?
        }
        None => {
            log::info!("no grid file given; generating a blank {0}x{0} grid", config.grid.size);
            GridModel::blank(config.grid.size, config.grid.min_word_length)
        }
    };
    let render_grid = grid.clone();

    let dictionary = load_dictionary(&args.dictionary, config.grid.min_word_length)?;
    log::info!("dictionary loaded: {} words", dictionary.len());

    let oracle = build_oracle(&args, &config);

    let mut solver = Solver::new(grid, dictionary, oracle, config)?;
    solver.on_progress(|stats, assigned| {
        eprintln!(
            "progress: {assigned} slots assigned, {} backtracks, {} ac3 revisions, {} oracle requests",
            stats.backtracks, stats.ac3_revisions, stats.oracle_requests
        );
    });

    let (result, stats) = solver.solve();
    match result {
        Ok(solution) => {
            print!("{}", render(render_grid, &solution));
            log::info!(
                "solved: {} slots, {} backtracks, {} ac3 revisions, {} oracle requests, \
                 {} oracle words added, {:.2}s",
                solution.len(),
                stats.backtracks,
                stats.ac3_revisions,
                stats.oracle_requests,
                stats.oracle_words_added,
                stats.elapsed().as_secs_f64(),
            );
            Ok(0)
        }
        Err(outcome) => {
            eprintln!("no solution: {outcome:?}");
            Ok(match outcome {
                SolveOutcome::NoSolution => 1,
                SolveOutcome::DeadlineExceeded => 2,
                SolveOutcome::OracleExhausted => 3,
            })
        }
    }
}

/// Re-applies every assigned word to a clone of the pre-solve grid and renders it as
/// one line of text per row, matching the input format.
fn render(mut grid: GridModel, solution: &Solution) -> String {
    let slots = grid.find_slots();
    for slot in &slots {
        if let Some(word) = solution.get(&slot.id()) {
            grid.apply_word(slot, word);
        }
    }

    let mut out = String::new();
    for row in 0..grid.row_count() {
        for col in 0..grid.column_count() {
            let cell = grid.cell_at(row, col).expect("row/col within the grid's own bounds");
            out.push(if cell.is_block() {
                '#'
            } else {
                cell.letter.unwrap_or('.')
            });
        }
        out.push('\n');
    }
    out
}

fn load_dictionary(path: &Path, min_word_length: usize) -> Result<Dictionary, CliError> {
    let mut dictionary = Dictionary::new(min_word_length);
    let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");

    if is_json {
        let data = read_to_string(path)?;
        let added = dictionary.load_json(&data)?;
        log::debug!("loaded {added} words from JSON dictionary {}", path.display());
        return Ok(dictionary);
    }

    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let words = Dictionary::sanitize_reader(file)?;
    for word in words {
        if let Err(err) = dictionary.add(&word) {
            log::debug!("skipping dictionary word {word:?}: {err}");
        }
    }
    Ok(dictionary)
}

/// Builds the oracle the solver will call through: `Real` (HTTP) if `--oracle-url` is
/// given, `Null` (always refuses) if the config enables the oracle without a URL, and a
/// disabled adapter otherwise.
fn build_oracle(args: &Args, config: &Config) -> OracleAdapter {
    let budget = CallBudget::new(config.oracle.max_total_calls, config.oracle.per_kind_caps.clone());
    match &args.oracle_url {
        Some(url) => {
            log::info!("oracle backend: http at {url}");
            OracleAdapter::new(Some(Box::new(HttpOracle::new(url.clone()))), budget)
        }
        None if config.oracle.enabled => {
            log::warn!("oracle.enabled is true but no --oracle-url was given; every oracle call will refuse");
            OracleAdapter::new(Some(Box::new(NullOracle::new())), budget)
        }
        None => OracleAdapter::disabled(),
    }
}

fn read_to_string(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
