use std::collections::{BTreeMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use crossgen_dictionary::{Dictionary, WordId};
use crossgen_grid::{ConstraintGraph, GridModel, Slot, SlotId};
use crossgen_oracle::{OracleAdapter, Word};

use crate::ac3::{self, matches_pattern, propagate, PropagateFailure};
use crate::config::Config;
use crate::domain::Domains;
use crate::error::SolverError;
use crate::stats::Stats;

/// A completed crossword: every slot mapped to the word filling it.
pub type Solution = BTreeMap<SlotId, Word>;

/// Why [`Solver::solve`] did not return a [`Solution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    /// The search space was exhausted without finding a consistent assignment.
    NoSolution,
    /// `deadline_seconds` elapsed before a solution was found.
    DeadlineExceeded,
    /// The oracle budget was exhausted and `on_limit_reached` is `fail`.
    OracleExhausted,
}

/// AC-3 + backtracking search over a crossword's constraint graph, with an optional
/// oracle refilling domains that empty during propagation.
pub struct Solver {
    dictionary: Dictionary,
    graph: ConstraintGraph,
    grid: GridModel,
    domains: Domains,
    oracle: OracleAdapter,
    config: Config,
    stats: Stats,
    progress_sink: Option<Box<dyn FnMut(&Stats, usize)>>,
}

impl Solver {
    /// Builds a solver for `grid`, rejecting it up front if it fails structural
    /// validation. Initial domains are node-consistent: each slot's domain already
    /// reflects any letters pre-filled on the grid.
    pub fn new(
        grid: GridModel,
        dictionary: Dictionary,
        oracle: OracleAdapter,
        config: Config,
    ) -> Result<Self, SolverError> {
        let violations = grid.validate();
        if !violations.is_empty() {
            return Err(SolverError::Structural(violations));
        }

        let slots = grid.find_slots();
        let graph = ConstraintGraph::build(slots);
        let mut domains = Domains::new();
        for slot in graph.slots() {
            let pattern = grid.pattern_for(slot);
            let ids = dictionary.word_ids_matching(slot.length(), &pattern);
            domains.insert_slot(slot.id(), slot.length(), ids);
        }

        Ok(Solver {
            dictionary,
            graph,
            grid,
            domains,
            oracle,
            config,
            stats: Stats::new(),
            progress_sink: None,
        })
    }

    /// Registers a callback invoked roughly every `progress_interval_seconds`, with the
    /// running stats and the number of slots currently assigned.
    pub fn on_progress(&mut self, sink: impl FnMut(&Stats, usize) + 'static) {
        self.progress_sink = Some(Box::new(sink));
    }

    /// Runs the search to completion (or to the configured deadline), consuming the
    /// solver. The [`Stats`] are always returned, win or lose.
    pub fn solve(mut self) -> (Result<Solution, SolveOutcome>, Stats) {
        let empty_exclusions: HashSet<Word> = HashSet::new();
        let on_limit_reached = self.config.oracle.on_limit_reached;

        // Plain arc-consistency revision only notices a domain going empty when it is
        // the one to empty it; a slot whose length has no dictionary word at all starts
        // empty and needs an explicit first refill.
        let empty_from_start: Vec<SlotId> = self
            .graph
            .slots()
            .iter()
            .map(Slot::id)
            .filter(|&id| self.domains.is_empty(id))
            .collect();

        let mut initial_result = Ok(());
        for slot_id in empty_from_start {
            let Solver {
                graph,
                grid,
                dictionary,
                domains,
                stats,
                oracle,
                ..
            } = &mut self;
            if let Err(failure) =
                ac3::refill(slot_id, graph, grid, dictionary, domains, stats, oracle, on_limit_reached, &empty_exclusions)
            {
                initial_result = Err(failure);
                break;
            }
        }

        if initial_result.is_ok() && self.config.solver.use_inference {
            let mut initial_queue = VecDeque::new();
            for slot in self.graph.slots() {
                for &(neighbor, _, _) in self.graph.neighbors(slot.id()) {
                    initial_queue.push_back((slot.id(), neighbor));
                }
            }
            let Solver {
                graph,
                grid,
                dictionary,
                domains,
                stats,
                oracle,
                ..
            } = &mut self;
            initial_result = propagate(
                initial_queue,
                graph,
                grid,
                dictionary,
                domains,
                stats,
                oracle,
                on_limit_reached,
                &empty_exclusions,
            );
        }

        let deadline = self.config.solver.deadline_seconds.map(Duration::from_secs);
        let mut assignment = Solution::new();
        let mut assigned_words: HashSet<Word> = HashSet::new();
        let mut last_progress = Instant::now();

        let result = match initial_result {
            Ok(()) => self.backtrack(&mut assignment, &mut assigned_words, deadline, &mut last_progress),
            Err(PropagateFailure::Unsatisfiable) => Err(SolveOutcome::NoSolution),
            Err(PropagateFailure::OracleExhausted) => Err(SolveOutcome::OracleExhausted),
        };

        let slots_assigned = match &result {
            Ok(solution) => solution.len(),
            Err(_) => assignment.len(),
        };
        self.stats.finish(slots_assigned);
        (result, self.stats)
    }

    fn backtrack(
        &mut self,
        assignment: &mut Solution,
        assigned_words: &mut HashSet<Word>,
        deadline: Option<Duration>,
        last_progress: &mut Instant,
    ) -> Result<Solution, SolveOutcome> {
        if let Some(deadline) = deadline {
            if self.stats.elapsed_so_far() > deadline {
                return Err(SolveOutcome::DeadlineExceeded);
            }
        }
        self.maybe_report_progress(last_progress, assignment.len());

        let Some(slot_id) = self.select_unassigned_variable(assignment) else {
            return Ok(assignment.clone());
        };
        let slot = self.graph.slot(slot_id).clone();

        for word_id in self.order_domain_values(slot_id, assignment) {
            self.stats.assignments_tried += 1;
            let word = self
                .dictionary
                .word_at(slot.length(), word_id)
                .expect("domain word must exist in dictionary")
                .to_string();

            if assigned_words.contains(&word) {
                continue; // crossword words must be pairwise distinct
            }
            if !matches_pattern(&word, &self.grid.pattern_for(&slot)) {
                continue; // stale candidate from before a crossing neighbor was assigned
            }

            let previous_letters = self.grid.letters_of(&slot);
            self.grid.apply_word(&slot, &word);
            assignment.insert(slot_id, word.clone());
            assigned_words.insert(word.clone());

            let mark = self.domains.checkpoint();
            let propagate_result = if self.config.solver.use_inference {
                let mut queue = VecDeque::new();
                for &(neighbor, _, _) in self.graph.neighbors(slot_id) {
                    if !assignment.contains_key(&neighbor) {
                        queue.push_back((neighbor, slot_id));
                    }
                }
                let on_limit_reached = self.config.oracle.on_limit_reached;
                let Solver {
                    graph,
                    grid,
                    dictionary,
                    domains,
                    stats,
                    oracle,
                    ..
                } = self;
                propagate(queue, graph, grid, dictionary, domains, stats, oracle, on_limit_reached, assigned_words)
            } else {
                Ok(())
            };

            let outcome = match propagate_result {
                Ok(()) => self.backtrack(assignment, assigned_words, deadline, last_progress),
                Err(PropagateFailure::Unsatisfiable) => Err(SolveOutcome::NoSolution),
                Err(PropagateFailure::OracleExhausted) => Err(SolveOutcome::OracleExhausted),
            };

            match outcome {
                Ok(solution) => return Ok(solution),
                Err(SolveOutcome::NoSolution) => {
                    self.domains.restore(mark);
                    self.grid.restore_letters(&slot, &previous_letters);
                    assignment.remove(&slot_id);
                    assigned_words.remove(&word);
                    self.stats.backtracks += 1;
                }
                fatal => {
                    self.domains.restore(mark);
                    self.grid.restore_letters(&slot, &previous_letters);
                    assignment.remove(&slot_id);
                    assigned_words.remove(&word);
                    return fatal;
                }
            }
        }

        Err(SolveOutcome::NoSolution)
    }

    /// Minimum-remaining-values, ties broken by degree (most crossings first), ties
    /// broken by slot number.
    fn select_unassigned_variable(&self, assignment: &Solution) -> Option<SlotId> {
        self.graph
            .slots()
            .iter()
            .map(Slot::id)
            .filter(|id| !assignment.contains_key(id))
            .min_by_key(|&id| {
                (self.domains.size(id), std::cmp::Reverse(self.graph.neighbors(id).len()))
            })
    }

    /// Least-constraining-value: words that rule out the fewest remaining neighbor
    /// candidates are tried first.
    fn order_domain_values(&self, slot_id: SlotId, assignment: &Solution) -> Vec<WordId> {
        let length = self.domains.length_of(slot_id);
        let mut scored: Vec<(usize, WordId)> = self
            .domains
            .get(slot_id)
            .iter()
            .map(|word_id| {
                let word = self
                    .dictionary
                    .word_at(length, word_id)
                    .expect("domain word must exist in dictionary");
                (self.count_conflicts(slot_id, word, assignment), word_id)
            })
            .collect();
        scored.sort_unstable_by_key(|&(conflicts, word_id)| (conflicts, word_id));
        scored.into_iter().map(|(_, word_id)| word_id).collect()
    }

    fn count_conflicts(&self, slot_id: SlotId, word: &str, assignment: &Solution) -> usize {
        let mut conflicts = 0;
        for &(neighbor, index_self, index_neighbor) in self.graph.neighbors(slot_id) {
            if assignment.contains_key(&neighbor) {
                continue;
            }
            let needed = word.as_bytes()[index_self];
            let neighbor_length = self.domains.length_of(neighbor);
            conflicts += self
                .domains
                .get(neighbor)
                .iter()
                .filter(|&neighbor_word_id| {
                    let neighbor_word = self
                        .dictionary
                        .word_at(neighbor_length, neighbor_word_id)
                        .expect("domain word must exist in dictionary");
                    neighbor_word.as_bytes()[index_neighbor] != needed
                })
                .count();
        }
        conflicts
    }

    fn maybe_report_progress(&mut self, last_progress: &mut Instant, assigned_count: usize) {
        let interval = Duration::from_secs_f64(self.config.solver.progress_interval_seconds.max(0.0));
        if last_progress.elapsed() < interval {
            return;
        }
        *last_progress = Instant::now();
        log::info!(
            "progress: {assigned_count} slots assigned, {} backtracks, {} ac3 revisions, {:.1}s elapsed",
            self.stats.backtracks,
            self.stats.ac3_revisions,
            self.stats.elapsed_so_far().as_secs_f64(),
        );
        if let Some(sink) = self.progress_sink.as_mut() {
            sink(&self.stats, assigned_count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossgen_oracle_stub::StubOracle;

    /// A hand-checked, fully-crossing 3x3 word square: rows COT/ADO/REP, columns
    /// CAR/ODE/TOP, six pairwise-distinct real words. Any fully-open 3x3 grid has
    /// exactly six slots (three across, three down) each crossing every slot of the
    /// other direction, so this is the minimal non-trivial fixture for the solver.
    const SQUARE_WORDS: [&str; 6] = ["COT", "ADO", "REP", "CAR", "ODE", "TOP"];

    fn open_3x3() -> GridModel {
        GridModel::from_rows(vec!["...".to_string(), "...".to_string(), "...".to_string()], 3).unwrap()
    }

    fn dictionary_with(words: &[&str]) -> Dictionary {
        let mut dict = Dictionary::new(3);
        for word in words {
            dict.add(word).unwrap();
        }
        dict
    }

    fn sorted(words: Vec<String>) -> Vec<String> {
        let mut words = words;
        words.sort();
        words
    }

    #[test]
    fn solves_fully_crossing_grid_using_every_dictionary_word() {
        let dictionary = dictionary_with(&SQUARE_WORDS);
        let solver =
            Solver::new(open_3x3(), dictionary, OracleAdapter::disabled(), Config::default()).unwrap();

        let (result, stats) = solver.solve();

        let solution = result.expect("the COT/ADO/REP square is a valid solution");
        assert_eq!(6, solution.len());
        // Six slots, six pairwise-distinct words required, six words available: the
        // solution must be a bijection onto the whole dictionary.
        let mut expected: Vec<String> = SQUARE_WORDS.iter().map(|w| w.to_string()).collect();
        expected.sort();
        assert_eq!(expected, sorted(solution.into_values().collect()));
        assert_eq!(0, stats.backtracks);
        assert!(stats.ac3_revisions > 0, "crossing constraints must rule out some candidates");
    }

    /// A 7x7 grid prefilled entirely by a solved word square: every slot's pattern is
    /// already a complete word, so node consistency alone collapses every domain to a
    /// singleton before the first assignment. Rows are cyclic rotations of "ABCDEFG"
    /// (each letter one ahead of the last); columns are cyclic rotations of "AGFEDCB"
    /// (each letter one behind), so no row string can equal any column string, and all
    /// 14 words are pairwise distinct as the "words must differ" invariant requires.
    #[test]
    fn forced_singleton_chain_assigns_every_slot_without_backtracking() {
        let rows: Vec<String> = [
            "ABCDEFG", "GABCDEF", "FGABCDE", "EFGABCD", "DEFGABC", "CDEFGAB", "BCDEFGA",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let grid = GridModel::from_rows(rows, 3).unwrap();

        let words = [
            "ABCDEFG", "GABCDEF", "FGABCDE", "EFGABCD", "DEFGABC", "CDEFGAB", "BCDEFGA", "AGFEDCB",
            "BAGFEDC", "CBAGFED", "DCBAGFE", "EDCBAGF", "FEDCBAG", "GFEDCBA",
        ];
        let dictionary = dictionary_with(&words);

        let solver =
            Solver::new(grid, dictionary, OracleAdapter::disabled(), Config::default()).unwrap();
        let (result, stats) = solver.solve();

        let solution = result.expect("every domain is already a singleton after node consistency");
        assert_eq!(14, solution.len());
        assert_eq!(0, stats.backtracks);
        assert_eq!(14, stats.assignments_tried);
    }

    /// A 3x5 fully open rectangle, entirely prefilled by a solved grid, with exactly one
    /// of its eight words (the last across row, "KLMNO") left out of the dictionary.
    /// Every other slot's pattern is already a complete, dictionary-present word, so only
    /// that one slot starts with an empty domain and needs the oracle — node consistency
    /// alone resolves the rest, so this is the one and only oracle call the solve makes.
    #[test]
    fn oracle_refill_supplies_the_one_word_missing_from_the_dictionary() {
        let rows: Vec<String> =
            ["ABCDE", "FGHIJ", "KLMNO"].iter().map(|s| s.to_string()).collect();
        let grid = GridModel::from_rows(rows, 3).unwrap();

        let dictionary = dictionary_with(&["ABCDE", "FGHIJ", "AFK", "BGL", "CHM", "DIN", "EJO"]);
        let mut config = Config::default();
        config.oracle.enabled = true;

        let stub = StubOracle::new().with_pattern("KLMNO", vec!["KLMNO".to_string()]);
        let oracle = OracleAdapter::new(
            Some(Box::new(stub)),
            crossgen_oracle::CallBudget::new(10, std::collections::HashMap::new()),
        );

        let solver = Solver::new(grid, dictionary, oracle, config).unwrap();
        let (result, stats) = solver.solve();

        let solution = result.expect("the oracle supplies the one missing word of the solved grid");
        assert_eq!(8, solution.len());
        assert!(solution.values().any(|w| w == "KLMNO"));
        assert_eq!(1, stats.oracle_requests);
        assert_eq!(1, stats.oracle_words_added);
    }

    #[test]
    fn oracle_exhaustion_under_fallback_yields_no_solution() {
        let dictionary = Dictionary::new(3);
        let mut config = Config::default();
        config.oracle.enabled = true;
        config.oracle.on_limit_reached = crate::config::OnLimitReached::Fallback;

        let stub = StubOracle::new().with_pattern("...", vec!["COT".to_string()]);
        let oracle = OracleAdapter::new(Some(Box::new(stub)), crossgen_oracle::CallBudget::closed());

        let solver = Solver::new(open_3x3(), dictionary, oracle, config).unwrap();
        let (result, _stats) = solver.solve();

        assert_eq!(Err(SolveOutcome::NoSolution), result);
    }

    #[test]
    fn oracle_exhaustion_under_fail_policy_aborts_the_search() {
        let dictionary = Dictionary::new(3);
        let mut config = Config::default();
        config.oracle.enabled = true;
        config.oracle.on_limit_reached = crate::config::OnLimitReached::Fail;

        let stub = StubOracle::new().with_pattern("...", vec!["COT".to_string()]);
        let oracle = OracleAdapter::new(Some(Box::new(stub)), crossgen_oracle::CallBudget::closed());

        let solver = Solver::new(open_3x3(), dictionary, oracle, config).unwrap();
        let (result, _stats) = solver.solve();

        assert_eq!(Err(SolveOutcome::OracleExhausted), result);
    }

    #[test]
    fn zero_second_deadline_is_honored() {
        let dictionary = dictionary_with(&SQUARE_WORDS);
        let mut config = Config::default();
        config.solver.deadline_seconds = Some(0);
        let solver =
            Solver::new(open_3x3(), dictionary, OracleAdapter::disabled(), config).unwrap();

        let (result, _stats) = solver.solve();

        assert_eq!(Err(SolveOutcome::DeadlineExceeded), result);
    }

    #[test]
    fn solves_without_forward_inference() {
        let dictionary = dictionary_with(&SQUARE_WORDS);
        let mut config = Config::default();
        config.solver.use_inference = false;
        let solver =
            Solver::new(open_3x3(), dictionary, OracleAdapter::disabled(), config).unwrap();

        let (result, stats) = solver.solve();

        let solution = result.expect("plain backtracking still finds the word square");
        assert_eq!(6, solution.len());
        assert_eq!(0, stats.ac3_revisions, "inference disabled, so AC-3 never runs");
    }
}
