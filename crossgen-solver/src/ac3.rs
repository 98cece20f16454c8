use std::collections::{HashSet, VecDeque};

use bit_set::BitSet;
use crossgen_dictionary::Dictionary;
use crossgen_grid::{ConstraintGraph, GridModel, SlotId};
use crossgen_oracle::{kinds::PATTERN_MATCH, OracleAdapter, Word};

use crate::config::OnLimitReached;
use crate::domain::Domains;
use crate::stats::Stats;

/// Number of candidate words requested from the oracle per refill, mirroring the
/// original solver's fixed batch size.
const ORACLE_REFILL_COUNT: u32 = 20;

/// Why propagation could not be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagateFailure {
    /// A domain emptied and could not be refilled; the current branch should backtrack.
    Unsatisfiable,
    /// The oracle's budget is exhausted and the policy is `fail`: the whole search
    /// must abort.
    OracleExhausted,
}

/// Enforces arc consistency over `queue`, splicing in oracle-supplied words when a
/// domain empties and the oracle is available. Mutates `dictionary` and `domains` in
/// place; domain shrinkage is monotonic within one call.
#[allow(clippy::too_many_arguments)]
pub fn propagate(
    mut queue: VecDeque<(SlotId, SlotId)>,
    graph: &ConstraintGraph,
    grid: &GridModel,
    dictionary: &mut Dictionary,
    domains: &mut Domains,
    stats: &mut Stats,
    oracle: &mut OracleAdapter,
    on_limit_reached: OnLimitReached,
    assigned_words: &HashSet<Word>,
) -> Result<(), PropagateFailure> {
    while let Some((x, y)) = queue.pop_front() {
        let Some(&(_, index_x, index_y)) =
            graph.neighbors(x).iter().find(|(neighbor, _, _)| *neighbor == y)
        else {
            continue;
        };

        if revise(x, y, index_x, index_y, dictionary, domains, stats) {
            if domains.is_empty(x) {
                log::debug!(
                    "domain emptied for slot {x} during propagation, attempting oracle refill"
                );
                refill(x, graph, grid, dictionary, domains, stats, oracle, on_limit_reached, assigned_words)?;
            }
            for &(neighbor, _, _) in graph.neighbors(x) {
                if neighbor != y {
                    queue.push_back((neighbor, x));
                }
            }
        }
    }
    Ok(())
}

/// Makes `x` arc-consistent with `y`: removes `w` from domain(x) unless some `w' != w`
/// in domain(y) agrees with `w` at the crossing. Returns `true` iff anything was removed.
fn revise(
    x: SlotId,
    y: SlotId,
    index_x: usize,
    index_y: usize,
    dictionary: &Dictionary,
    domains: &mut Domains,
    stats: &mut Stats,
) -> bool {
    let length_x = domains.length_of(x);
    let length_y = domains.length_of(y);

    let to_remove: Vec<usize> = domains
        .get(x)
        .iter()
        .filter(|&word_id_x| {
            let word_x = dictionary.word_at(length_x, word_id_x).expect("domain word must exist");
            let needed = word_x.as_bytes()[index_x];
            let has_support = domains.get(y).iter().any(|word_id_y| {
                let word_y = dictionary.word_at(length_y, word_id_y).expect("domain word must exist");
                word_y.as_bytes()[index_y] == needed && word_y != word_x
            });
            !has_support
        })
        .collect();

    for word_id in &to_remove {
        domains.remove(x, *word_id);
    }
    stats.ac3_revisions += to_remove.len() as u64;
    !to_remove.is_empty()
}

/// The oracle refill policy: request `pattern_for(slot)` words, filter for pattern
/// conformance (defense in depth), fold survivors into the dictionary and domain, or
/// report the appropriate failure. Also called directly for slots whose domain is
/// empty from the start (no dictionary word of that length at all), since plain
/// arc-consistency revision only notices emptiness it causes itself.
#[allow(clippy::too_many_arguments)]
pub(crate) fn refill(
    slot_id: SlotId,
    graph: &ConstraintGraph,
    grid: &GridModel,
    dictionary: &mut Dictionary,
    domains: &mut Domains,
    stats: &mut Stats,
    oracle: &mut OracleAdapter,
    on_limit_reached: OnLimitReached,
    assigned_words: &HashSet<Word>,
) -> Result<(), PropagateFailure> {
    if !oracle.can_call(PATTERN_MATCH) {
        return if oracle.is_enabled() && on_limit_reached == OnLimitReached::Fail {
            log::warn!("oracle budget exhausted and policy is fail; aborting search");
            Err(PropagateFailure::OracleExhausted)
        } else {
            Err(PropagateFailure::Unsatisfiable)
        };
    }

    let slot = graph.slot(slot_id);
    let pattern = grid.pattern_for(slot);
    stats.oracle_requests += 1;
    let words = oracle.request_words(&pattern, ORACLE_REFILL_COUNT, assigned_words);

    let conforming: Vec<Word> = words
        .into_iter()
        .filter(|w| w.len() == slot.length() && matches_pattern(w, &pattern))
        .collect();

    if conforming.is_empty() {
        return if oracle.is_enabled() && on_limit_reached == OnLimitReached::Fail && oracle.budget().is_exhausted()
        {
            Err(PropagateFailure::OracleExhausted)
        } else {
            Err(PropagateFailure::Unsatisfiable)
        };
    }

    let mut new_domain = BitSet::new();
    for word in &conforming {
        let (id, _) = dictionary
            .add_get_id(word)
            .expect("oracle word already validated against the slot's pattern and length");
        new_domain.insert(id);
    }
    stats.oracle_words_added += conforming.len() as u64;
    log::debug!("oracle provided {} new words for slot {slot_id}", conforming.len());
    domains.replace(slot_id, new_domain);
    Ok(())
}

pub(crate) fn matches_pattern(word: &str, pattern: &str) -> bool {
    word.len() == pattern.len()
        && word
            .chars()
            .zip(pattern.chars())
            .all(|(w, p)| p == '.' || w == p)
}
