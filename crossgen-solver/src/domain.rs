use std::collections::HashMap;

use bit_set::BitSet;
use crossgen_grid::SlotId;

enum TrailEntry {
    Removed { slot: SlotId, word_id: usize },
    Replaced { slot: SlotId, old: BitSet },
}

/// Per-slot candidate word-id sets, with a trail of removals/replacements so a failed
/// search branch can be undone in O(changes) rather than by deep-copying every domain.
pub struct Domains {
    sets: HashMap<SlotId, BitSet>,
    lengths: HashMap<SlotId, usize>,
    trail: Vec<TrailEntry>,
}

impl Domains {
    pub fn new() -> Self {
        Domains {
            sets: HashMap::new(),
            lengths: HashMap::new(),
            trail: Vec::new(),
        }
    }

    pub fn insert_slot(&mut self, slot_id: SlotId, length: usize, initial: BitSet) {
        self.sets.insert(slot_id, initial);
        self.lengths.insert(slot_id, length);
    }

    pub fn length_of(&self, slot_id: SlotId) -> usize {
        self.lengths[&slot_id]
    }

    pub fn get(&self, slot_id: SlotId) -> &BitSet {
        &self.sets[&slot_id]
    }

    pub fn size(&self, slot_id: SlotId) -> usize {
        self.sets[&slot_id].len()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: usize) -> bool {
        self.sets[&slot_id].contains(word_id)
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.sets[&slot_id].is_empty()
    }

    /// Removes `word_id` from `slot`'s domain, recording the removal on the trail.
    /// Returns `true` if the word was present.
    pub fn remove(&mut self, slot_id: SlotId, word_id: usize) -> bool {
        let removed = self.sets.get_mut(&slot_id).expect("unknown slot").remove(word_id);
        if removed {
            self.trail.push(TrailEntry::Removed { slot: slot_id, word_id });
        }
        removed
    }

    /// Wholesale replacement of `slot`'s domain (used by the oracle refill policy),
    /// recording the old domain on the trail for restoration.
    pub fn replace(&mut self, slot_id: SlotId, new: BitSet) {
        let old = self.sets.insert(slot_id, new).expect("unknown slot");
        self.trail.push(TrailEntry::Replaced { slot: slot_id, old });
    }

    /// A marker identifying the current trail position, to later [`Domains::restore`] to.
    pub fn checkpoint(&self) -> usize {
        self.trail.len()
    }

    /// Undoes every change recorded since `mark`, in LIFO order.
    pub fn restore(&mut self, mark: usize) {
        while self.trail.len() > mark {
            match self.trail.pop().expect("trail shorter than mark") {
                TrailEntry::Removed { slot, word_id } => {
                    self.sets.get_mut(&slot).expect("unknown slot").insert(word_id);
                }
                TrailEntry::Replaced { slot, old } => {
                    self.sets.insert(slot, old);
                }
            }
        }
    }
}

impl Default for Domains {
    fn default() -> Self {
        Domains::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_then_restore_is_bit_identical() {
        let mut domains = Domains::new();
        let mut initial = BitSet::new();
        initial.insert(0);
        initial.insert(1);
        initial.insert(2);
        domains.insert_slot(0, 5, initial.clone());

        let mark = domains.checkpoint();
        domains.remove(0, 1);
        assert_eq!(2, domains.size(0));

        domains.restore(mark);
        assert_eq!(initial, *domains.get(0));
    }

    #[test]
    fn replace_then_restore_recovers_old_domain() {
        let mut domains = Domains::new();
        let mut initial = BitSet::new();
        initial.insert(0);
        domains.insert_slot(0, 5, initial.clone());

        let mark = domains.checkpoint();
        let mut replacement = BitSet::new();
        replacement.insert(7);
        domains.replace(0, replacement);
        assert!(domains.contains(0, 7));

        domains.restore(mark);
        assert_eq!(initial, *domains.get(0));
    }

    #[test]
    fn nested_checkpoints_restore_in_lifo_order() {
        let mut domains = Domains::new();
        let mut initial = BitSet::new();
        initial.insert(0);
        initial.insert(1);
        domains.insert_slot(0, 5, initial);

        let outer = domains.checkpoint();
        domains.remove(0, 0);
        let inner = domains.checkpoint();
        domains.remove(0, 1);
        assert_eq!(0, domains.size(0));

        domains.restore(inner);
        assert_eq!(1, domains.size(0));

        domains.restore(outer);
        assert_eq!(2, domains.size(0));
    }
}
